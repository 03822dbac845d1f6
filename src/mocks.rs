use crate::errors::{Result, SimplicityError, Stage};
use crate::saliency::{SaliencyMap, SalientRegion};
use crate::traits::SaliencyProvider;
use image::Rgb32FImage;

/// Saliency provider returning canned regions and maps, for tests.
#[derive(Debug, Clone, Default)]
pub struct MockSaliencyProvider {
    regions: Vec<SalientRegion>,
    map: Option<SaliencyMap>,
}

impl MockSaliencyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions(mut self, regions: Vec<SalientRegion>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_map(mut self, map: SaliencyMap) -> Self {
        self.map = Some(map);
        self
    }
}

impl SaliencyProvider for MockSaliencyProvider {
    fn region_saliency(&self, _image: &Rgb32FImage) -> Result<Vec<SalientRegion>> {
        Ok(self.regions.clone())
    }

    fn saliency_map(&self, image: &Rgb32FImage) -> Result<SaliencyMap> {
        self.map.clone().ok_or_else(|| SimplicityError::InvalidInput {
            reason: format!(
                "mock provider has no saliency map for a {}x{} image",
                image.width(),
                image.height()
            ),
        })
    }
}

/// Saliency provider that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSaliencyProvider;

impl FailingSaliencyProvider {
    fn unavailable() -> SimplicityError {
        SimplicityError::stage(
            Stage::Saliency,
            std::io::Error::other("saliency engine unavailable"),
        )
    }
}

impl SaliencyProvider for FailingSaliencyProvider {
    fn region_saliency(&self, _image: &Rgb32FImage) -> Result<Vec<SalientRegion>> {
        Err(Self::unavailable())
    }

    fn saliency_map(&self, _image: &Rgb32FImage) -> Result<SaliencyMap> {
        Err(Self::unavailable())
    }
}

/// Provider marking a single centred rectangle covering half of each side.
pub fn create_centred_mock(width: u32, height: u32) -> MockSaliencyProvider {
    use crate::saliency::ConnectedComponent;

    let component = ConnectedComponent::from_rect(width / 4, height / 4, width / 2, height / 2);
    MockSaliencyProvider::new().with_regions(vec![SalientRegion::new(component, 1.0)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saliency::BoundingBox;

    #[test]
    fn test_mock_returns_configured_regions() -> Result<()> {
        let provider = create_centred_mock(8, 8);
        let regions = provider.region_saliency(&Rgb32FImage::new(8, 8))?;

        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].component.bounding_box(),
            Some(BoundingBox::new(2, 2, 4, 4))
        );
        Ok(())
    }

    #[test]
    fn test_mock_without_map_fails() {
        let result = MockSaliencyProvider::new().saliency_map(&Rgb32FImage::new(2, 2));
        assert!(matches!(result, Err(SimplicityError::InvalidInput { .. })));
    }

    #[test]
    fn test_failing_provider_reports_saliency_stage() {
        let err = FailingSaliencyProvider
            .region_saliency(&Rgb32FImage::new(1, 1))
            .unwrap_err();
        assert_eq!(err.failed_stage(), Some(Stage::Saliency));
    }
}
