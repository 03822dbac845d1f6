//! Region saliency after Yeh et al., "Personalized photograph ranking and
//! selection system" (ACM MM 2010): segment the image, then score every
//! segment by the mean frequency-tuned saliency of its pixels.

use image::{ImageBuffer, Luma, Rgb32FImage};

use super::{
    AchantaSaliency, FelzenszwalbSegmenter, SaliencyMap, SalientRegion, Segmentation,
};
use crate::config::SimplicityConfig;
use crate::errors::{Result, SimplicityError};
use crate::traits::SaliencyProvider;

/// Segmentation together with the mean saliency of each component.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAnalysis {
    pub segmentation: Segmentation,
    /// Indexed like `segmentation.components`.
    pub component_saliency: Vec<f32>,
}

impl RegionAnalysis {
    pub fn into_regions(self) -> Vec<SalientRegion> {
        self.segmentation
            .components
            .into_iter()
            .zip(self.component_saliency)
            .map(|(component, saliency)| SalientRegion::new(component, saliency))
            .collect()
    }

    /// Dense map where each pixel carries its component's saliency.
    pub fn to_saliency_map(&self) -> SaliencyMap {
        let segmentation = &self.segmentation;
        ImageBuffer::from_fn(segmentation.width, segmentation.height, |x, y| {
            Luma([self.component_saliency[segmentation.label(x, y)]])
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct YehSaliency {
    achanta: AchantaSaliency,
    segmenter: FelzenszwalbSegmenter,
}

impl YehSaliency {
    pub const fn new(saliency_sigma: f32, segmenter_sigma: f32, k: f32, min_size: usize) -> Self {
        Self {
            achanta: AchantaSaliency::new(saliency_sigma),
            segmenter: FelzenszwalbSegmenter::new(segmenter_sigma, k, min_size),
        }
    }

    pub const fn from_config(config: &SimplicityConfig) -> Self {
        Self::new(
            config.saliency_sigma,
            config.segmenter_sigma,
            config.k,
            config.min_size,
        )
    }

    pub fn analyse(&self, image: &Rgb32FImage) -> Result<RegionAnalysis> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SimplicityError::InvalidInput {
                reason: format!("cannot estimate saliency of a {width}x{height} image"),
            });
        }
        if u64::from(width) * u64::from(height) > u64::from(u32::MAX) {
            return Err(SimplicityError::InvalidInput {
                reason: format!("{width}x{height} is too large to segment"),
            });
        }

        let pixel_saliency = self.achanta.saliency_map(image);
        let segmentation = self.segmenter.segment(image);

        let component_saliency = segmentation
            .components
            .iter()
            .map(|component| {
                let sum: f32 = component
                    .pixels()
                    .iter()
                    .map(|&(x, y)| pixel_saliency.get_pixel(x, y).0[0])
                    .sum();
                sum / component.len() as f32
            })
            .collect();

        Ok(RegionAnalysis {
            segmentation,
            component_saliency,
        })
    }
}

impl SaliencyProvider for YehSaliency {
    fn region_saliency(&self, image: &Rgb32FImage) -> Result<Vec<SalientRegion>> {
        self.analyse(image).map(RegionAnalysis::into_regions)
    }

    fn saliency_map(&self, image: &Rgb32FImage) -> Result<SaliencyMap> {
        self.analyse(image).map(|analysis| analysis.to_saliency_map())
    }
}
