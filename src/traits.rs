use crate::errors::Result;
use crate::histogram::Histogram;
use crate::mask::BinaryMask;
use crate::saliency::{SaliencyMap, SalientRegion};
use image::Rgb32FImage;

/// Source of saliency information for an image.
///
/// Implementations must be deterministic for a fixed image and configuration.
/// The pipeline only calls the method its masking strategy needs.
pub trait SaliencyProvider: Send + Sync {
    /// Segmented regions with one saliency value each; regions are disjoint.
    fn region_saliency(&self, image: &Rgb32FImage) -> Result<Vec<SalientRegion>>;

    /// Per-pixel saliency with the image's dimensions.
    fn saliency_map(&self, image: &Rgb32FImage) -> Result<SaliencyMap>;
}

/// Colour histogram restricted to the pixels a mask selects.
pub trait HistogramEstimator: Send + Sync {
    /// Joint histogram with `bins_per_band` bins per channel.
    ///
    /// Must fail with `SimplicityError::DimensionMismatch` when the mask and
    /// image sizes differ.
    fn estimate(
        &self,
        image: &Rgb32FImage,
        mask: &BinaryMask,
        bins_per_band: usize,
    ) -> Result<Histogram>;
}
