//! Background simplicity after Luo & Tang, "Photo and Video Quality
//! Evaluation: Focusing on the Subject" (ECCV 2008), with the foreground
//! found by region saliency instead of blur detection.
//!
//! The salient area is removed, a joint colour histogram is taken over what
//! remains, and the score is the fraction of histogram bins holding at least
//! `gamma` of the peak bin. A low score means the background is dominated by
//! a handful of colours.

use image::{DynamicImage, ImageBuffer, Pixel, Primitive, Rgb, Rgb32FImage};
use log::debug;
use ndarray::{array, Array1};
use num_traits::AsPrimitive;

use crate::config::SimplicityConfig;
use crate::errors::{Result, SimplicityError, Stage};
use crate::histogram::{Histogram, MaskingHistogram};
use crate::imageops::normalize_rgb;
use crate::mask::{BackgroundMask, BinaryMask, MaskBuilder};
use crate::saliency::{BoundingBox, YehSaliency};
use crate::scoring::{Occupancy, SimplicityScorer};
use crate::traits::{HistogramEstimator, SaliencyProvider};

/// Everything computed for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplicityReport {
    pub background: BackgroundMask,
    pub histogram: Histogram,
    pub occupancy: Occupancy,
}

impl SimplicityReport {
    pub fn score(&self) -> f64 {
        self.occupancy.score()
    }

    /// One-element feature vector holding the score.
    pub fn feature_vector(&self) -> Array1<f64> {
        array![self.score()]
    }

    pub fn background_mask(&self) -> &BinaryMask {
        &self.background.mask
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.background.boxes
    }
}

/// Simplicity feature extractor.
///
/// Holds only immutable configuration and collaborators, so a single instance
/// can score any number of images, from any number of threads.
#[derive(Debug, Clone)]
pub struct ModifiedLuoSimplicity<S = YehSaliency, H = MaskingHistogram> {
    config: SimplicityConfig,
    saliency: S,
    histogram: H,
}

impl ModifiedLuoSimplicity {
    /// Extractor with the default saliency and histogram collaborators.
    pub fn new(config: SimplicityConfig) -> Result<Self> {
        Self::with_components(config, YehSaliency::from_config(&config), MaskingHistogram)
    }
}

impl Default for ModifiedLuoSimplicity {
    fn default() -> Self {
        let config = SimplicityConfig::default();
        Self {
            config,
            saliency: YehSaliency::from_config(&config),
            histogram: MaskingHistogram,
        }
    }
}

impl<S, H> ModifiedLuoSimplicity<S, H>
where
    S: SaliencyProvider,
    H: HistogramEstimator,
{
    pub fn with_components(config: SimplicityConfig, saliency: S, histogram: H) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            saliency,
            histogram,
        })
    }

    pub fn config(&self) -> &SimplicityConfig {
        &self.config
    }

    pub fn saliency_provider(&self) -> &S {
        &self.saliency
    }

    /// Runs every stage on `image` from scratch.
    pub fn analyse(&self, image: &Rgb32FImage) -> Result<SimplicityReport> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SimplicityError::InvalidInput {
                reason: format!("image has no pixels ({width}x{height})"),
            });
        }

        let background = MaskBuilder::from_config(&self.config).background(image, &self.saliency)?;

        let histogram = self
            .histogram
            .estimate(image, &background.mask, self.config.bins_per_band)
            .map_err(|e| e.within(Stage::Histogram))?;

        let occupancy = SimplicityScorer::new(self.config.gamma)
            .occupancy(&histogram)
            .map_err(|e| e.within(Stage::Scoring))?;

        debug!(
            "{width}x{height}: {} background pixels, {}/{} significant bins, score {:.4}",
            background.mask.count_selected(),
            occupancy.significant,
            occupancy.total,
            occupancy.score()
        );

        Ok(SimplicityReport {
            background,
            histogram,
            occupancy,
        })
    }

    pub fn extract(&self, image: &Rgb32FImage) -> Result<f64> {
        self.analyse(image).map(|report| report.score())
    }

    pub fn feature_vector(&self, image: &Rgb32FImage) -> Result<Array1<f64>> {
        self.analyse(image).map(|report| report.feature_vector())
    }

    /// Scores any decoded image; alpha is dropped.
    pub fn extract_dynamic(&self, image: &DynamicImage) -> Result<f64> {
        self.extract(&image.to_rgb32f())
    }

    /// Scores an RGB buffer with integer or float subpixels.
    pub fn extract_buffer<Sub>(&self, image: &ImageBuffer<Rgb<Sub>, Vec<Sub>>) -> Result<f64>
    where
        Rgb<Sub>: Pixel<Subpixel = Sub>,
        Sub: Primitive + AsPrimitive<f32> + 'static,
    {
        self.extract(&normalize_rgb(image))
    }
}
