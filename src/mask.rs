//! Background masks built from saliency.
//!
//! Salient regions are selected first (the foreground), then the selection is
//! inverted so the histogram stage only sees the background.

use image::{GrayImage, ImageBuffer, Luma, Rgb32FImage};
use log::debug;

use crate::config::SimplicityConfig;
use crate::errors::{Result, SimplicityError, Stage};
use crate::saliency::{BoundingBox, SaliencyMap, SalientRegion};
use crate::traits::SaliencyProvider;

/// Single-channel mask whose pixels are always exactly 0.0 or 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: ImageBuffer<Luma<f32>, Vec<f32>>,
}

impl BinaryMask {
    /// Mask with nothing selected.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: ImageBuffer::new(width, height),
        }
    }

    /// Mask with every pixel selected.
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            image: ImageBuffer::from_pixel(width, height, Luma([1.0])),
        }
    }

    /// Selects the pixels whose value is at least `threshold`.
    pub fn from_threshold(map: &SaliencyMap, threshold: f32) -> Self {
        let image = ImageBuffer::from_fn(map.width(), map.height(), |x, y| {
            let Luma([value]) = *map.get_pixel(x, y);
            Luma([if value >= threshold { 1.0 } else { 0.0 }])
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == 1.0
    }

    pub fn count_selected(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] == 1.0).count()
    }

    /// Selects every pixel of `bbox` that lies inside the mask.
    pub fn fill_box(&mut self, bbox: &BoundingBox) {
        let right = bbox.right().min(self.width());
        let bottom = bbox.bottom().min(self.height());
        for y in bbox.y..bottom {
            for x in bbox.x..right {
                self.image.put_pixel(x, y, Luma([1.0]));
            }
        }
    }

    /// Swaps selected and unselected pixels in place.
    pub fn invert(&mut self) {
        for pixel in self.image.pixels_mut() {
            pixel.0[0] = 1.0 - pixel.0[0];
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert();
        self
    }

    pub fn as_image(&self) -> &ImageBuffer<Luma<f32>, Vec<f32>> {
        &self.image
    }

    pub fn into_image(self) -> ImageBuffer<Luma<f32>, Vec<f32>> {
        self.image
    }

    /// 8-bit rendering: selected pixels white, the rest black.
    pub fn to_luma8(&self) -> GrayImage {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.is_selected(x, y) { u8::MAX } else { 0 }])
        })
    }
}

/// How the foreground is derived from saliency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskStrategy {
    /// Fill the bounding box of every sufficiently salient region.
    BoundingBoxes,
    /// Threshold the dense saliency map pixel by pixel.
    SaliencyThreshold,
}

impl MaskStrategy {
    pub const fn from_box_mode(box_mode: bool) -> Self {
        if box_mode {
            Self::BoundingBoxes
        } else {
            Self::SaliencyThreshold
        }
    }
}

/// Salient area before inversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Foreground {
    pub mask: BinaryMask,
    /// Boxes filled in bounding-box mode; empty in threshold mode.
    pub boxes: Vec<BoundingBox>,
    /// Saliency value a region or pixel had to reach.
    pub threshold: f32,
}

/// Pixels left for colour analysis once the salient area is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundMask {
    pub mask: BinaryMask,
    pub boxes: Vec<BoundingBox>,
    pub threshold: f32,
}

impl From<Foreground> for BackgroundMask {
    fn from(foreground: Foreground) -> Self {
        Self {
            mask: foreground.mask.inverted(),
            boxes: foreground.boxes,
            threshold: foreground.threshold,
        }
    }
}

/// Largest region saliency; 0 when there are no regions.
pub fn max_region_saliency(regions: &[SalientRegion]) -> f32 {
    regions
        .iter()
        .map(|region| region.saliency)
        .fold(0.0, f32::max)
}

/// Largest value of the map; 0 for an empty map.
pub fn max_map_saliency(map: &SaliencyMap) -> f32 {
    map.pixels().map(|p| p.0[0]).fold(0.0, f32::max)
}

/// Fills the bounding box of every region whose saliency reaches
/// `alpha * max`. Regions exactly at the threshold are included.
pub fn foreground_from_regions(
    width: u32,
    height: u32,
    regions: &[SalientRegion],
    alpha: f32,
) -> Foreground {
    let threshold = max_region_saliency(regions) * alpha;
    let mut mask = BinaryMask::new(width, height);
    let mut boxes = Vec::new();

    let qualifying = regions
        .iter()
        .filter(|region| region.saliency >= threshold)
        .filter_map(|region| region.component.bounding_box());
    for bbox in qualifying {
        mask.fill_box(&bbox);
        boxes.push(bbox);
    }

    debug!(
        "box mode: {} of {} regions reach saliency {threshold}",
        boxes.len(),
        regions.len()
    );

    Foreground {
        mask,
        boxes,
        threshold,
    }
}

/// Selects the pixels whose saliency reaches `alpha * max`.
pub fn foreground_from_map(map: &SaliencyMap, alpha: f32) -> Foreground {
    let threshold = max_map_saliency(map) * alpha;
    let mask = BinaryMask::from_threshold(map, threshold);

    debug!(
        "threshold mode: {} pixels reach saliency {threshold}",
        mask.count_selected()
    );

    Foreground {
        mask,
        boxes: Vec::new(),
        threshold,
    }
}

/// Builds background masks with a fixed strategy and `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskBuilder {
    pub alpha: f32,
    pub strategy: MaskStrategy,
}

impl MaskBuilder {
    pub const fn new(alpha: f32, strategy: MaskStrategy) -> Self {
        Self { alpha, strategy }
    }

    pub const fn from_config(config: &SimplicityConfig) -> Self {
        Self::new(config.alpha, MaskStrategy::from_box_mode(config.box_mode))
    }

    /// Salient area of `image` according to `provider`.
    pub fn foreground<S>(&self, image: &Rgb32FImage, provider: &S) -> Result<Foreground>
    where
        S: SaliencyProvider + ?Sized,
    {
        let (width, height) = image.dimensions();
        match self.strategy {
            MaskStrategy::BoundingBoxes => {
                let regions = provider
                    .region_saliency(image)
                    .map_err(|e| e.within(Stage::Saliency))?;
                Ok(foreground_from_regions(width, height, &regions, self.alpha))
            }
            MaskStrategy::SaliencyThreshold => {
                let map = provider
                    .saliency_map(image)
                    .map_err(|e| e.within(Stage::Saliency))?;
                if map.dimensions() != image.dimensions() {
                    return Err(SimplicityError::stage(
                        Stage::Masking,
                        SimplicityError::DimensionMismatch {
                            expected: image.dimensions(),
                            actual: map.dimensions(),
                        },
                    ));
                }
                Ok(foreground_from_map(&map, self.alpha))
            }
        }
    }

    /// Inverted foreground: the pixels the histogram is computed over.
    pub fn background<S>(&self, image: &Rgb32FImage, provider: &S) -> Result<BackgroundMask>
    where
        S: SaliencyProvider + ?Sized,
    {
        self.foreground(image, provider).map(BackgroundMask::from)
    }
}
