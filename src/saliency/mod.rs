//! Saliency estimation: which parts of an image draw the eye.
//!
//! The pipeline consumes saliency through [`crate::SaliencyProvider`]. The
//! default provider, [`YehSaliency`], combines a frequency-tuned per-pixel
//! saliency map ([`AchantaSaliency`]) with a graph-based over-segmentation
//! ([`FelzenszwalbSegmenter`]) and scores each segment by its mean saliency.

pub mod achanta;
pub mod segmentation;
pub mod yeh;

use image::{ImageBuffer, Luma};

pub use achanta::AchantaSaliency;
pub use segmentation::{FelzenszwalbSegmenter, Segmentation};
pub use yeh::YehSaliency;

/// Dense single-channel saliency intensity map.
pub type SaliencyMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Smallest axis-aligned rectangle enclosing a set of pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A connected set of pixels produced by segmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectedComponent {
    pixels: Vec<(u32, u32)>,
}

impl ConnectedComponent {
    pub fn new(pixels: Vec<(u32, u32)>) -> Self {
        Self { pixels }
    }

    /// Component covering every pixel of a `width × height` rectangle at (`x`, `y`).
    pub fn from_rect(x: u32, y: u32, width: u32, height: u32) -> Self {
        let pixels = (y..y + height)
            .flat_map(|py| (x..x + width).map(move |px| (px, py)))
            .collect();
        Self { pixels }
    }

    pub fn pixels(&self) -> &[(u32, u32)] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// `None` for an empty component.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let (&(first_x, first_y), rest) = self.pixels.split_first()?;
        let [min_x, min_y, max_x, max_y] = rest.iter().fold(
            [first_x, first_y, first_x, first_y],
            |[min_x, min_y, max_x, max_y], &(x, y)| {
                [min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)]
            },
        );
        Some(BoundingBox::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }
}

/// A segmented region together with its saliency score.
#[derive(Debug, Clone, PartialEq)]
pub struct SalientRegion {
    pub component: ConnectedComponent,
    pub saliency: f32,
}

impl SalientRegion {
    pub fn new(component: ConnectedComponent, saliency: f32) -> Self {
        Self {
            component,
            saliency,
        }
    }
}
