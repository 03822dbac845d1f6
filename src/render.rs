//! Debug overlays showing which pixels were treated as background.

use image::{GrayImage, ImageBuffer, Rgb, Rgb32FImage, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::errors::{Result, SimplicityError};
use crate::imageops::to_rgb8;
use crate::mask::BinaryMask;
use crate::saliency::BoundingBox;

/// Paints an image with the excluded (salient) area dimmed and the filled
/// bounding boxes outlined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskRenderer {
    pub box_colour: Rgb<u8>,
    /// Brightness multiplier for pixels outside the background.
    pub dim: f32,
}

impl Default for MaskRenderer {
    fn default() -> Self {
        Self {
            box_colour: Rgb([255, 0, 0]),
            dim: 0.25,
        }
    }
}

impl MaskRenderer {
    pub fn render(
        &self,
        image: &Rgb32FImage,
        background: &BinaryMask,
        boxes: &[BoundingBox],
    ) -> Result<RgbImage> {
        if image.dimensions() != background.dimensions() {
            return Err(SimplicityError::DimensionMismatch {
                expected: image.dimensions(),
                actual: background.dimensions(),
            });
        }

        let dimmed = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            let Rgb(channels) = *image.get_pixel(x, y);
            if background.is_selected(x, y) {
                Rgb(channels)
            } else {
                Rgb(channels.map(|c| c * self.dim))
            }
        });
        let mut canvas = to_rgb8(&dimmed);

        for bbox in boxes {
            let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
            draw_hollow_rect_mut(&mut canvas, rect, self.box_colour);
        }

        Ok(canvas)
    }

    /// The mask alone, selected pixels white.
    pub fn render_mask(&self, mask: &BinaryMask) -> GrayImage {
        mask.to_luma8()
    }
}
