//! Frequency-tuned saliency (Achanta et al., CVPR 2009).
//!
//! Each pixel's saliency is the squared Lab distance between the image's mean
//! colour and the pixel's colour after a small Gaussian blur.

use image::{ImageBuffer, Luma, Rgb, Rgb32FImage};
use imageproc::filter::gaussian_blur_f32;
use ndarray::Axis;
use nshare::AsNdarray3;
use palette::{FromColor, Lab, LinSrgb, Srgb};

use super::SaliencyMap;

/// Image whose three channels hold CIE L*, a* and b*.
pub type LabImage = ImageBuffer<Rgb<f32>, Vec<f32>>;

/// Converts unit-range sRGB to CIE Lab (D65).
pub fn to_lab(image: &Rgb32FImage) -> LabImage {
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        let linear: LinSrgb<f32> = Srgb::new(r, g, b).into_linear();
        let lab: Lab = Lab::from_color(linear);
        Rgb([lab.l, lab.a, lab.b])
    })
}

/// Per-channel mean of a three-channel image; zeros for an empty image.
pub fn channel_means(image: &LabImage) -> [f32; 3] {
    let planes = image.as_ndarray3();
    let mut means = [0.0; 3];
    for (mean, plane) in means.iter_mut().zip(planes.axis_iter(Axis(0))) {
        *mean = plane.mean().unwrap_or(0.0);
    }
    means
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchantaSaliency {
    sigma: f32,
}

impl Default for AchantaSaliency {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AchantaSaliency {
    /// `sigma` is the blur applied before measuring distances; 0 disables it.
    pub const fn new(sigma: f32) -> Self {
        Self { sigma }
    }

    pub const fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn saliency_map(&self, image: &Rgb32FImage) -> SaliencyMap {
        let lab = to_lab(image);
        let mean = channel_means(&lab);
        let blurred = if self.sigma > 0.0 {
            gaussian_blur_f32(&lab, self.sigma)
        } else {
            lab
        };

        ImageBuffer::from_fn(blurred.width(), blurred.height(), |x, y| {
            let Rgb(pixel) = *blurred.get_pixel(x, y);
            let distance = pixel
                .iter()
                .zip(mean)
                .map(|(&value, mean)| (mean - value) * (mean - value))
                .sum::<f32>();
            Luma([distance])
        })
    }
}
