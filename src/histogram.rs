//! Joint RGB histograms restricted to a mask.

use image::Rgb32FImage;
use ndarray::{Array1, Array3, ArrayView1, ArrayView3};

use crate::errors::{Result, SimplicityError};
use crate::mask::BinaryMask;
use crate::traits::HistogramEstimator;

/// Joint colour histogram over three channels.
///
/// Values are stored flat; the bin for per-channel bins `(r, g, b)` sits at
/// `r * n² + g * n + b` where `n` is `bins_per_band`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins_per_band: usize,
    values: Array1<f64>,
}

impl Histogram {
    pub fn new(bins_per_band: usize, values: Array1<f64>) -> Result<Self> {
        let expected = bins_per_band.pow(3);
        if values.len() != expected {
            return Err(SimplicityError::Validation {
                field: "histogram".to_string(),
                reason: format!(
                    "expected {expected} bins for {bins_per_band} bins per band, got {}",
                    values.len()
                ),
            });
        }
        Ok(Self {
            bins_per_band,
            values,
        })
    }

    pub fn zeros(bins_per_band: usize) -> Self {
        Self {
            bins_per_band,
            values: Array1::zeros(bins_per_band.pow(3)),
        }
    }

    pub fn bins_per_band(&self) -> usize {
        self.bins_per_band
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest bin value; 0 for an empty histogram.
    pub fn peak(&self) -> f64 {
        self.values.fold(0.0_f64, |peak, &v| peak.max(v))
    }

    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    pub fn bin_index(&self, r: usize, g: usize, b: usize) -> usize {
        let n = self.bins_per_band;
        (r * n + g) * n + b
    }

    pub fn get(&self, r: usize, g: usize, b: usize) -> f64 {
        self.values[self.bin_index(r, g, b)]
    }

    /// `n × n × n` view indexed by per-channel bins.
    pub fn as_cube(&self) -> Result<ArrayView3<'_, f64>> {
        let n = self.bins_per_band;
        Ok(self.values.view().into_shape_with_order((n, n, n))?)
    }
}

/// Bin of a unit-range channel value; out-of-range values land in the edge bins.
fn channel_bin(value: f32, bins: usize) -> usize {
    ((value * bins as f32) as usize).min(bins - 1)
}

/// Counts only pixels whose mask value is 1 and normalises the result to sum
/// to 1. An empty selection yields an all-zero histogram.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskingHistogram;

impl HistogramEstimator for MaskingHistogram {
    fn estimate(
        &self,
        image: &Rgb32FImage,
        mask: &BinaryMask,
        bins_per_band: usize,
    ) -> Result<Histogram> {
        if image.dimensions() != mask.dimensions() {
            return Err(SimplicityError::DimensionMismatch {
                expected: image.dimensions(),
                actual: mask.dimensions(),
            });
        }
        if bins_per_band == 0 {
            return Err(SimplicityError::Validation {
                field: "bins_per_band".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let n = bins_per_band;
        let mut counts = Array3::<f64>::zeros((n, n, n));
        let mut total = 0usize;

        for (pixel, selected) in image.pixels().zip(mask.as_image().pixels()) {
            if selected.0[0] != 1.0 {
                continue;
            }
            let [r, g, b] = pixel.0;
            counts[[channel_bin(r, n), channel_bin(g, n), channel_bin(b, n)]] += 1.0;
            total += 1;
        }

        if total > 0 {
            let total = total as f64;
            counts.mapv_inplace(|count| count / total);
        }

        Histogram::new(n, counts.into_shape_with_order(n * n * n)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saliency::BoundingBox;
    use image::Rgb;

    #[test]
    fn test_channel_binning() {
        assert_eq!(channel_bin(0.0, 16), 0);
        assert_eq!(channel_bin(0.49, 2), 0);
        assert_eq!(channel_bin(0.5, 2), 1);
        assert_eq!(channel_bin(1.0, 16), 15);
        assert_eq!(channel_bin(-0.2, 4), 0);
        assert_eq!(channel_bin(3.0, 4), 3);
    }

    #[test]
    fn test_only_selected_pixels_are_counted() -> Result<()> {
        // Left half black, right half white; only the right half is selected.
        let image = Rgb32FImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgb([0.0, 0.0, 0.0])
            } else {
                Rgb([1.0, 1.0, 1.0])
            }
        });
        let mut mask = BinaryMask::new(4, 2);
        mask.fill_box(&BoundingBox::new(2, 0, 2, 2));

        let histogram = MaskingHistogram.estimate(&image, &mask, 4)?;
        assert_eq!(histogram.len(), 64);
        assert_eq!(histogram.get(3, 3, 3), 1.0);
        assert_eq!(histogram.get(0, 0, 0), 0.0);
        assert_eq!(histogram.as_cube()?[[3, 3, 3]], 1.0);
        Ok(())
    }

    #[test]
    fn test_two_colours_split_evenly() -> Result<()> {
        let image = Rgb32FImage::from_fn(4, 4, |_, y| {
            if y < 2 {
                Rgb([0.1, 0.1, 0.1])
            } else {
                Rgb([0.9, 0.2, 0.7])
            }
        });
        let mask = BinaryMask::filled(4, 4);

        let histogram = MaskingHistogram.estimate(&image, &mask, 2)?;
        let non_zero = histogram.values().iter().filter(|&&v| v > 0.0).count();
        assert_eq!(non_zero, 2);
        assert_eq!(histogram.get(0, 0, 0), 0.5);
        assert_eq!(histogram.get(1, 0, 1), 0.5);
        assert!((histogram.total() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_empty_selection_gives_zero_histogram() -> Result<()> {
        let image = Rgb32FImage::from_pixel(3, 3, Rgb([0.5, 0.5, 0.5]));
        let histogram = MaskingHistogram.estimate(&image, &BinaryMask::new(3, 3), 16)?;
        assert_eq!(histogram, Histogram::zeros(16));
        assert_eq!(histogram.peak(), 0.0);
        Ok(())
    }

    #[test]
    fn test_mismatched_mask_fails_fast() {
        let image = Rgb32FImage::new(4, 4);
        let err = MaskingHistogram
            .estimate(&image, &BinaryMask::new(4, 3), 16)
            .unwrap_err();
        assert!(matches!(
            err,
            SimplicityError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 3)
            }
        ));
    }

    #[test]
    fn test_histogram_length_is_checked() {
        assert!(Histogram::new(2, Array1::zeros(7)).is_err());
        assert!(Histogram::new(2, Array1::zeros(8)).is_ok());
    }
}
