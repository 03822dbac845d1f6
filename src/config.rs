use clap::Parser;
use image::ImageFormat;
use std::path::PathBuf;

use crate::errors::{Result, SimplicityError};

/// Default segmentation scale: 500 on an 8-bit scale, expressed for unit-range pixels.
pub const DEFAULT_K: f32 = 500.0 / 255.0;

/// Immutable parameters of the simplicity pipeline.
///
/// The last four fields are forwarded to the saliency provider; the core
/// masking and scoring stages only read `bins_per_band`, `gamma`, `box_mode`
/// and `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplicityConfig {
    /// Histogram bins per colour channel; the joint histogram has `n^3` bins.
    pub bins_per_band: usize,
    /// Fraction of the peak bin a bin must reach to count as significant.
    pub gamma: f32,
    /// Use bounding boxes of salient regions instead of thresholding the dense map.
    pub box_mode: bool,
    /// Fraction of the saliency maximum used as the foreground threshold.
    pub alpha: f32,
    pub saliency_sigma: f32,
    pub segmenter_sigma: f32,
    pub k: f32,
    pub min_size: usize,
}

impl Default for SimplicityConfig {
    fn default() -> Self {
        Self {
            bins_per_band: 16,
            gamma: 0.01,
            box_mode: true,
            alpha: 0.67,
            saliency_sigma: 1.0,
            segmenter_sigma: 0.5,
            k: DEFAULT_K,
            min_size: 50,
        }
    }
}

impl SimplicityConfig {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        bins_per_band: usize,
        gamma: f32,
        box_mode: bool,
        alpha: f32,
        saliency_sigma: f32,
        segmenter_sigma: f32,
        k: f32,
        min_size: usize,
    ) -> Self {
        Self {
            bins_per_band,
            gamma,
            box_mode,
            alpha,
            saliency_sigma,
            segmenter_sigma,
            k,
            min_size,
        }
    }

    pub const fn with_bins_per_band(mut self, bins_per_band: usize) -> Self {
        self.bins_per_band = bins_per_band;
        self
    }

    pub const fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub const fn with_box_mode(mut self, box_mode: bool) -> Self {
        self.box_mode = box_mode;
        self
    }

    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub const fn with_saliency_params(
        mut self,
        saliency_sigma: f32,
        segmenter_sigma: f32,
        k: f32,
        min_size: usize,
    ) -> Self {
        self.saliency_sigma = saliency_sigma;
        self.segmenter_sigma = segmenter_sigma;
        self.k = k;
        self.min_size = min_size;
        self
    }

    /// Checks every parameter. `gamma` must lie in (0, 1]; `alpha == 0` and
    /// `alpha >= 1` are accepted since both have a defined (degenerate) outcome.
    pub fn validate(&self) -> Result<()> {
        if !(1..=256).contains(&self.bins_per_band) {
            return Err(SimplicityError::Validation {
                field: "bins_per_band".to_string(),
                reason: format!("must be within 1..=256, got {}", self.bins_per_band),
            });
        }

        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(SimplicityError::Validation {
                field: "gamma".to_string(),
                reason: format!("must be within (0, 1], got {}", self.gamma),
            });
        }

        let non_negative = [
            ("alpha", self.alpha),
            ("saliency_sigma", self.saliency_sigma),
            ("segmenter_sigma", self.segmenter_sigma),
            ("k", self.k),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimplicityError::Validation {
                    field: field.to_string(),
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }

        Ok(())
    }
}

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Image file or directory of images to score
    pub input: PathBuf,

    /// Write a mask/bounding-box overlay per image into this directory
    #[arg(short, long)]
    pub debug_dir: Option<PathBuf>,

    #[arg(short, long, default_value = "png", value_parser = check_format)]
    pub format: String,

    #[arg(short, long, default_value_t = 16)]
    pub bins_per_band: usize,

    #[arg(short, long, default_value_t = 0.01)]
    pub gamma: f32,

    #[arg(short, long, default_value_t = 0.67)]
    pub alpha: f32,

    /// Threshold the dense saliency map instead of filling region bounding boxes
    #[arg(long, default_value_t = false)]
    pub threshold_mode: bool,

    #[arg(long, default_value_t = 1.0)]
    pub saliency_sigma: f32,

    #[arg(long, default_value_t = 0.5)]
    pub segmenter_sigma: f32,

    #[arg(short, long, default_value_t = DEFAULT_K)]
    pub k: f32,

    #[arg(long, default_value_t = 50)]
    pub min_size: usize,

    /// Worker threads; 0 lets rayon decide
    #[arg(short, long, default_value_t = 0)]
    pub num_threads: usize,

    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Also write rotated log files into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn simplicity_config(&self) -> SimplicityConfig {
        SimplicityConfig::new(
            self.bins_per_band,
            self.gamma,
            !self.threshold_mode,
            self.alpha,
            self.saliency_sigma,
            self.segmenter_sigma,
            self.k,
            self.min_size,
        )
    }

    pub fn output_format(&self) -> ImageFormat {
        ImageFormat::from_extension(&self.format).unwrap_or(ImageFormat::Png)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn check_format(s: &str) -> std::result::Result<String, String> {
    let supported: Vec<_> = ImageFormat::all()
        .filter(|f| f.writing_enabled())
        .flat_map(|f| f.extensions_str())
        .map(|s| format!("`{}`", s))
        .collect();
    let supported_message = format!("Supported formats: {}", supported.join(", "));

    let format = ImageFormat::from_extension(s)
        .ok_or(format!("{} is not supported. {}", s, supported_message))?;
    if !format.writing_enabled() {
        return Err(format!("{} is not supported. {}", s, supported_message));
    }

    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_parameters() {
        let config = SimplicityConfig::default();
        assert_eq!(config.bins_per_band, 16);
        assert_eq!(config.gamma, 0.01);
        assert!(config.box_mode);
        assert_eq!(config.alpha, 0.67);
        assert_eq!(config.min_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_degenerate_alpha_is_accepted() {
        assert!(SimplicityConfig::default().with_alpha(0.0).validate().is_ok());
        assert!(SimplicityConfig::default().with_alpha(1.1).validate().is_ok());
    }

    #[test]
    fn test_gamma_upper_bound_is_inclusive() {
        assert!(SimplicityConfig::default().with_gamma(1.0).validate().is_ok());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            SimplicityConfig::default().with_bins_per_band(0),
            SimplicityConfig::default().with_bins_per_band(512),
            SimplicityConfig::default().with_gamma(-0.1),
            SimplicityConfig::default().with_gamma(0.0),
            SimplicityConfig::default().with_gamma(1.5),
            SimplicityConfig::default().with_gamma(f32::NAN),
            SimplicityConfig::default().with_alpha(f32::NAN),
            SimplicityConfig::default().with_saliency_params(1.0, f32::INFINITY, 1.0, 10),
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(SimplicityError::Validation { .. })),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn test_cli_maps_to_simplicity_config() {
        let config = Config::parse_from([
            "simplicity-rs",
            "photos",
            "--bins-per-band",
            "8",
            "--alpha",
            "0.5",
            "--threshold-mode",
            "--min-size",
            "20",
        ]);

        let params = config.simplicity_config();
        assert_eq!(params.bins_per_band, 8);
        assert_eq!(params.alpha, 0.5);
        assert!(!params.box_mode);
        assert_eq!(params.min_size, 20);
        assert_eq!(params.k, DEFAULT_K);
        assert_eq!(config.output_format(), ImageFormat::Png);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(check_format("nope").is_err());
        assert!(check_format("png").is_ok());
    }
}
