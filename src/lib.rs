pub mod config;
pub mod errors;
pub mod histogram;
pub mod imageops;
pub mod logging;
pub mod mask;
pub mod render;
pub mod saliency;
pub mod scoring;
pub mod simplicity;
pub mod traits;

pub mod mocks;

use image::ImageFormat;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use config::{Config, SimplicityConfig};
pub use errors::{Result, SimplicityError, Stage};
pub use histogram::{Histogram, MaskingHistogram};
pub use mask::{BackgroundMask, BinaryMask, MaskStrategy};
pub use render::MaskRenderer;
pub use saliency::{BoundingBox, ConnectedComponent, SaliencyMap, SalientRegion, YehSaliency};
pub use simplicity::{ModifiedLuoSimplicity, SimplicityReport};
pub use traits::*;

/// Score of one image file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredImage {
    pub path: PathBuf,
    pub score: f64,
}

/// Scores every image below a path, optionally writing debug overlays.
pub struct BatchScorer<S = YehSaliency, H = MaskingHistogram> {
    extractor: ModifiedLuoSimplicity<S, H>,
    renderer: MaskRenderer,
    debug_dir: Option<PathBuf>,
    debug_format: ImageFormat,
    show_progress: bool,
}

impl BatchScorer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = ModifiedLuoSimplicity::new(config.simplicity_config())?;
        let scorer = Self::new(extractor);
        Ok(match &config.debug_dir {
            Some(dir) => scorer.with_debug_output(dir.clone(), config.output_format()),
            None => scorer,
        })
    }
}

impl<S, H> BatchScorer<S, H>
where
    S: SaliencyProvider,
    H: HistogramEstimator,
{
    pub fn new(extractor: ModifiedLuoSimplicity<S, H>) -> Self {
        Self {
            extractor,
            renderer: MaskRenderer::default(),
            debug_dir: None,
            debug_format: ImageFormat::Png,
            show_progress: true,
        }
    }

    pub fn with_debug_output(mut self, dir: PathBuf, format: ImageFormat) -> Self {
        self.debug_dir = Some(dir);
        self.debug_format = format;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn extractor(&self) -> &ModifiedLuoSimplicity<S, H> {
        &self.extractor
    }

    /// Scores a single image file or every supported image in a directory.
    pub fn run(&self, input: &Path) -> Result<Vec<ScoredImage>> {
        if input.is_dir() {
            return self.process_directory(input);
        }
        if !input.is_file() {
            return Err(SimplicityError::FileSystem {
                path: input.to_path_buf(),
                operation: "input lookup".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input path does not exist",
                ),
            });
        }

        let root = input.parent().unwrap_or_else(|| Path::new(""));
        Ok(vec![self.score_file(input, root)?])
    }

    /// Scores the directory tree below `input_dir`; results are sorted by path.
    pub fn process_directory(&self, input_dir: &Path) -> Result<Vec<ScoredImage>> {
        if !input_dir.is_dir() {
            return Err(SimplicityError::FileSystem {
                path: input_dir.to_path_buf(),
                operation: "directory lookup".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory does not exist",
                ),
            });
        }

        if let Some(debug_dir) = &self.debug_dir {
            fs::create_dir_all(debug_dir).map_err(|e| SimplicityError::FileSystem {
                path: debug_dir.clone(),
                operation: "create debug directory".to_string(),
                source: e,
            })?;
        }

        let image_files = self.collect_image_files(input_dir);
        if image_files.is_empty() {
            warn!("no supported images found in {}", input_dir.display());
            return Ok(Vec::new());
        }
        info!("scoring {} images in {}", image_files.len(), input_dir.display());

        let progress_bar = if self.show_progress {
            ProgressBar::new(image_files.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec} {eta})",
            )
            .map_err(|e| SimplicityError::Configuration {
                message: format!("invalid progress template: {e}"),
            })?
            .progress_chars("#>-"),
        );

        let mut scores = image_files
            .par_iter()
            .progress_with(progress_bar.clone())
            .map(|path| self.score_file(path, input_dir))
            .collect::<Result<Vec<_>>>()?;
        progress_bar.finish();

        scores.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(scores)
    }

    pub fn collect_image_files(&self, input_dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported_image_format(e.path()))
            .map(|e| e.into_path())
            .collect()
    }

    pub fn is_supported_image_format(&self, path: &Path) -> bool {
        is_supported_image_format(path)
    }

    /// Scores one file; `root` anchors the debug overlay's relative path.
    pub fn score_file(&self, path: &Path, root: &Path) -> Result<ScoredImage> {
        let image = image::open(path).map_err(|e| SimplicityError::ImageProcessing {
            path: path.display().to_string(),
            operation: "decode".to_string(),
            source: Box::new(e),
        })?;
        let rgb = image.to_rgb32f();

        let report = self
            .extractor
            .analyse(&rgb)
            .map_err(|e| SimplicityError::ImageProcessing {
                path: path.display().to_string(),
                operation: "score".to_string(),
                source: Box::new(e),
            })?;
        debug!("{}: {:.4}", path.display(), report.score());

        if let Some(debug_dir) = &self.debug_dir {
            let overlay = self
                .renderer
                .render(&rgb, report.background_mask(), report.boxes())?;
            let output_file = self.debug_output_path(path, root, debug_dir)?;
            if let Some(parent) = output_file.parent() {
                fs::create_dir_all(parent).map_err(|e| SimplicityError::FileSystem {
                    path: parent.to_path_buf(),
                    operation: "create debug directory".to_string(),
                    source: e,
                })?;
            }
            overlay
                .save_with_format(&output_file, self.debug_format)
                .map_err(|e| SimplicityError::ImageProcessing {
                    path: output_file.display().to_string(),
                    operation: "save debug overlay".to_string(),
                    source: Box::new(e),
                })?;
        }

        Ok(ScoredImage {
            path: path.to_path_buf(),
            score: report.score(),
        })
    }

    /// Where the overlay for `path` goes: same relative location below
    /// `debug_dir`, with the debug format's extension.
    pub fn debug_output_path(&self, path: &Path, root: &Path, debug_dir: &Path) -> Result<PathBuf> {
        let relative = get_relative_path(path, root)?;
        let extension = self
            .debug_format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("png");
        Ok(debug_dir.join(relative).with_extension(extension))
    }
}

pub fn is_supported_image_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(
                ext.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" | "tiff" | "avif"
            )
        })
}

pub fn get_relative_path(input_file: &Path, root: &Path) -> Result<PathBuf> {
    input_file
        .strip_prefix(root)
        .map(|p| p.to_path_buf())
        .map_err(|_| SimplicityError::FileSystem {
            path: input_file.to_path_buf(),
            operation: "relative path".to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file is not inside the input directory",
            ),
        })
}
