use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error raised by a collaborator (saliency provider, histogram estimator).
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Pipeline stage in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Saliency,
    Masking,
    Histogram,
    Scoring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Saliency => "saliency",
            Self::Masking => "masking",
            Self::Histogram => "histogram",
            Self::Scoring => "scoring",
        };
        f.write_str(name)
    }
}

/// Structured error types for simplicity estimation.
///
/// Each variant carries the context of its error domain (stage, file path,
/// configuration field) so callers can match on it instead of parsing
/// messages. Collaborator failures keep the original error as `source`.
#[derive(Error, Debug)]
pub enum SimplicityError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(
        "Dimension mismatch: expected {}x{}, got {}x{}",
        .expected.0, .expected.1, .actual.0, .actual.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: BoxedError,
    },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: BoxedError,
    },
}

impl SimplicityError {
    /// Wraps a collaborator error as a failure of `stage`.
    pub fn stage<E>(stage: Stage, source: E) -> Self
    where
        E: Into<BoxedError>,
    {
        Self::Stage {
            stage,
            source: source.into(),
        }
    }

    /// Attributes an error to `stage` unless it already names one.
    pub fn within(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::stage(stage, other),
        }
    }

    /// The stage this error is attributed to, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimplicityError>;

/// Convert anyhow errors to configuration errors.
///
/// Some call sites (CLI argument checks) produce `anyhow::Error`; they are
/// folded into the configuration domain at the library boundary.
impl From<anyhow::Error> for SimplicityError {
    fn from(err: anyhow::Error) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Code that knows the path and operation should build
/// `SimplicityError::FileSystem` directly.
impl From<std::io::Error> for SimplicityError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

impl From<image::ImageError> for SimplicityError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

/// Shape errors only arise while reshaping histogram storage.
impl From<ndarray::ShapeError> for SimplicityError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::stage(Stage::Histogram, err)
    }
}
