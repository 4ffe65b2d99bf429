//! Error types shared across the prediction pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Error, Debug)]
pub enum ForecastError {
    /// A categorical label with no entry in its code table. Unreachable from
    /// the served form, which only offers table-backed labels.
    #[error("unknown {field} label {label:?}")]
    UnknownCategoryLabel { field: &'static str, label: String },

    /// A classifier or scaler artifact is missing or corrupt. Fatal at
    /// startup; nothing is served without both artifacts.
    #[error("cannot load artifact {path:?}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// A feature vector of the wrong dimensionality reached the scaler or
    /// the classifier. Indicates a broken encoder contract, not bad input.
    #[error("feature vector has {got} dimensions, expected {expected}")]
    FeatureShape { expected: usize, got: usize },

    /// A submitted field was missing, unparseable, or outside its domain.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The underlying classifier rejected the input.
    #[error(transparent)]
    Predict(#[from] smartcore::error::Failed),
}

impl ForecastError {
    /// Attach artifact path context to a load failure.
    pub fn model_load(path: &std::path::Path, reason: impl fmt::Display) -> Self {
        ForecastError::ModelLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
