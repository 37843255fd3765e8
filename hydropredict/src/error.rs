//! Error types returned by the loader, the prediction engine and the service.
//!
//! None of these are fatal: callers receive them as values and decide how to
//! surface them (the binaries print them, the FFI layer maps them to codes).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a scaler or classifier while handling a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("expected {expected} rows, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("scaled value in column {column} is not finite")]
    NonFinite { column: usize },

    #[error("classifier produced no finite score")]
    NoFiniteScore,

    #[error("column {position} should be `{expected}` but is `{found}`")]
    ColumnMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("classifier returned no prediction for a non-empty batch")]
    EmptyBatch,

    #[error("malformed model: {0}")]
    Malformed(String),
}

/// Artifact loading failures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing artifact: {}", path.display())]
    MissingArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt artifact {}: {cause}", path.display())]
    CorruptArtifact { path: PathBuf, cause: String },
}

impl LoadError {
    /// Path of the artifact that failed to load.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::MissingArtifact { path, .. } | Self::CorruptArtifact { path, .. } => path,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        Self::CorruptArtifact {
            path: path.into(),
            cause: cause.to_string(),
        }
    }
}

/// Rejections produced by the prediction engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("expected {expected} feature values, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("feature value at index {index} is not a finite number")]
    InvalidInput { index: usize },

    #[error("transform failed: {0}")]
    TransformFailure(#[from] ModelError),
}

/// Errors surfaced by [`crate::service::InferenceService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("predictions are disabled: {reason}")]
    Unavailable { reason: String },

    #[error("unknown feature `{name}`")]
    UnknownFeature { name: String },

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}
