//! Error types for plyframes.

use thiserror::Error;

/// Result type alias using `PlyError`.
pub type Result<T> = std::result::Result<T, PlyError>;

/// Every failure a verb can surface to its caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlyError {
    /// Unknown verb kind or invalid option.
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// Reference to a column or group key that does not exist.
    #[error("KeyError: {0}")]
    KeyError(String),

    /// Value of the wrong type for the operation.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Value of the right type but an unusable shape or content.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Expression text that could not be tokenized or parsed.
    #[error("ExpressionError: {0}")]
    ExpressionError(String),

    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CsvError: {0}")]
    CsvError(#[from] csv::Error),

    #[cfg(feature = "arrow")]
    #[error("ArrowError: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
}

impl PlyError {
    pub(crate) fn key(msg: impl Into<String>) -> Self {
        PlyError::KeyError(msg.into())
    }

    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        PlyError::TypeError(msg.into())
    }

    pub(crate) fn value(msg: impl Into<String>) -> Self {
        PlyError::ValueError(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PlyError::ConfigError(msg.into())
    }
}
