//! Error types for scalar fields and colors.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors raised while building or reading a scalar field.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Grid shape mismatch: expected {expected} values for {columns}x{rows}, got {actual}")]
    ShapeMismatch {
        columns: usize,
        rows: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Missing header field: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid header line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    #[error("Invalid value '{token}' at position {position}")]
    InvalidValue { token: String, position: usize },

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for FieldError {
    fn from(err: std::io::Error) -> Self {
        FieldError::IoError(err.to_string())
    }
}

/// Errors raised while parsing colors or building color scales.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Invalid color function: {0}")]
    InvalidFunction(String),

    #[error("Unknown color: {0}")]
    Unknown(String),

    #[error("Color scale needs at least one color")]
    EmptyScale,
}
