//! Error types for raster layer rendering.

use field_common::{ColorError, FieldError};
use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised while building, decoding or drawing the raster.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid bitmap size {width}x{height}")]
    InvalidBitmapSize { width: usize, height: usize },

    #[error("Invalid surface size {width}x{height}")]
    InvalidSurfaceSize { width: u32, height: u32 },

    #[error("Bitmap decoder is gone")]
    DecoderClosed,

    #[error("Decode task failed: {0}")]
    DecodeTask(String),

    #[error("PNG encoding failed: {0}")]
    PngError(String),

    #[error("Invalid layer config: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::ConfigError(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::IoError(err.to_string())
    }
}
