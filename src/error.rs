//! Error types surfaced by the logo pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogoError {
    /// Unreadable or corrupt image bytes.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Storage or generative-image call failed; carries the upstream message.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Trimming would leave no pixels. Recovered by [`crate::trim::trim`].
    #[error("degenerate geometry: trim of {width}x{height} image left no content")]
    DegenerateGeometry { width: u32, height: u32 },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The native outline tool ran but did not produce a usable image.
    #[error("native tool error: {0}")]
    NativeTool(String),
}

pub type Result<T> = std::result::Result<T, LogoError>;

impl From<image::ImageError> for LogoError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(u) => LogoError::UnsupportedFormat(u.to_string()),
            other => LogoError::Decode(other.to_string()),
        }
    }
}
