use thiserror::Error;

/// Errors that can occur while deriving a palette from artwork
///
/// These never reach playback: [`crate::ThemeExtractor::extract`] recovers from
/// all of them with the neutral palette.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Network or client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Artwork request failed with status {0}")]
    Status(u16),

    /// Bytes are not a decodable image
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// Artwork too large
    #[error("Artwork too large: {0} bytes (max {1} bytes)")]
    TooLarge(usize, usize),

    /// Image has no opaque pixels to sample
    #[error("Artwork has no usable pixels")]
    Empty,

    /// Background decode task failed
    #[error("Palette task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;
