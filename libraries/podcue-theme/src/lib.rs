//! PodCue Theme - artwork palette extraction
//!
//! Derives a small ordered list of representative colours from episode artwork
//! for ambient theming of player surfaces.
//!
//! # Features
//!
//! - Pluggable artwork source ([`ArtworkFetcher`]), HTTP by default
//! - K-means colour clustering, most dominant colour first
//! - LRU caching by artwork URL
//! - Neutral fallback palette: theming never blocks playback
//!
//! # Example
//!
//! ```no_run
//! use podcue_theme::{ThemeConfig, ThemeExtractor};
//!
//! # async fn run() -> podcue_theme::Result<()> {
//! let extractor = ThemeExtractor::http(ThemeConfig::default())?;
//! let palette = extractor.extract("https://cdn.example/cover.jpg").await;
//!
//! for color in palette.colors() {
//!     println!("{color}");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod extractor;
mod fetcher;
pub mod palette;

// Re-export public API
pub use config::ThemeConfig;
pub use error::{Result, ThemeError};
pub use extractor::ThemeExtractor;
pub use fetcher::{ArtworkFetcher, HttpArtworkFetcher};
pub use podcue_core::{Palette, Rgb};
