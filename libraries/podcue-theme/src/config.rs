//! Theme extractor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`crate::ThemeExtractor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Maximum number of palettes kept in the LRU cache (default: 64)
    pub cache_size: usize,

    /// Number of colours per palette (default: 2)
    pub palette_size: usize,

    /// Largest artwork accepted, in bytes (default: 5 MiB)
    pub max_artwork_bytes: usize,

    /// HTTP timeout for artwork downloads (default: 10 s)
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,

    /// Maximum number of pixels sampled per image (default: 6000)
    pub sample_limit: usize,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            cache_size: 64,
            palette_size: 2,
            max_artwork_bytes: 5 * 1024 * 1024,
            fetch_timeout: Duration::from_secs(10),
            sample_limit: 6_000,
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
