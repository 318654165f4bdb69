//! Core types for playback sessions

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Load lifecycle of the selected episode
///
/// `Idle -> Loading -> Ready | Errored`. Selecting another episode always
/// restarts at `Loading`; `Errored` is terminal for that attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadState {
    /// Nothing selected yet
    #[default]
    Idle,
    /// Engine is loading the selected episode
    Loading,
    /// Episode is loaded and accepts transport commands
    Ready,
    /// Load failed
    Errored,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// How a `select_episode` call ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Episode loaded and is the current session
    Ready,
    /// Load failed; the session is `Errored`
    Errored(LoadError),
    /// Another episode was selected while loading; the result was discarded
    Superseded,
}

impl LoadOutcome {
    /// Whether the episode is loaded and current
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Default skip amount in seconds (default: 10)
    pub skip_seconds: f64,

    /// Position sampling cadence while playing (default: 1 s)
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,

    /// Volume restored when unmuting with nothing remembered (default: 0.3)
    pub unmute_fallback_volume: f64,

    /// Volume of a fresh session (default: 0.3)
    pub initial_volume: f64,

    /// Playback rate of a fresh session (default: 1.0)
    pub initial_rate: f64,

    /// Window for nearby bookmark lookups in seconds (default: 15)
    pub bookmark_window_seconds: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            skip_seconds: 10.0,
            poll_interval: Duration::from_secs(1),
            unmute_fallback_volume: DEFAULT_UNMUTE_VOLUME,
            initial_volume: 0.3,
            initial_rate: 1.0,
            bookmark_window_seconds: 15.0,
        }
    }
}

/// Fallback used when the configured unmute volume is not audible
const DEFAULT_UNMUTE_VOLUME: f64 = 0.3;

impl PlaybackConfig {
    /// Volume to restore on unmute when nothing audible was remembered
    ///
    /// Never zero: a silent or invalid setting falls back to 0.3.
    pub fn unmute_volume(&self) -> f64 {
        let volume = self.unmute_fallback_volume;
        if volume.is_finite() && volume > 0.0 {
            volume.min(1.0)
        } else {
            DEFAULT_UNMUTE_VOLUME
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
