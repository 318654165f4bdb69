//! Audio engine abstraction
//!
//! Everything that touches a real playback primitive sits behind
//! [`AudioEngine`], so sessions can be driven and tested without a device.

use crate::error::{EngineResult, LoadError};
use async_trait::async_trait;

/// Notification emitted by an engine
///
/// Events name the media they refer to so late notifications for a replaced
/// episode can be told apart from current ones.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Duration of the loaded media became known
    MetadataReady {
        /// Media the event refers to
        url: String,
        /// Duration in seconds
        duration: f64,
    },

    /// Playback reached the end of the media
    Ended {
        /// Media the event refers to
        url: String,
    },
}

impl EngineEvent {
    /// Media the event refers to
    pub fn url(&self) -> &str {
        match self {
            Self::MetadataReady { url, .. } | Self::Ended { url } => url,
        }
    }
}

/// Playback primitive
///
/// Implementations report completion of `load` by returning and push
/// [`EngineEvent`]s through a channel handed out at construction. No retries
/// happen at this layer.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Load the media at `url`, resolving once it can play
    async fn load(&self, url: &str) -> Result<(), LoadError>;

    /// Start or resume playback
    fn play(&self) -> EngineResult<()>;

    /// Pause playback
    fn pause(&self) -> EngineResult<()>;

    /// Move the playhead
    fn seek(&self, seconds: f64) -> EngineResult<()>;

    /// Set output volume (0.0 - 1.0)
    fn set_volume(&self, volume: f64) -> EngineResult<()>;

    /// Mute or unmute output
    fn set_muted(&self, muted: bool) -> EngineResult<()>;

    /// Set playback speed
    fn set_rate(&self, rate: f64) -> EngineResult<()>;

    /// Current playhead in seconds
    fn position(&self) -> f64;

    /// Duration of the loaded media, if known
    fn duration(&self) -> Option<f64>;
}
