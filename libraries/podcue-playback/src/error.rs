//! Error types for playback sessions

use crate::types::LoadState;
use thiserror::Error;

/// Why an engine could not load a media resource
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// Resource could not be reached
    #[error("Media unreachable: {0}")]
    Unreachable(String),

    /// Resource was reached but could not be decoded
    #[error("Media undecodable: {0}")]
    Undecodable(String),

    /// A newer load replaced this one before it finished
    #[error("Load aborted by a newer load")]
    Aborted,
}

/// Audio engine command failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Loading failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Command needs loaded media
    #[error("No media loaded")]
    NoMedia,

    /// Device level failure
    #[error("Audio device error: {0}")]
    Device(String),
}

/// Playback errors
///
/// `NotReady` and `InvalidOperation` never change session state: the call was a
/// no-op and callers racing ahead of a load may ignore them.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Transport command issued before the episode finished loading
    #[error("Episode not ready (load state: {0})")]
    NotReady(LoadState),

    /// No episode is selected
    #[error("No episode selected")]
    NoEpisode,

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Result type for engine commands
pub type EngineResult<T> = std::result::Result<T, EngineError>;
