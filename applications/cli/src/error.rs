/// CLI error types
use podcue_playback::{LoadError, PlaybackError};
use podcue_theme::ThemeError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read episode file {path:?}: {source}")]
    EpisodeFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid episode JSON in {path:?}: {source}")]
    EpisodeJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Episode failed to load: {0}")]
    Load(#[from] LoadError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}
