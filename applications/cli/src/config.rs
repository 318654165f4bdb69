/// CLI configuration
use crate::error::{CliError, Result};
use podcue_playback::PlaybackConfig;
use podcue_theme::ThemeConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default configuration file, read when present
pub const DEFAULT_CONFIG_FILE: &str = "podcue.toml";

/// Environment prefix; `PODCUE__PLAYBACK__SKIP_SECONDS=30` sets `playback.skip_seconds`
pub const ENV_PREFIX: &str = "PODCUE";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PodcueConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub theme: ThemeConfig,
}

impl PodcueConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `podcue.toml` is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`PodcueConfig::load`], reading variables from `env` instead of the process
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (PODCUE__SECTION__KEY)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;

        if !playback.skip_seconds.is_finite() || playback.skip_seconds <= 0.0 {
            return Err(CliError::Config(format!(
                "playback.skip_seconds must be positive, got {}",
                playback.skip_seconds
            )));
        }

        if playback.poll_interval.is_zero() {
            return Err(CliError::Config(
                "playback.poll_interval must be greater than zero".to_string(),
            ));
        }

        if !playback.initial_rate.is_finite() || playback.initial_rate <= 0.0 {
            return Err(CliError::Config(format!(
                "playback.initial_rate must be positive, got {}",
                playback.initial_rate
            )));
        }

        if !(0.0..=1.0).contains(&playback.initial_volume) {
            return Err(CliError::Config(format!(
                "playback.initial_volume must be between 0 and 1, got {}",
                playback.initial_volume
            )));
        }

        // Unmuting must be audible
        let fallback = playback.unmute_fallback_volume;
        if fallback.is_nan() || fallback <= 0.0 || fallback > 1.0 {
            return Err(CliError::Config(format!(
                "playback.unmute_fallback_volume must be above 0 and at most 1, got {fallback}"
            )));
        }

        if self.theme.palette_size == 0 {
            return Err(CliError::Config(
                "theme.palette_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
