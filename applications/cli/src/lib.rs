//! PodCue CLI Library
//!
//! Headless front end for the PodCue playback session: plays episode
//! descriptors on the simulated engine, inspects sections and bookmarks, and
//! extracts artwork palettes.
//!
//! This library exposes the command implementations for testing purposes.

pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use commands::SessionOptions;
pub use config::PodcueConfig;
pub use error::{CliError, Result};
