//! PodCue - Playback Session Management
//!
//! Platform-agnostic management of the single, process-wide playback session.
//!
//! This crate provides:
//! - Session store with named actions and subscriptions
//! - Transport controller (select, play/pause, seek, skip, volume, mute, rate)
//! - Staleness guard for episode loads racing with episode switches
//! - Idempotent position poller
//! - Up-next episode queue (never auto-advances)
//! - Simulated engine for tests and headless use
//!
//! # Architecture
//!
//! `podcue-playback` knows nothing about audio devices or UI toolkits:
//! - Audio output is reached through the [`AudioEngine`] trait
//! - Surfaces read [`PlaybackStore::state`] and [`PlaybackStore::subscribe`]
//! - Only [`TransportController`] dispatches actions
//!
//! # Example
//!
//! ```rust,no_run
//! use podcue_core::EpisodeDescriptor;
//! use podcue_playback::{PlaybackConfig, SimulatedEngine, TransportController};
//! use std::sync::Arc;
//!
//! # async fn run() -> podcue_playback::Result<()> {
//! let (engine, events) = SimulatedEngine::new();
//! engine.register("https://cdn.example/ep1.mp3", 1800.0);
//!
//! let controller = Arc::new(TransportController::new(
//!     Arc::new(engine),
//!     PlaybackConfig::default(),
//! ));
//! controller.listen(events);
//!
//! let episode = EpisodeDescriptor::new("ep1", "pod1", "Pilot", "https://cdn.example/ep1.mp3");
//! controller.select_episode(episode).await;
//!
//! controller.play()?;
//! controller.skip_forward()?;
//! controller.set_volume(0.8)?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod engine;
pub mod error;
pub mod poller;
pub mod queue;
pub mod simulated;
pub mod state;
pub mod store;
pub mod types;

// Re-export main types
pub use controller::TransportController;
pub use engine::{AudioEngine, EngineEvent};
pub use error::{EngineError, EngineResult, LoadError, PlaybackError, Result};
pub use poller::PositionPoller;
pub use queue::EpisodeQueue;
pub use simulated::SimulatedEngine;
pub use state::{PlaybackAction, PlaybackState, SessionTicket};
pub use store::{Listener, PlaybackStore, Subscription};
pub use types::{LoadOutcome, LoadState, PlaybackConfig};
