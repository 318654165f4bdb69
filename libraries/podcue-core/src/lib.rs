//! PodCue Core
//!
//! Platform-agnostic episode types and position lookups shared by every PodCue crate.
//!
//! This crate provides:
//! - **Domain Types**: `EpisodeDescriptor`, `Section`, `Bookmark`, `Palette`
//! - **Locator**: which section is active and which bookmarks are near a position
//! - **Time formatting**: `MM:SS` timestamps and "1 hr 5 min" labels
//!
//! # Example
//!
//! ```rust
//! use podcue_core::{locator, EpisodeDescriptor, Section};
//!
//! let episode = EpisodeDescriptor::new("ep1", "pod1", "Pilot", "https://cdn.example/ep1.mp3")
//!     .with_duration(600.0)
//!     .with_sections(vec![Section::new("Intro", 0.0), Section::new("Interview", 95.0)]);
//!
//! let section = locator::active_section(120.0, &episode.sections);
//! assert_eq!(section.map(|s| s.title.as_str()), Some("Interview"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod locator;
pub mod time;
pub mod types;

pub use types::{Bookmark, EpisodeDescriptor, EpisodeId, Palette, PodcastId, Rgb, Section};
