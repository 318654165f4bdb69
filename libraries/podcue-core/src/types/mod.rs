//! Episode and theme domain types

mod episode;
mod ids;
mod theme;

pub use episode::{Bookmark, EpisodeDescriptor, Section};
pub use ids::{EpisodeId, PodcastId};
pub use theme::{Palette, Rgb};
