/// Episode domain types
use crate::types::{EpisodeId, PodcastId};
use serde::{Deserialize, Serialize};

/// Everything the player needs to know about one episode
///
/// Supplied by the episode source (browse, search, profile screens) and
/// accepted as-is. Once selected it is never mutated in place: a change such as
/// a late duration produces a new descriptor that replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDescriptor {
    /// Unique episode identifier
    pub id: EpisodeId,

    /// Podcast this episode belongs to
    pub podcast_id: PodcastId,

    /// Episode title
    pub title: String,

    /// Display name of the podcaster
    #[serde(default)]
    pub podcaster_name: String,

    /// Cover art used for ambient theming
    #[serde(default)]
    pub artwork_url: Option<String>,

    /// Resolved audio resource handed to the engine
    pub audio_url: String,

    /// Duration in seconds (unknown until the engine reports metadata)
    #[serde(default)]
    pub duration_seconds: Option<f64>,

    /// Chapters, sorted ascending by start
    #[serde(default)]
    pub sections: Vec<Section>,

    /// User bookmarks
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl EpisodeDescriptor {
    /// Create a descriptor with the required fields only
    pub fn new(
        id: impl Into<String>,
        podcast_id: impl Into<String>,
        title: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: EpisodeId::new(id),
            podcast_id: PodcastId::new(podcast_id),
            title: title.into(),
            podcaster_name: String::new(),
            artwork_url: None,
            audio_url: audio_url.into(),
            duration_seconds: None,
            sections: Vec::new(),
            bookmarks: Vec::new(),
        }
    }

    /// Set the podcaster display name
    #[must_use]
    pub fn with_podcaster(mut self, name: impl Into<String>) -> Self {
        self.podcaster_name = name.into();
        self
    }

    /// Set the artwork URL
    #[must_use]
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Set a known duration
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Set the sections (stable-sorted by start, so equal starts keep list order)
    #[must_use]
    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self.sort_sections();
        self
    }

    /// Set the bookmarks
    #[must_use]
    pub fn with_bookmarks(mut self, bookmarks: Vec<Bookmark>) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    /// Copy of this descriptor carrying an authoritative duration
    #[must_use]
    pub fn with_known_duration(&self, seconds: f64) -> Self {
        Self {
            duration_seconds: Some(seconds),
            ..self.clone()
        }
    }

    /// Sort sections ascending by start time
    ///
    /// The sort is stable: sections sharing a start keep their relative order.
    pub fn sort_sections(&mut self) {
        self.sections
            .sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
    }

    /// Whether the sections are sorted ascending by start
    pub fn sections_sorted(&self) -> bool {
        self.sections
            .windows(2)
            .all(|pair| pair[0].start_seconds <= pair[1].start_seconds)
    }
}

/// A chapter within an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Section title
    pub title: String,

    /// Offset from the start of the episode
    #[serde(alias = "start", alias = "startTime")]
    pub start_seconds: f64,
}

impl Section {
    /// Create a new section
    pub fn new(title: impl Into<String>, start_seconds: f64) -> Self {
        Self {
            title: title.into(),
            start_seconds,
        }
    }
}

/// A user bookmark at a point in an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Bookmark title
    pub title: String,

    /// Free-form note
    #[serde(default)]
    pub note: Option<String>,

    /// Position of the bookmark
    #[serde(alias = "time")]
    pub timestamp_seconds: f64,
}

impl Bookmark {
    /// Create a bookmark without a note
    pub fn new(title: impl Into<String>, timestamp_seconds: f64) -> Self {
        Self {
            title: title.into(),
            note: None,
            timestamp_seconds,
        }
    }

    /// Attach a note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
