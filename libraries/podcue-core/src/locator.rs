//! Section and bookmark lookups by playback position
//!
//! Pure functions: no state, no side effects. The session store calls
//! [`active_section`] on every update so surfaces never compute it themselves.

use crate::types::{Bookmark, Section};

/// Section containing `position`
///
/// Returns the last section whose start is `<= position`, or `None` when the
/// list is empty or `position` precedes the first section. When several
/// sections share a start, the later one in list order wins.
///
/// `sections` must be sorted ascending by start.
///
/// ```
/// use podcue_core::{locator::active_section, Section};
///
/// let sections = vec![Section::new("Intro", 0.0), Section::new("Body", 30.0)];
/// assert_eq!(active_section(29.0, &sections).unwrap().title, "Intro");
/// assert_eq!(active_section(30.0, &sections).unwrap().title, "Body");
/// ```
pub fn active_section(position: f64, sections: &[Section]) -> Option<&Section> {
    // Everything up to the partition point starts at or before `position`;
    // equal starts all fall on the left, so the last one in list order is picked.
    let end = sections.partition_point(|section| section.start_seconds <= position);
    sections[..end].last()
}

/// Title of the section containing `position`
pub fn active_section_title(position: f64, sections: &[Section]) -> Option<String> {
    active_section(position, sections).map(|section| section.title.clone())
}

/// Bookmarks within `window_seconds` of `position`, ordered by timestamp
///
/// The window is inclusive on both sides. A negative or non-finite window
/// matches nothing.
pub fn nearby_bookmarks(position: f64, bookmarks: &[Bookmark], window_seconds: f64) -> Vec<&Bookmark> {
    if !window_seconds.is_finite() || window_seconds < 0.0 {
        return Vec::new();
    }

    let mut nearby: Vec<&Bookmark> = bookmarks
        .iter()
        .filter(|bookmark| (bookmark.timestamp_seconds - position).abs() <= window_seconds)
        .collect();
    nearby.sort_by(|a, b| a.timestamp_seconds.total_cmp(&b.timestamp_seconds));
    nearby
}
