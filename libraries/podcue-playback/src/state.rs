//! Session state record and the actions that mutate it

use crate::types::{LoadState, PlaybackConfig};
use podcue_core::locator;
use podcue_core::{Bookmark, EpisodeDescriptor, EpisodeId, Palette};
use std::sync::Arc;

/// The single mutable playback session record
///
/// Only changed through [`PlaybackState::apply`], which keeps the invariants:
/// position within `[0, duration]` once the duration is known, volume within
/// `[0, 1]`, and `active_section_title` derived from the position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Selected episode
    pub episode: Option<Arc<EpisodeDescriptor>>,

    /// Load lifecycle of `episode`
    pub load_state: LoadState,

    /// Whether audio is playing
    pub is_playing: bool,

    /// Playhead in seconds
    pub position_seconds: f64,

    /// Volume (0.0 - 1.0)
    pub volume: f64,

    /// Whether output is muted
    pub is_muted: bool,

    /// Volume to restore on unmute
    pub muted_volume_memo: f64,

    /// Playback speed multiplier
    pub playback_rate: f64,

    /// Title of the section containing the playhead
    pub active_section_title: Option<String>,

    /// Artwork colours of the selected episode
    pub palette: Arc<Palette>,

    /// Bumped on every episode selection
    pub generation: u64,
}

/// Identity of one episode selection
///
/// Captured by asynchronous work so its result can be dropped once another
/// episode has been selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    /// Generation at selection time
    pub generation: u64,
    /// Episode selected
    pub episode_id: EpisodeId,
}

/// Named state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackAction {
    /// Replace the episode, reset the playhead and start loading
    SelectEpisode(Arc<EpisodeDescriptor>),

    /// Drop the episode and return to idle
    ClearEpisode,

    /// Record a load result, optionally with the duration it reported
    SetLoadState {
        /// New load state
        load_state: LoadState,
        /// Duration reported by the engine
        duration: Option<f64>,
    },

    /// Record a late duration
    SetDuration(f64),

    /// Move the playhead
    SetPosition(f64),

    /// Playing or paused
    SetPlaying(bool),

    /// Set the volume; zero mutes, non-zero unmutes
    SetVolume(f64),

    /// Mute (remembering `volume`) or unmute (restoring `volume`)
    SetMuted {
        /// Target mute flag
        muted: bool,
        /// Volume remembered when muting, restored when unmuting
        volume: f64,
    },

    /// Change the playback speed
    SetRate(f64),

    /// Apply artwork colours
    SetPalette(Arc<Palette>),
}

impl PlaybackState {
    /// Fresh session using the configured initial volume and rate
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            episode: None,
            load_state: LoadState::Idle,
            is_playing: false,
            position_seconds: 0.0,
            volume: clamp_volume(config.initial_volume).unwrap_or(0.0),
            is_muted: false,
            muted_volume_memo: 0.0,
            playback_rate: if config.initial_rate.is_finite() && config.initial_rate > 0.0 {
                config.initial_rate
            } else {
                1.0
            },
            active_section_title: None,
            palette: Arc::new(Palette::neutral()),
            generation: 0,
        }
    }

    /// Apply one action
    pub fn apply(&mut self, action: &PlaybackAction) {
        match action {
            PlaybackAction::SelectEpisode(episode) => {
                self.generation += 1;
                self.episode = Some(Arc::clone(episode));
                self.load_state = LoadState::Loading;
                self.is_playing = false;
                self.position_seconds = 0.0;
                self.palette = Arc::new(Palette::neutral());
            }
            PlaybackAction::ClearEpisode => {
                self.generation += 1;
                self.episode = None;
                self.load_state = LoadState::Idle;
                self.is_playing = false;
                self.position_seconds = 0.0;
                self.palette = Arc::new(Palette::neutral());
            }
            PlaybackAction::SetLoadState {
                load_state,
                duration,
            } => {
                self.load_state = *load_state;
                if *load_state != LoadState::Ready {
                    self.is_playing = false;
                }
                if let Some(duration) = duration {
                    self.set_duration(*duration);
                }
            }
            PlaybackAction::SetDuration(duration) => self.set_duration(*duration),
            PlaybackAction::SetPosition(position) => {
                if !position.is_nan() {
                    self.position_seconds = *position;
                }
            }
            PlaybackAction::SetPlaying(playing) => self.is_playing = *playing,
            PlaybackAction::SetVolume(volume) => {
                if let Some(volume) = clamp_volume(*volume) {
                    self.volume = volume;
                    if volume == 0.0 {
                        self.is_muted = true;
                        self.muted_volume_memo = 0.0;
                    } else {
                        self.is_muted = false;
                    }
                }
            }
            PlaybackAction::SetMuted { muted, volume } => {
                let volume = clamp_volume(*volume).unwrap_or(0.0);
                if *muted {
                    self.muted_volume_memo = volume;
                    self.volume = 0.0;
                } else {
                    self.volume = volume;
                }
                self.is_muted = *muted;
            }
            PlaybackAction::SetRate(rate) => {
                if rate.is_finite() && *rate > 0.0 {
                    self.playback_rate = *rate;
                }
            }
            PlaybackAction::SetPalette(palette) => self.palette = Arc::clone(palette),
        }

        self.position_seconds = clamp_position(self.position_seconds, self.duration_seconds());
        self.active_section_title = self.episode.as_ref().and_then(|episode| {
            locator::active_section_title(self.position_seconds, &episode.sections)
        });
    }

    /// Ticket for the current selection
    pub fn ticket(&self) -> Option<SessionTicket> {
        self.episode.as_ref().map(|episode| SessionTicket {
            generation: self.generation,
            episode_id: episode.id.clone(),
        })
    }

    /// Whether `ticket` still identifies the current selection
    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.generation == ticket.generation
            && self
                .episode
                .as_ref()
                .is_some_and(|episode| episode.id == ticket.episode_id)
    }

    /// Whether transport commands are accepted
    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    /// Authoritative duration, once known
    pub fn duration_seconds(&self) -> Option<f64> {
        self.episode.as_ref().and_then(|episode| episode.duration_seconds)
    }

    /// Seconds left to play, once the duration is known
    pub fn remaining_seconds(&self) -> Option<f64> {
        self.duration_seconds()
            .map(|duration| (duration - self.position_seconds).max(0.0))
    }

    /// Fraction played (0.0 - 1.0); zero while the duration is unknown
    pub fn progress(&self) -> f64 {
        match self.duration_seconds() {
            Some(duration) if duration > 0.0 => (self.position_seconds / duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Bookmarks of the current episode within `window_seconds` of the playhead
    pub fn nearby_bookmarks(&self, window_seconds: f64) -> Vec<&Bookmark> {
        self.episode.as_ref().map_or_else(Vec::new, |episode| {
            locator::nearby_bookmarks(self.position_seconds, &episode.bookmarks, window_seconds)
        })
    }

    fn set_duration(&mut self, duration: f64) {
        if !duration.is_finite() || duration < 0.0 {
            return;
        }
        if let Some(episode) = &self.episode {
            if episode.duration_seconds != Some(duration) {
                self.episode = Some(Arc::new(episode.with_known_duration(duration)));
            }
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

/// Clamp a playhead to `[0, duration]`, or to `[0, ∞)` while the duration is unknown
pub fn clamp_position(position: f64, duration: Option<f64>) -> f64 {
    let position = position.max(0.0);
    match duration {
        Some(duration) if duration.is_finite() && duration >= 0.0 => position.min(duration),
        _ => position,
    }
}

fn clamp_volume(volume: f64) -> Option<f64> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcue_core::Section;

    fn episode(id: &str) -> Arc<EpisodeDescriptor> {
        Arc::new(
            EpisodeDescriptor::new(id, "pod", format!("Episode {id}"), format!("https://cdn/{id}.mp3"))
                .with_sections(vec![Section::new("Intro", 0.0), Section::new("Body", 30.0)]),
        )
    }

    fn ready(state: &mut PlaybackState, duration: f64) {
        state.apply(&PlaybackAction::SetLoadState {
            load_state: LoadState::Ready,
            duration: Some(duration),
        });
    }

    #[test]
    fn select_resets_session() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        ready(&mut state, 100.0);
        state.apply(&PlaybackAction::SetPlaying(true));
        state.apply(&PlaybackAction::SetPosition(50.0));

        state.apply(&PlaybackAction::SelectEpisode(episode("b")));

        assert_eq!(state.generation, 2);
        assert_eq!(state.load_state, LoadState::Loading);
        assert!(!state.is_playing);
        assert_eq!(state.position_seconds, 0.0);
        assert_eq!(state.active_section_title.as_deref(), Some("Intro"));
        assert!(state.palette.is_neutral());
    }

    #[test]
    fn clear_drops_episode_and_invalidates_tickets() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        ready(&mut state, 100.0);
        state.apply(&PlaybackAction::SetPosition(40.0));
        let ticket = state.ticket().unwrap();

        state.apply(&PlaybackAction::ClearEpisode);

        assert!(state.episode.is_none());
        assert_eq!(state.load_state, LoadState::Idle);
        assert_eq!(state.position_seconds, 0.0);
        assert!(state.active_section_title.is_none());
        assert!(!state.is_current(&ticket));
    }

    #[test]
    fn position_is_clamped_to_duration() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        ready(&mut state, 300.0);

        state.apply(&PlaybackAction::SetPosition(400.0));
        assert_eq!(state.position_seconds, 300.0);

        state.apply(&PlaybackAction::SetPosition(-10.0));
        assert_eq!(state.position_seconds, 0.0);

        state.apply(&PlaybackAction::SetPosition(f64::NAN));
        assert_eq!(state.position_seconds, 0.0);
    }

    #[test]
    fn unknown_duration_only_clamps_below() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        state.apply(&PlaybackAction::SetPosition(5000.0));
        assert_eq!(state.position_seconds, 5000.0);
        assert_eq!(state.remaining_seconds(), None);
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn shorter_duration_pulls_position_back() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        state.apply(&PlaybackAction::SetPosition(90.0));
        state.apply(&PlaybackAction::SetDuration(60.0));

        assert_eq!(state.position_seconds, 60.0);
        assert_eq!(state.duration_seconds(), Some(60.0));
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn duration_replaces_descriptor() {
        let original = episode("a");
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(Arc::clone(&original)));
        state.apply(&PlaybackAction::SetDuration(120.0));

        assert_eq!(original.duration_seconds, None);
        assert!(!Arc::ptr_eq(&original, state.episode.as_ref().unwrap()));
        assert_eq!(state.duration_seconds(), Some(120.0));
    }

    #[test]
    fn active_section_follows_position() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        ready(&mut state, 300.0);

        state.apply(&PlaybackAction::SetPosition(29.0));
        assert_eq!(state.active_section_title.as_deref(), Some("Intro"));

        state.apply(&PlaybackAction::SetPosition(30.0));
        assert_eq!(state.active_section_title.as_deref(), Some("Body"));
    }

    #[test]
    fn zero_volume_mutes_and_clears_memo() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SetMuted {
            muted: true,
            volume: 0.6,
        });
        assert_eq!(state.muted_volume_memo, 0.6);

        state.apply(&PlaybackAction::SetVolume(0.0));
        assert!(state.is_muted);
        assert_eq!(state.muted_volume_memo, 0.0);

        state.apply(&PlaybackAction::SetVolume(0.4));
        assert!(!state.is_muted);
        assert_eq!(state.volume, 0.4);
    }

    #[test]
    fn volume_is_clamped_and_nan_ignored() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SetVolume(1.5));
        assert_eq!(state.volume, 1.0);

        state.apply(&PlaybackAction::SetVolume(f64::NAN));
        assert_eq!(state.volume, 1.0);
    }

    #[test]
    fn invalid_rate_is_ignored() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SetRate(1.5));
        state.apply(&PlaybackAction::SetRate(0.0));
        state.apply(&PlaybackAction::SetRate(-2.0));
        assert_eq!(state.playback_rate, 1.5);
    }

    #[test]
    fn errored_load_stops_playing() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        state.apply(&PlaybackAction::SetPlaying(true));
        state.apply(&PlaybackAction::SetLoadState {
            load_state: LoadState::Errored,
            duration: None,
        });
        assert!(!state.is_playing);
    }

    #[test]
    fn tickets_expire_on_reselection() {
        let mut state = PlaybackState::default();
        assert!(state.ticket().is_none());

        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        let first = state.ticket().unwrap();
        assert!(state.is_current(&first));

        // Same episode selected again still invalidates the old ticket
        state.apply(&PlaybackAction::SelectEpisode(episode("a")));
        assert!(!state.is_current(&first));
        assert!(state.is_current(&state.ticket().unwrap()));
    }

    #[test]
    fn nearby_bookmarks_use_playhead() {
        let mut state = PlaybackState::default();
        let episode = EpisodeDescriptor::new("a", "pod", "A", "a.mp3")
            .with_bookmarks(vec![Bookmark::new("near", 20.0), Bookmark::new("far", 200.0)]);
        state.apply(&PlaybackAction::SelectEpisode(Arc::new(episode)));
        state.apply(&PlaybackAction::SetPosition(10.0));

        let nearby = state.nearby_bookmarks(15.0);
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].title, "near");
    }
}
