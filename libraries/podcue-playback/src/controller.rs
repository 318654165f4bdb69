//! Transport controller
//!
//! The only component that talks to both the engine and the store. Every
//! user intent (select, play, seek, volume, ...) enters here; state changes
//! are dispatched after the matching engine command succeeded.
//!
//! Asynchronous results (loads, artwork palettes, engine notifications) are
//! applied through [`PlaybackStore::dispatch_if`] with the [`SessionTicket`]
//! captured when the work started, so a result for an episode that has since
//! been replaced is dropped without touching state or the engine.

use crate::engine::{AudioEngine, EngineEvent};
use crate::error::{EngineResult, PlaybackError, Result};
use crate::poller::PositionPoller;
use crate::queue::EpisodeQueue;
use crate::state::{clamp_position, PlaybackAction, PlaybackState, SessionTicket};
use crate::store::PlaybackStore;
use crate::types::{LoadOutcome, LoadState, PlaybackConfig};
use podcue_core::{Bookmark, EpisodeDescriptor};
use podcue_theme::ThemeExtractor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Mediates every transport command of the playback session
pub struct TransportController {
    store: Arc<PlaybackStore>,
    engine: Arc<dyn AudioEngine>,
    poller: PositionPoller,
    theme: Option<Arc<ThemeExtractor>>,
    queue: Mutex<EpisodeQueue>,
    config: PlaybackConfig,
}

impl TransportController {
    /// Create a controller with a fresh session store
    pub fn new(engine: Arc<dyn AudioEngine>, config: PlaybackConfig) -> Self {
        let store = Arc::new(PlaybackStore::new(&config));
        Self::with_store(store, engine, config)
    }

    /// Create a controller over an existing store
    pub fn with_store(
        store: Arc<PlaybackStore>,
        engine: Arc<dyn AudioEngine>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            store,
            engine,
            poller: PositionPoller::new(config.poll_interval),
            theme: None,
            queue: Mutex::new(EpisodeQueue::new()),
            config,
        }
    }

    /// Derive the session palette from episode artwork
    #[must_use]
    pub fn with_theme(mut self, extractor: Arc<ThemeExtractor>) -> Self {
        self.theme = Some(extractor);
        self
    }

    /// Session store, for reading and subscribing
    pub fn store(&self) -> &Arc<PlaybackStore> {
        &self.store
    }

    /// Snapshot of the session
    pub fn state(&self) -> PlaybackState {
        self.store.state()
    }

    /// Active configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Whether the position poller is running
    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    // ===== Episode selection =====

    /// Make `episode` the session and load it
    ///
    /// Legal from any state. Pauses the current episode, resets the session to
    /// `Loading` and waits for the engine. If another episode is selected before
    /// the load finishes, the result is discarded and `Superseded` returned.
    pub async fn select_episode(&self, episode: impl Into<Arc<EpisodeDescriptor>>) -> LoadOutcome {
        let episode = episode.into();

        let previous = self.store.state();
        if previous.is_playing {
            if let Err(e) = self.engine.pause() {
                tracing::warn!("Failed to pause previous episode: {}", e);
            }
        }
        self.poller.stop();

        let state = self
            .store
            .dispatch(PlaybackAction::SelectEpisode(Arc::clone(&episode)));
        let ticket = SessionTicket {
            generation: state.generation,
            episode_id: episode.id.clone(),
        };
        tracing::info!("Selected episode {} ({})", episode.id, episode.title);

        self.spawn_theme(&ticket, &episode);

        match self.engine.load(&episode.audio_url).await {
            Ok(()) => {
                let duration = self.engine.duration().or(episode.duration_seconds);
                let applied = self.store.dispatch_if(
                    |state| state.is_current(&ticket),
                    PlaybackAction::SetLoadState {
                        load_state: LoadState::Ready,
                        duration,
                    },
                );
                if !applied {
                    tracing::debug!("Discarding stale load of episode {}", episode.id);
                    return LoadOutcome::Superseded;
                }

                self.apply_transport_settings();
                tracing::info!("Episode {} ready ({:?} s)", episode.id, duration);
                LoadOutcome::Ready
            }
            Err(e) => {
                let applied = self.store.dispatch_if(
                    |state| state.is_current(&ticket),
                    PlaybackAction::SetLoadState {
                        load_state: LoadState::Errored,
                        duration: None,
                    },
                );
                if !applied {
                    tracing::debug!("Discarding stale load failure of episode {}: {}", episode.id, e);
                    return LoadOutcome::Superseded;
                }

                tracing::warn!("Failed to load episode {}: {}", episode.id, e);
                LoadOutcome::Errored(e)
            }
        }
    }

    fn spawn_theme(&self, ticket: &SessionTicket, episode: &EpisodeDescriptor) {
        let (Some(theme), Some(url)) = (&self.theme, &episode.artwork_url) else {
            return;
        };

        let theme = Arc::clone(theme);
        let store = Arc::clone(&self.store);
        let ticket = ticket.clone();
        let url = url.clone();

        tokio::spawn(async move {
            let palette = theme.extract(&url).await;
            let applied = store.dispatch_if(
                |state| state.is_current(&ticket),
                PlaybackAction::SetPalette(palette),
            );
            if !applied {
                tracing::debug!("Discarding stale palette for {}", url);
            }
        });
    }

    /// Push volume, mute and rate to a freshly loaded engine
    fn apply_transport_settings(&self) {
        let state = self.store.state();
        log_engine_failure("set volume", self.engine.set_volume(state.volume));
        log_engine_failure("set mute", self.engine.set_muted(state.is_muted));
        log_engine_failure("set rate", self.engine.set_rate(state.playback_rate));
    }

    // ===== Play / pause =====

    /// Start playback; no-op when already playing
    pub fn play(&self) -> Result<()> {
        let state = self.store.state();
        let ticket = ready_ticket(&state)?;

        if !state.is_playing {
            self.engine.play()?;
            self.store.dispatch_if(
                |state| state.is_current(&ticket) && state.is_ready(),
                PlaybackAction::SetPlaying(true),
            );
        }

        self.start_poller(ticket);
        Ok(())
    }

    /// Pause playback; no-op when already paused
    ///
    /// Takes one last position sample so the session shows where audio stopped.
    pub fn pause(&self) -> Result<()> {
        let state = self.store.state();
        let ticket = ready_ticket(&state)?;

        if state.is_playing {
            self.engine.pause()?;
            let position = self.engine.position();
            self.store.dispatch_if(
                |state| state.is_current(&ticket),
                PlaybackAction::SetPosition(position),
            );
            self.store.dispatch_if(
                |state| state.is_current(&ticket),
                PlaybackAction::SetPlaying(false),
            );
        }

        self.poller.stop();
        Ok(())
    }

    /// Toggle between playing and paused; returns whether now playing
    pub fn toggle_play_pause(&self) -> Result<bool> {
        if self.store.state().is_playing {
            self.pause()?;
            Ok(false)
        } else {
            self.play()?;
            Ok(true)
        }
    }

    fn start_poller(&self, ticket: SessionTicket) {
        let store = Arc::clone(&self.store);
        let engine = Arc::clone(&self.engine);
        self.poller.start(move || {
            let position = engine.position();
            store.dispatch_if(
                |state| state.is_current(&ticket) && state.is_playing,
                PlaybackAction::SetPosition(position),
            );
        });
    }

    /// Take one position sample now
    ///
    /// Returns the new position, or `None` when nothing is loaded.
    pub fn sample_position(&self) -> Option<f64> {
        let ticket = ready_ticket(&self.store.state()).ok()?;
        let position = self.engine.position();
        let applied = self.store.dispatch_if(
            |state| state.is_current(&ticket) && state.is_ready(),
            PlaybackAction::SetPosition(position),
        );
        applied.then(|| self.store.state().position_seconds)
    }

    // ===== Seeking =====

    /// Move the playhead to `target` seconds, clamped to the episode
    ///
    /// The session position updates right away without waiting for the
    /// engine to report it. Returns the clamped position.
    pub fn seek(&self, target: f64) -> Result<f64> {
        if target.is_nan() {
            return Err(PlaybackError::InvalidOperation("seek target is NaN".into()));
        }

        let state = self.store.state();
        let ticket = ready_ticket(&state)?;
        let clamped = clamp_position(target, state.duration_seconds());

        self.engine.seek(clamped)?;
        self.store.dispatch_if(
            |state| state.is_current(&ticket),
            PlaybackAction::SetPosition(clamped),
        );
        tracing::debug!("Seeked to {:.1}s", clamped);
        Ok(clamped)
    }

    /// Seek to a fraction (0.0 - 1.0) of the duration
    pub fn seek_to_fraction(&self, fraction: f64) -> Result<f64> {
        if fraction.is_nan() {
            return Err(PlaybackError::InvalidOperation("seek fraction is NaN".into()));
        }

        let state = self.store.state();
        ready_ticket(&state)?;
        let duration = state.duration_seconds().ok_or_else(|| {
            PlaybackError::InvalidOperation("duration unknown, cannot seek by fraction".into())
        })?;

        self.seek(duration * fraction.clamp(0.0, 1.0))
    }

    /// Skip forward by `amount` seconds
    pub fn skip_forward_by(&self, amount: f64) -> Result<f64> {
        self.skip(validate_skip(amount)?)
    }

    /// Skip backward by `amount` seconds
    pub fn skip_backward_by(&self, amount: f64) -> Result<f64> {
        self.skip(-validate_skip(amount)?)
    }

    /// Skip forward by the configured amount
    pub fn skip_forward(&self) -> Result<f64> {
        self.skip_forward_by(self.config.skip_seconds)
    }

    /// Skip backward by the configured amount
    pub fn skip_backward(&self) -> Result<f64> {
        self.skip_backward_by(self.config.skip_seconds)
    }

    fn skip(&self, delta: f64) -> Result<f64> {
        let state = self.store.state();
        ready_ticket(&state)?;
        self.seek(state.position_seconds + delta)
    }

    // ===== Volume / mute / rate =====

    /// Set the volume, clamped to 0.0 - 1.0
    ///
    /// Zero mutes; any other value clears a mute.
    pub fn set_volume(&self, volume: f64) -> Result<f64> {
        if !volume.is_finite() {
            return Err(PlaybackError::InvalidOperation(format!(
                "volume must be finite, got {volume}"
            )));
        }

        let volume = volume.clamp(0.0, 1.0);
        let muted = volume == 0.0;
        let was_muted = self.store.state().is_muted;

        self.engine.set_volume(volume)?;
        if muted != was_muted {
            self.engine.set_muted(muted)?;
        }

        self.store.dispatch(PlaybackAction::SetVolume(volume));
        Ok(volume)
    }

    /// Mute or unmute; returns whether now muted
    ///
    /// Muting remembers the volume. Unmuting restores it, or the configured
    /// fallback when nothing audible was remembered.
    pub fn toggle_mute(&self) -> Result<bool> {
        let state = self.store.state();

        if state.is_muted {
            let restore = if state.muted_volume_memo > 0.0 {
                state.muted_volume_memo
            } else {
                self.config.unmute_volume()
            };

            self.engine.set_volume(restore)?;
            self.engine.set_muted(false)?;
            self.store.dispatch(PlaybackAction::SetMuted {
                muted: false,
                volume: restore,
            });
            Ok(false)
        } else {
            self.engine.set_muted(true)?;
            self.store.dispatch(PlaybackAction::SetMuted {
                muted: true,
                volume: state.volume,
            });
            Ok(true)
        }
    }

    /// Change playback speed
    ///
    /// Rejects non-positive and non-finite rates without changing anything.
    pub fn set_playback_rate(&self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PlaybackError::InvalidOperation(format!(
                "playback rate must be positive, got {rate}"
            )));
        }

        self.engine.set_rate(rate)?;
        self.store.dispatch(PlaybackAction::SetRate(rate));
        Ok(())
    }

    // ===== Engine notifications =====

    /// Route one engine notification; returns whether it was applied
    pub fn handle_engine_event(&self, event: EngineEvent) -> bool {
        match event {
            EngineEvent::MetadataReady { url, duration } => self.on_metadata_ready(&url, duration),
            EngineEvent::Ended { url } => self.on_ended(&url),
        }
    }

    /// Feed engine notifications into this controller until the channel closes
    ///
    /// The task only holds a weak reference and exits once the controller is dropped.
    pub fn listen(self: &Arc<Self>, mut events: mpsc::UnboundedReceiver<EngineEvent>) -> JoinHandle<()> {
        let controller = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                controller.handle_engine_event(event);
            }
            tracing::debug!("Engine event listener finished");
        })
    }

    /// Record a duration reported after load
    pub fn on_metadata_ready(&self, url: &str, duration: f64) -> bool {
        let Some(ticket) = self.current_ticket_for(url) else {
            tracing::debug!("Ignoring metadata for {}", url);
            return false;
        };

        self.store.dispatch_if(
            |state| state.is_current(&ticket) && state.is_ready(),
            PlaybackAction::SetDuration(duration),
        )
    }

    /// Playback reached the end: stop and rewind, never auto-advance
    pub fn on_ended(&self, url: &str) -> bool {
        let Some(ticket) = self.current_ticket_for(url) else {
            tracing::debug!("Ignoring end of {}", url);
            return false;
        };

        self.poller.stop();
        log_engine_failure("pause", self.engine.pause());
        log_engine_failure("rewind", self.engine.seek(0.0));

        let applied = self.store.dispatch_if(
            |state| state.is_current(&ticket),
            PlaybackAction::SetPlaying(false),
        );
        self.store.dispatch_if(
            |state| state.is_current(&ticket),
            PlaybackAction::SetPosition(0.0),
        );

        tracing::info!("Episode {} finished", ticket.episode_id);
        applied
    }

    /// Ticket of the current episode if it is ready and plays `url`
    fn current_ticket_for(&self, url: &str) -> Option<SessionTicket> {
        let state = self.store.state();
        let episode = state.episode.as_ref()?;
        if episode.audio_url != url || !state.is_ready() {
            return None;
        }
        state.ticket()
    }

    // ===== Bookmarks =====

    /// Bookmarks near the playhead, within the configured window
    pub fn nearby_bookmarks(&self) -> Vec<Bookmark> {
        self.store
            .state()
            .nearby_bookmarks(self.config.bookmark_window_seconds)
            .into_iter()
            .cloned()
            .collect()
    }

    // ===== Queue =====

    /// Replace the queue with `episode` and select it
    pub async fn play_now(&self, episode: impl Into<Arc<EpisodeDescriptor>>) -> LoadOutcome {
        let episode = episode.into();
        self.lock_queue().play_now(Arc::clone(&episode));
        self.select_episode(episode).await
    }

    /// Replace the queue with `episodes` and select the first
    pub async fn play_all(&self, episodes: Vec<Arc<EpisodeDescriptor>>) -> Result<LoadOutcome> {
        let first = {
            let mut queue = self.lock_queue();
            queue.play_all(episodes);
            queue.current()
        };
        let first = first.ok_or(PlaybackError::QueueEmpty)?;
        Ok(self.select_episode(first).await)
    }

    /// Replace the queue with `episodes` shuffled and select the first
    pub async fn shuffle_all(&self, episodes: Vec<Arc<EpisodeDescriptor>>) -> Result<LoadOutcome> {
        let first = {
            let mut queue = self.lock_queue();
            queue.shuffle_all(episodes);
            queue.current()
        };
        let first = first.ok_or(PlaybackError::QueueEmpty)?;
        Ok(self.select_episode(first).await)
    }

    /// Queue `episode` right after the current one
    pub fn enqueue_next(&self, episode: impl Into<Arc<EpisodeDescriptor>>) {
        self.lock_queue().add_next(episode.into());
    }

    /// Queue `episode` at the end
    pub fn enqueue_later(&self, episode: impl Into<Arc<EpisodeDescriptor>>) {
        self.lock_queue().add_later(episode.into());
    }

    /// Select the next queued episode
    pub async fn next_episode(&self) -> Result<LoadOutcome> {
        let next = {
            let mut queue = self.lock_queue();
            if queue.is_empty() {
                return Err(PlaybackError::QueueEmpty);
            }
            let after = queue.index().map_or(0, |index| index + 1);
            queue.advance().ok_or(PlaybackError::IndexOutOfBounds(after))?
        };
        Ok(self.select_episode(next).await)
    }

    /// Select the previous queued episode
    pub async fn previous_episode(&self) -> Result<LoadOutcome> {
        let previous = {
            let mut queue = self.lock_queue();
            if queue.is_empty() {
                return Err(PlaybackError::QueueEmpty);
            }
            let current = queue.index().unwrap_or(0);
            queue.retreat().ok_or(PlaybackError::IndexOutOfBounds(current))?
        };
        Ok(self.select_episode(previous).await)
    }

    /// Select the queued episode at `index`
    pub async fn jump_to(&self, index: usize) -> Result<LoadOutcome> {
        let episode = self
            .lock_queue()
            .jump_to(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;
        Ok(self.select_episode(episode).await)
    }

    /// Drop the queued episode at `index`
    ///
    /// Removing the episode the session is playing moves the session to the
    /// episode the queue cursor lands on, or clears it when the queue is now
    /// empty. Other removals leave the session untouched.
    pub async fn remove_from_queue(&self, index: usize) -> Result<Arc<EpisodeDescriptor>> {
        let (removed, was_current, replacement) = {
            let mut queue = self.lock_queue();
            let was_current = queue.index() == Some(index);
            let removed = queue
                .remove(index)
                .ok_or(PlaybackError::IndexOutOfBounds(index))?;
            (removed, was_current, queue.current())
        };

        let playing_removed = self
            .store
            .state()
            .episode
            .as_ref()
            .is_some_and(|episode| episode.id == removed.id);
        if was_current && playing_removed {
            match replacement {
                Some(episode) => {
                    self.select_episode(episode).await;
                }
                None => self.clear_episode(),
            }
        }
        Ok(removed)
    }

    /// Stop the engine and leave the session without an episode
    fn clear_episode(&self) {
        self.poller.stop();
        if self.store.state().is_playing {
            log_engine_failure("pause", self.engine.pause());
        }
        self.store.dispatch(PlaybackAction::ClearEpisode);
        tracing::info!("Queue emptied, session cleared");
    }

    /// Snapshot of the queue
    pub fn queue(&self) -> EpisodeQueue {
        self.lock_queue().clone()
    }

    fn lock_queue(&self) -> MutexGuard<'_, EpisodeQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TransportController {
    fn drop(&mut self) {
        self.poller.stop();
    }
}

fn ready_ticket(state: &PlaybackState) -> Result<SessionTicket> {
    if !state.is_ready() {
        return Err(PlaybackError::NotReady(state.load_state));
    }
    state.ticket().ok_or(PlaybackError::NoEpisode)
}

fn validate_skip(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(PlaybackError::InvalidOperation(format!(
            "skip amount must be a non-negative number, got {amount}"
        )))
    }
}

fn log_engine_failure(command: &str, result: EngineResult<()>) {
    if let Err(e) = result {
        tracing::warn!("Engine failed to {}: {}", command, e);
    }
}
