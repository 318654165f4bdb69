//! In-process engine with a virtual playhead
//!
//! [`SimulatedEngine`] plays registered media on tokio time: no decoding, no
//! device. The playhead advances with the clock times the rate, stops at the
//! end and emits [`EngineEvent::Ended`]. Under a paused test runtime every
//! timing is deterministic.

use crate::engine::{AudioEngine, EngineEvent};
use crate::error::{EngineError, EngineResult, LoadError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Engine that simulates playback of registered media
pub struct SimulatedEngine {
    inner: Arc<Mutex<Playhead>>,
    library: Mutex<HashMap<String, Result<f64, LoadError>>>,
    events: mpsc::UnboundedSender<EngineEvent>,
    load_latency: Duration,
}

struct Playhead {
    url: Option<String>,
    duration: Option<f64>,
    anchor_position: f64,
    anchor_instant: Instant,
    playing: bool,
    rate: f64,
    volume: f64,
    muted: bool,
    load_generation: u64,
    end_timer: Option<JoinHandle<()>>,
}

impl Playhead {
    fn position(&self) -> f64 {
        if !self.playing {
            return self.anchor_position;
        }

        let elapsed = self.anchor_instant.elapsed().as_secs_f64();
        let position = self.anchor_position + elapsed * self.rate;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    /// Fold elapsed time into the anchor so rate or state can change
    fn reanchor(&mut self) {
        self.anchor_position = self.position();
        self.anchor_instant = Instant::now();
    }

    fn cancel_end_timer(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }

    fn unload(&mut self) {
        self.cancel_end_timer();
        self.url = None;
        self.duration = None;
        self.playing = false;
        self.anchor_position = 0.0;
        self.anchor_instant = Instant::now();
    }
}

impl SimulatedEngine {
    /// Create an engine and the receiver for its events
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let engine = Self {
            inner: Arc::new(Mutex::new(Playhead {
                url: None,
                duration: None,
                anchor_position: 0.0,
                anchor_instant: Instant::now(),
                playing: false,
                rate: 1.0,
                volume: 1.0,
                muted: false,
                load_generation: 0,
                end_timer: None,
            })),
            library: Mutex::new(HashMap::new()),
            events,
            load_latency: Duration::ZERO,
        };
        (engine, receiver)
    }

    /// Delay every load by `latency`
    #[must_use]
    pub fn with_load_latency(mut self, latency: Duration) -> Self {
        self.load_latency = latency;
        self
    }

    /// Make `url` loadable with the given duration
    pub fn register(&self, url: impl Into<String>, duration_seconds: f64) {
        self.lock_library().insert(url.into(), Ok(duration_seconds));
    }

    /// Make loads of `url` fail with `error`
    pub fn register_failure(&self, url: impl Into<String>, error: LoadError) {
        self.lock_library().insert(url.into(), Err(error));
    }

    /// Media currently loaded
    pub fn loaded_url(&self) -> Option<String> {
        self.lock().url.clone()
    }

    /// Whether the playhead is moving
    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    /// Output volume
    pub fn volume(&self) -> f64 {
        self.lock().volume
    }

    /// Whether output is muted
    pub fn is_muted(&self) -> bool {
        self.lock().muted
    }

    /// Playback speed
    pub fn rate(&self) -> f64 {
        self.lock().rate
    }

    fn lock(&self) -> MutexGuard<'_, Playhead> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_library(&self) -> MutexGuard<'_, HashMap<String, Result<f64, LoadError>>> {
        self.library.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the timer that ends playback, replacing any earlier one
    fn schedule_end(&self, playhead: &mut Playhead) {
        playhead.cancel_end_timer();

        let (Some(url), Some(duration)) = (playhead.url.clone(), playhead.duration) else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime, end of {} will not be reported", url);
            return;
        };

        let remaining = ((duration - playhead.position()) / playhead.rate).max(0.0);
        let wait = Duration::try_from_secs_f64(remaining).unwrap_or(Duration::MAX);
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let generation = playhead.load_generation;

        playhead.end_timer = Some(handle.spawn(async move {
            tokio::time::sleep(wait).await;

            {
                let mut playhead = inner.lock().unwrap_or_else(PoisonError::into_inner);
                if playhead.load_generation != generation || !playhead.playing {
                    return;
                }
                playhead.anchor_position = duration;
                playhead.anchor_instant = Instant::now();
                playhead.playing = false;
                playhead.end_timer = None;
            }

            tracing::debug!("Simulated playback of {} ended", url);
            let _ = events.send(EngineEvent::Ended { url });
        }));
    }
}

#[async_trait]
impl AudioEngine for SimulatedEngine {
    async fn load(&self, url: &str) -> Result<(), LoadError> {
        let generation = {
            let mut playhead = self.lock();
            playhead.unload();
            playhead.load_generation += 1;
            playhead.load_generation
        };

        if !self.load_latency.is_zero() {
            tokio::time::sleep(self.load_latency).await;
        }

        let entry = self.lock_library().get(url).cloned();
        let duration = {
            let mut playhead = self.lock();
            if playhead.load_generation != generation {
                return Err(LoadError::Aborted);
            }

            let duration = match entry {
                Some(Ok(duration)) => duration,
                Some(Err(error)) => return Err(error),
                None => return Err(LoadError::Unreachable(format!("no media at {url}"))),
            };

            playhead.url = Some(url.to_string());
            playhead.duration = Some(duration);
            playhead.anchor_position = 0.0;
            playhead.anchor_instant = Instant::now();
            duration
        };

        let _ = self.events.send(EngineEvent::MetadataReady {
            url: url.to_string(),
            duration,
        });
        Ok(())
    }

    fn play(&self) -> EngineResult<()> {
        let mut playhead = self.lock();
        if playhead.url.is_none() {
            return Err(EngineError::NoMedia);
        }
        if playhead.playing {
            return Ok(());
        }

        playhead.anchor_instant = Instant::now();
        playhead.playing = true;
        self.schedule_end(&mut playhead);
        Ok(())
    }

    fn pause(&self) -> EngineResult<()> {
        let mut playhead = self.lock();
        if playhead.playing {
            playhead.reanchor();
            playhead.playing = false;
            playhead.cancel_end_timer();
        }
        Ok(())
    }

    fn seek(&self, seconds: f64) -> EngineResult<()> {
        let mut playhead = self.lock();
        if playhead.url.is_none() {
            return Err(EngineError::NoMedia);
        }

        let mut target = seconds.max(0.0);
        if let Some(duration) = playhead.duration {
            target = target.min(duration);
        }
        playhead.anchor_position = target;
        playhead.anchor_instant = Instant::now();

        if playhead.playing {
            self.schedule_end(&mut playhead);
        }
        Ok(())
    }

    fn set_volume(&self, volume: f64) -> EngineResult<()> {
        self.lock().volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_muted(&self, muted: bool) -> EngineResult<()> {
        self.lock().muted = muted;
        Ok(())
    }

    fn set_rate(&self, rate: f64) -> EngineResult<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(EngineError::Device(format!("unsupported rate {rate}")));
        }

        let mut playhead = self.lock();
        playhead.reanchor();
        playhead.rate = rate;
        if playhead.playing {
            self.schedule_end(&mut playhead);
        }
        Ok(())
    }

    fn position(&self) -> f64 {
        self.lock().position()
    }

    fn duration(&self) -> Option<f64> {
        self.lock().duration
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.lock().cancel_end_timer();
    }
}
