//! Shared fixtures for playback integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use podcue_core::{Bookmark, EpisodeDescriptor, Section};
use podcue_playback::{AudioEngine, EngineError, EngineResult, LoadError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// ===== Episodes =====

pub fn episode(id: &str) -> EpisodeDescriptor {
    EpisodeDescriptor::new(id, "pod1", format!("Episode {id}"), audio_url(id))
}

pub fn audio_url(id: &str) -> String {
    format!("https://cdn.example/{id}.mp3")
}

pub fn chaptered_episode(id: &str) -> EpisodeDescriptor {
    episode(id)
        .with_sections(vec![
            Section::new("Intro", 0.0),
            Section::new("Interview", 30.0),
            Section::new("Outro", 150.0),
        ])
        .with_bookmarks(vec![
            Bookmark::new("Great quote", 40.0),
            Bookmark::new("Sponsor", 160.0).with_note("skip this"),
        ])
}

// ===== Scripted engine =====

/// Engine command as recorded by [`ScriptedEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
    SetRate(f64),
}

type LoadResult = Result<Option<f64>, LoadError>;

/// Engine whose loads are resolved by the test
///
/// Loads of URLs registered with `ready`/`failing` finish immediately; every
/// other load waits until `resolve` is called for its URL.
#[derive(Default)]
pub struct ScriptedEngine {
    commands: Mutex<Vec<Command>>,
    pending: Mutex<Vec<(String, oneshot::Sender<LoadResult>)>>,
    immediate: Mutex<HashMap<String, LoadResult>>,
    position: Mutex<f64>,
    duration: Mutex<Option<f64>>,
    fail_play: AtomicBool,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ready(&self, url: impl Into<String>, duration: Option<f64>) {
        self.immediate.lock().unwrap().insert(url.into(), Ok(duration));
    }

    pub fn failing(&self, url: impl Into<String>, error: LoadError) {
        self.immediate.lock().unwrap().insert(url.into(), Err(error));
    }

    /// Finish the oldest pending load of `url`; returns whether one was waiting
    pub fn resolve(&self, url: &str, result: LoadResult) -> bool {
        let mut pending = self.pending.lock().unwrap();
        let Some(index) = pending.iter().position(|(pending_url, _)| pending_url == url) else {
            return false;
        };
        let (_, sender) = pending.remove(index);
        sender.send(result).is_ok()
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.lock().unwrap().iter().any(|(pending_url, _)| pending_url == url)
    }

    pub fn set_position(&self, seconds: f64) {
        *self.position.lock().unwrap() = seconds;
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    fn record(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }

    fn finish_load(&self, result: LoadResult) -> Result<(), LoadError> {
        let duration = result?;
        *self.duration.lock().unwrap() = duration;
        *self.position.lock().unwrap() = 0.0;
        Ok(())
    }
}

#[async_trait]
impl AudioEngine for ScriptedEngine {
    async fn load(&self, url: &str) -> Result<(), LoadError> {
        self.record(Command::Load(url.to_string()));

        let immediate = self.immediate.lock().unwrap().get(url).cloned();
        if let Some(result) = immediate {
            return self.finish_load(result);
        }

        let (sender, receiver) = oneshot::channel();
        self.pending.lock().unwrap().push((url.to_string(), sender));
        match receiver.await {
            Ok(result) => self.finish_load(result),
            Err(_) => Err(LoadError::Aborted),
        }
    }

    fn play(&self) -> EngineResult<()> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(EngineError::Device("output device unplugged".into()));
        }
        self.record(Command::Play);
        Ok(())
    }

    fn pause(&self) -> EngineResult<()> {
        self.record(Command::Pause);
        Ok(())
    }

    fn seek(&self, seconds: f64) -> EngineResult<()> {
        self.record(Command::Seek(seconds));
        *self.position.lock().unwrap() = seconds;
        Ok(())
    }

    fn set_volume(&self, volume: f64) -> EngineResult<()> {
        self.record(Command::SetVolume(volume));
        Ok(())
    }

    fn set_muted(&self, muted: bool) -> EngineResult<()> {
        self.record(Command::SetMuted(muted));
        Ok(())
    }

    fn set_rate(&self, rate: f64) -> EngineResult<()> {
        self.record(Command::SetRate(rate));
        Ok(())
    }

    fn position(&self) -> f64 {
        *self.position.lock().unwrap()
    }

    fn duration(&self) -> Option<f64> {
        *self.duration.lock().unwrap()
    }
}

/// Yield until `condition` holds, giving spawned tasks a chance to run
pub async fn settle(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
