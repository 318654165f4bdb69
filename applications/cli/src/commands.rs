/// Subcommand implementations
use crate::config::PodcueConfig;
use crate::error::{CliError, Result};
use podcue_core::time::{format_duration_label, format_timestamp};
use podcue_core::{locator, EpisodeDescriptor, Palette};
use podcue_playback::{
    AudioEngine, LoadOutcome, PlaybackAction, PlaybackState, SimulatedEngine, TransportController,
};
use podcue_theme::ThemeExtractor;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Simulated length for episodes whose descriptor carries no duration
pub const FALLBACK_DURATION_SECONDS: f64 = 3600.0;

/// Options for `podcue session`
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub listen: Duration,
    pub seek: Option<f64>,
    pub rate: Option<f64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            listen: Duration::from_secs(3),
            seek: None,
            rate: None,
        }
    }
}

/// Read an episode descriptor from a JSON file
pub fn load_episode(path: &Path) -> Result<EpisodeDescriptor> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::EpisodeFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut episode: EpisodeDescriptor =
        serde_json::from_str(&json).map_err(|source| CliError::EpisodeJson {
            path: path.to_path_buf(),
            source,
        })?;
    episode.sort_sections();
    Ok(episode)
}

/// Play an episode on the simulated engine and return a summary
pub async fn run_session(
    config: &PodcueConfig,
    episode: EpisodeDescriptor,
    options: &SessionOptions,
) -> Result<String> {
    let (engine, events) = SimulatedEngine::new();
    engine.register(
        episode.audio_url.clone(),
        episode.duration_seconds.unwrap_or(FALLBACK_DURATION_SECONDS),
    );

    let extractor = Arc::new(ThemeExtractor::http(config.theme.clone())?);
    let controller = Arc::new(
        TransportController::new(
            Arc::new(engine) as Arc<dyn AudioEngine>,
            config.playback.clone(),
        )
        .with_theme(extractor),
    );
    let listener = controller.listen(events);

    controller
        .store()
        .subscribe(|action, state| log_action(action, state))
        .detach();

    match controller.select_episode(episode).await {
        LoadOutcome::Ready => {}
        LoadOutcome::Errored(e) => return Err(e.into()),
        LoadOutcome::Superseded => {
            tracing::warn!("Episode was replaced while loading");
        }
    }

    if let Some(rate) = options.rate {
        controller.set_playback_rate(rate)?;
    }

    controller.play()?;
    tokio::time::sleep(options.listen).await;

    if let Some(target) = options.seek {
        controller.seek(target)?;
        tokio::time::sleep(options.listen).await;
    }

    if controller.state().is_playing {
        controller.pause()?;
    }

    let summary = session_summary(
        &controller.state(),
        controller.config().bookmark_window_seconds,
    );

    drop(controller);
    listener.abort();
    Ok(summary)
}

/// Describe the section and bookmarks at `position`
pub fn run_locate(config: &PodcueConfig, episode: &EpisodeDescriptor, position: f64) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "{} @ {}", episode.title, format_timestamp(position));

    match locator::active_section(position, &episode.sections) {
        Some(section) => {
            let _ = writeln!(
                report,
                "Section: {} (from {})",
                section.title,
                format_timestamp(section.start_seconds)
            );
        }
        None => {
            let _ = writeln!(report, "Section: -");
        }
    }

    write_bookmarks(
        &mut report,
        locator::nearby_bookmarks(
            position,
            &episode.bookmarks,
            config.playback.bookmark_window_seconds,
        ),
    );
    report
}

/// Fetch artwork and describe its palette
pub async fn run_palette(config: &PodcueConfig, url: &str) -> Result<String> {
    let extractor = ThemeExtractor::http(config.theme.clone())?;
    let palette = extractor.extract(url).await;

    let mut report = String::new();
    if palette.is_neutral() {
        let _ = writeln!(report, "Neutral palette (artwork unavailable)");
    }
    write_palette(&mut report, &palette);
    Ok(report)
}

/// Human readable snapshot of a session
pub fn session_summary(state: &PlaybackState, bookmark_window_seconds: f64) -> String {
    let mut summary = String::new();

    let Some(episode) = &state.episode else {
        let _ = writeln!(summary, "No episode selected");
        return summary;
    };

    let _ = writeln!(summary, "Episode: {}", episode.title);
    if !episode.podcaster_name.is_empty() {
        let _ = writeln!(summary, "By: {}", episode.podcaster_name);
    }
    let _ = writeln!(summary, "State: {}", state.load_state);

    match state.duration_seconds() {
        Some(duration) => {
            let _ = writeln!(
                summary,
                "Position: {} / {} ({:.0}%, {})",
                format_timestamp(state.position_seconds),
                format_timestamp(duration),
                state.progress() * 100.0,
                format_duration_label(duration)
            );
        }
        None => {
            let _ = writeln!(
                summary,
                "Position: {}",
                format_timestamp(state.position_seconds)
            );
        }
    }

    let _ = writeln!(
        summary,
        "Section: {}",
        state.active_section_title.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        summary,
        "Volume: {:.0}%{}  Rate: {}x",
        state.volume * 100.0,
        if state.is_muted { " (muted)" } else { "" },
        state.playback_rate
    );

    write_bookmarks(&mut summary, state.nearby_bookmarks(bookmark_window_seconds));
    write_palette(&mut summary, &state.palette);
    summary
}

fn write_bookmarks(out: &mut String, bookmarks: Vec<&podcue_core::Bookmark>) {
    if bookmarks.is_empty() {
        let _ = writeln!(out, "Nearby bookmarks: none");
        return;
    }

    let _ = writeln!(out, "Nearby bookmarks:");
    for bookmark in bookmarks {
        let _ = write!(
            out,
            "  {} {}",
            format_timestamp(bookmark.timestamp_seconds),
            bookmark.title
        );
        if let Some(note) = &bookmark.note {
            let _ = write!(out, " ({note})");
        }
        let _ = writeln!(out);
    }
}

fn write_palette(out: &mut String, palette: &Palette) {
    let colors: Vec<String> = palette.colors().iter().map(|c| c.to_hex()).collect();
    let _ = writeln!(out, "Palette: {}", colors.join(" "));
}

fn log_action(action: &PlaybackAction, state: &PlaybackState) {
    match action {
        PlaybackAction::SetPosition(_) | PlaybackAction::SetDuration(_) => {
            tracing::debug!(
                position = state.position_seconds,
                section = state.active_section_title.as_deref().unwrap_or("-"),
                "Position updated"
            );
        }
        PlaybackAction::SelectEpisode(episode) => {
            tracing::info!(episode = %episode.id, "Episode selected");
        }
        PlaybackAction::ClearEpisode => {
            tracing::info!("Episode cleared");
        }
        PlaybackAction::SetLoadState { load_state, .. } => {
            tracing::info!(%load_state, duration = ?state.duration_seconds(), "Load state changed");
        }
        PlaybackAction::SetPlaying(playing) => {
            tracing::info!(playing, position = state.position_seconds, "Playback toggled");
        }
        PlaybackAction::SetPalette(palette) => {
            tracing::info!(colors = palette.len(), "Palette applied");
        }
        other => {
            tracing::info!(action = ?other, volume = state.volume, rate = state.playback_rate, "Settings changed");
        }
    }
}
