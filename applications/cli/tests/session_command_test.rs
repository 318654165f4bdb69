//! `podcue session` and `podcue locate` end to end

use podcue_cli::{commands, CliError, PodcueConfig, SessionOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

const EPISODE_JSON: &str = r#"{
    "id": "ep42",
    "podcastId": "p7",
    "title": "The Answer",
    "podcasterName": "Deep Thought",
    "audioUrl": "https://cdn.example/ep42.mp3",
    "durationSeconds": 180,
    "sections": [
        {"title": "Outro", "start": 150},
        {"title": "Intro", "start": 0},
        {"title": "Question", "start": 20}
    ],
    "bookmarks": [{"title": "Reveal", "time": 152, "note": "42"}]
}"#;

fn episode_file(json: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn episode_file_is_loaded_with_sorted_sections() {
    let file = episode_file(EPISODE_JSON);
    let episode = commands::load_episode(file.path()).unwrap();

    let titles: Vec<_> = episode.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Intro", "Question", "Outro"]);
    assert_eq!(episode.duration_seconds, Some(180.0));
    assert_eq!(episode.bookmarks[0].note.as_deref(), Some("42"));
}

#[test]
fn unreadable_episode_files_are_reported() {
    let missing = commands::load_episode(Path::new("/no/such/episode.json"));
    assert!(matches!(missing, Err(CliError::EpisodeFile { .. })));

    let file = episode_file("{ not json");
    let invalid = commands::load_episode(file.path());
    assert!(matches!(invalid, Err(CliError::EpisodeJson { .. })));
}

#[tokio::test(start_paused = true)]
async fn session_plays_seeks_and_summarises() {
    let file = episode_file(EPISODE_JSON);
    let episode = commands::load_episode(file.path()).unwrap();
    let options = SessionOptions {
        listen: Duration::from_millis(2_500),
        seek: Some(148.0),
        rate: None,
    };

    let summary = commands::run_session(&PodcueConfig::default(), episode, &options)
        .await
        .unwrap();

    assert!(summary.contains("Episode: The Answer"), "{summary}");
    assert!(summary.contains("By: Deep Thought"), "{summary}");
    assert!(summary.contains("State: ready"), "{summary}");
    assert!(summary.contains("Position: 02:30 / 03:00"), "{summary}");
    assert!(summary.contains("Section: Outro"), "{summary}");
    assert!(summary.contains("02:32 Reveal (42)"), "{summary}");
}

#[tokio::test(start_paused = true)]
async fn invalid_rate_fails_the_session() {
    let file = episode_file(EPISODE_JSON);
    let episode = commands::load_episode(file.path()).unwrap();
    let options = SessionOptions {
        rate: Some(0.0),
        ..SessionOptions::default()
    };

    let result = commands::run_session(&PodcueConfig::default(), episode, &options).await;
    assert!(matches!(result, Err(CliError::Playback(_))));
}

#[test]
fn locate_uses_configured_bookmark_window() {
    let file = episode_file(EPISODE_JSON);
    let episode = commands::load_episode(file.path()).unwrap();

    let mut config = PodcueConfig::default();
    config.playback.bookmark_window_seconds = 1.0;
    let report = commands::run_locate(&config, &episode, 149.0);

    assert!(report.contains("Section: Question"), "{report}");
    assert!(report.contains("Nearby bookmarks: none"), "{report}");
}
