//! Property-based tests for session invariants
//!
//! Uses proptest to verify clamping and derived fields across many inputs.

mod common;

use common::{audio_url, chaptered_episode};
use podcue_core::{locator, Section};
use podcue_playback::{
    AudioEngine, LoadState, PlaybackAction, PlaybackConfig, PlaybackState, PlaybackStore,
    SimulatedEngine, TransportController,
};
use proptest::prelude::*;
use std::sync::Arc;

// ===== Helpers =====

fn arbitrary_action() -> impl Strategy<Value = PlaybackAction> {
    prop_oneof![
        (-1_000.0f64..1_000.0).prop_map(PlaybackAction::SetPosition),
        (0.0f64..500.0).prop_map(PlaybackAction::SetDuration),
        (-1.0f64..2.0).prop_map(PlaybackAction::SetVolume),
        (any::<bool>(), -1.0f64..2.0)
            .prop_map(|(muted, volume)| PlaybackAction::SetMuted { muted, volume }),
        (-2.0f64..4.0).prop_map(PlaybackAction::SetRate),
        any::<bool>().prop_map(PlaybackAction::SetPlaying),
    ]
}

fn loaded_store(duration: f64) -> PlaybackStore {
    let store = PlaybackStore::default();
    store.dispatch(PlaybackAction::SelectEpisode(Arc::new(chaptered_episode("ep"))));
    store.dispatch(PlaybackAction::SetLoadState {
        load_state: LoadState::Ready,
        duration: Some(duration),
    });
    store
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

fn check_invariants(state: &PlaybackState) -> Result<(), TestCaseError> {
    prop_assert!(state.position_seconds >= 0.0);
    if let Some(duration) = state.duration_seconds() {
        prop_assert!(state.position_seconds <= duration);
    }
    prop_assert!((0.0..=1.0).contains(&state.volume));
    prop_assert!((0.0..=1.0).contains(&state.muted_volume_memo));
    prop_assert!(state.playback_rate > 0.0);

    let sections = &state.episode.as_ref().unwrap().sections;
    prop_assert_eq!(
        state.active_section_title.clone(),
        locator::active_section_title(state.position_seconds, sections)
    );
    Ok(())
}

// ===== Property Tests =====

proptest! {
    /// Property: seek always lands on max(0, min(target, duration))
    #[test]
    fn seek_clamps_to_duration(duration in 1.0f64..10_000.0, target in -20_000.0f64..20_000.0) {
        let rt = runtime();
        let position = rt.block_on(async {
            let (engine, _events) = SimulatedEngine::new();
            engine.register(audio_url("ep"), duration);
            let controller = TransportController::new(
                Arc::new(engine) as Arc<dyn AudioEngine>,
                PlaybackConfig::default(),
            );
            controller.select_episode(chaptered_episode("ep")).await;
            controller.seek(target).unwrap();
            controller.state().position_seconds
        });

        prop_assert_eq!(position, target.min(duration).max(0.0));
    }

    /// Property: skipping never leaves the episode bounds
    #[test]
    fn skips_stay_in_bounds(
        duration in 1.0f64..3_600.0,
        skips in prop::collection::vec((any::<bool>(), 0.0f64..120.0), 1..30)
    ) {
        let rt = runtime();
        let positions = rt.block_on(async {
            let (engine, _events) = SimulatedEngine::new();
            engine.register(audio_url("ep"), duration);
            let controller = TransportController::new(
                Arc::new(engine) as Arc<dyn AudioEngine>,
                PlaybackConfig::default(),
            );
            controller.select_episode(chaptered_episode("ep")).await;

            let mut positions = Vec::new();
            for (forward, amount) in skips {
                let position = if forward {
                    controller.skip_forward_by(amount)
                } else {
                    controller.skip_backward_by(amount)
                };
                positions.push(position.unwrap());
            }
            positions
        });

        for position in positions {
            prop_assert!((0.0..=duration).contains(&position));
        }
    }

    /// Property: no sequence of actions breaks the state invariants
    #[test]
    fn actions_preserve_invariants(
        duration in 0.0f64..500.0,
        actions in prop::collection::vec(arbitrary_action(), 1..60)
    ) {
        let store = loaded_store(duration);
        for action in actions {
            let state = store.dispatch(action);
            check_invariants(&state)?;
        }
    }

    /// Property: mute then unmute restores any audible volume
    #[test]
    fn mute_round_trip(volume in 0.01f64..=1.0) {
        let rt = runtime();
        let restored = rt.block_on(async {
            let (engine, _events) = SimulatedEngine::new();
            let controller = TransportController::new(
                Arc::new(engine) as Arc<dyn AudioEngine>,
                PlaybackConfig::default(),
            );
            controller.set_volume(volume).unwrap();
            controller.toggle_mute().unwrap();
            controller.toggle_mute().unwrap();
            controller.state().volume
        });

        prop_assert_eq!(restored, volume);
    }

    /// Property: the active section is the last one starting at or before the position
    #[test]
    fn active_section_is_last_started(
        mut starts in prop::collection::vec(0.0f64..1_000.0, 1..20),
        position in 0.0f64..1_200.0
    ) {
        starts.sort_by(f64::total_cmp);
        let sections: Vec<Section> = starts
            .iter()
            .enumerate()
            .map(|(i, start)| Section::new(format!("s{i}"), *start))
            .collect();

        let expected = sections
            .iter()
            .rev()
            .find(|section| section.start_seconds <= position)
            .map(|section| section.title.clone());

        prop_assert_eq!(locator::active_section_title(position, &sections), expected);
    }
}
