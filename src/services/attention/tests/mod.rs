//! Unit tests for the adaptation engine and volume fades.
//!
//! All timing runs on the paused tokio clock; fades complete instantly in
//! test time while keeping their step structure observable.

#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::yield_now;

use crate::{
    config::AdaptationConfig,
    services::{
        api::{
            Adaptations, ApiError, AttentionApi, AttentionLevel, AttentionState, InteractionKind,
            MusicStyle, UiIntensity,
        },
        attention::{AdaptationEngine, ControlSurface},
        player::{AudioOutput, tests::{FakeOutput, RecordingSurface}},
    },
};

struct FakeAttentionApi {
    state: Mutex<AttentionState>,
    tracked: Mutex<Vec<InteractionKind>>,
}

impl FakeAttentionApi {
    fn new(state: AttentionState) -> Self {
        Self {
            state: Mutex::new(state),
            tracked: Mutex::new(Vec::new()),
        }
    }

    fn tracked(&self) -> Vec<InteractionKind> {
        self.tracked.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttentionApi for FakeAttentionApi {
    async fn attention_state(&self) -> Result<AttentionState, ApiError> {
        Ok(*self.state.lock().unwrap())
    }

    async fn track_interaction(
        &self,
        kind: InteractionKind,
        _data: Value,
    ) -> Result<Option<AttentionState>, ApiError> {
        self.tracked.lock().unwrap().push(kind);
        Ok(None)
    }
}

fn attention(level: AttentionLevel, volume: u8, style: MusicStyle) -> AttentionState {
    AttentionState {
        attention_level: level,
        attention_score: 50.0,
        adaptations: Adaptations {
            volume,
            music_style: style,
            ui_intensity: UiIntensity::High,
        },
    }
}

struct Rig {
    api: Arc<FakeAttentionApi>,
    output: Arc<FakeOutput>,
    surface: Arc<RecordingSurface>,
    engine: Arc<AdaptationEngine>,
}

fn rig(enabled: bool) -> Rig {
    let api = Arc::new(FakeAttentionApi::new(attention(
        AttentionLevel::Attentive,
        100,
        MusicStyle::Engaging,
    )));
    let output = Arc::new(FakeOutput::new());
    let surface = Arc::new(RecordingSurface::default());
    let engine = Arc::new(AdaptationEngine::new(
        Arc::clone(&api) as Arc<dyn AttentionApi>,
        Arc::clone(&output) as Arc<dyn AudioOutput>,
        Arc::clone(&surface) as Arc<dyn ControlSurface>,
        &AdaptationConfig::default(),
        enabled,
    ));
    Rig {
        api,
        output,
        surface,
        engine,
    }
}

/// Lets every spawned fade task run to completion on the paused clock.
async fn settle(rig: &Rig) {
    while rig.engine.is_adapting() {
        yield_now().await;
        tokio::time::advance(std::time::Duration::from_millis(50)).await;
    }
    yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn fade_runs_twenty_steps_and_lands_exactly() {
    let rig = rig(true);
    rig.output.set_volume(0.2);
    let before = rig.output.snapshot().volumes.len();

    rig.engine.apply(&attention(
        AttentionLevel::SemiAttentive,
        80,
        MusicStyle::Comfortable,
    ));
    settle(&rig).await;

    let volumes = &rig.output.snapshot().volumes[before..];
    assert_eq!(volumes.len(), 20);
    // Steps of 3 percent: 23, 26, ... 77, then exactly 80.
    assert!((volumes[0] - 0.23).abs() < 1e-6);
    assert!((volumes[18] - 0.77).abs() < 1e-6);
    assert!((volumes[19] - 0.80).abs() < 1e-6);
    assert!(!rig.engine.is_adapting());
}

#[tokio::test(start_paused = true)]
async fn slider_moves_in_lockstep_with_engine() {
    let rig = rig(true);
    rig.output.set_volume(0.2);

    rig.engine.apply(&attention(
        AttentionLevel::SemiAttentive,
        80,
        MusicStyle::Comfortable,
    ));
    settle(&rig).await;

    let sliders = rig.surface.sliders();
    assert_eq!(sliders.len(), 20);
    assert_eq!(*sliders.first().unwrap(), 23);
    assert_eq!(*sliders.last().unwrap(), 80);
}

#[tokio::test(start_paused = true)]
async fn small_delta_snaps_without_fading() {
    let rig = rig(true);
    rig.output.set_volume(0.78);
    let before = rig.output.snapshot().volumes.len();

    rig.engine.apply(&attention(
        AttentionLevel::SemiAttentive,
        80,
        MusicStyle::Comfortable,
    ));

    // One direct write, no task.
    let volumes = &rig.output.snapshot().volumes[before..];
    assert_eq!(volumes.len(), 1);
    assert!((volumes[0] - 0.80).abs() < 1e-6);
    assert!(!rig.engine.is_adapting());
}

#[tokio::test(start_paused = true)]
async fn user_input_cancels_fade_and_wins() {
    let rig = rig(true);
    rig.output.set_volume(0.2);

    rig.engine.apply(&attention(
        AttentionLevel::SemiAttentive,
        80,
        MusicStyle::Comfortable,
    ));

    // Let a few steps land, then the user grabs the slider.
    for _ in 0..5 {
        yield_now().await;
        tokio::time::advance(std::time::Duration::from_millis(50)).await;
    }
    assert!(rig.engine.is_adapting());

    rig.engine.user_volume_input(35).await;
    assert!(!rig.engine.is_adapting());

    // Give the cancelled task every chance to misbehave.
    for _ in 0..30 {
        yield_now().await;
        tokio::time::advance(std::time::Duration::from_millis(50)).await;
    }

    let output = rig.output.snapshot();
    assert!((output.volume - 0.35).abs() < 1e-6);
    // The user gesture is reported, not suppressed.
    assert_eq!(rig.api.tracked(), vec![InteractionKind::Volume]);
}

#[tokio::test(start_paused = true)]
async fn fade_induced_volume_interaction_is_suppressed() {
    let rig = rig(true);
    rig.output.set_volume(0.2);

    rig.engine.apply(&attention(
        AttentionLevel::SemiAttentive,
        80,
        MusicStyle::Comfortable,
    ));
    yield_now().await;
    assert!(rig.engine.is_adapting());

    // A surface echoing slider movement back as an interaction mid-fade.
    rig.engine
        .track(InteractionKind::Volume, serde_json::json!({"volume": 26}))
        .await;

    assert!(rig.api.tracked().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pause_style_notifies_once_per_transition() {
    let rig = rig(true);
    rig.output.set_volume(0.5);
    rig.output.load(Vec::new()).unwrap();
    rig.output.play().unwrap();

    let paused = attention(AttentionLevel::Inattentive, 40, MusicStyle::Pause);
    rig.engine.apply(&paused);
    settle(&rig).await;
    rig.engine.apply(&paused);
    settle(&rig).await;

    assert_eq!(rig.surface.notices().len(), 1);

    // Leaving and re-entering the pause style notifies again.
    rig.engine.apply(&attention(
        AttentionLevel::Attentive,
        100,
        MusicStyle::Engaging,
    ));
    settle(&rig).await;
    rig.engine.apply(&paused);
    settle(&rig).await;
    assert_eq!(rig.surface.notices().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn pause_style_is_silent_when_nothing_plays() {
    let rig = rig(true);
    rig.output.set_volume(0.5);

    rig.engine
        .apply(&attention(AttentionLevel::Inattentive, 40, MusicStyle::Pause));
    settle(&rig).await;

    assert!(rig.surface.notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn disabled_engine_only_mirrors_state() {
    let rig = rig(false);
    rig.output.set_volume(0.2);
    let before = rig.output.snapshot().volumes.len();

    rig.engine.apply(&attention(
        AttentionLevel::Inattentive,
        40,
        MusicStyle::Pause,
    ));

    assert_eq!(rig.output.snapshot().volumes.len(), before);
    assert!(rig.surface.notices().is_empty());
    assert_eq!(
        rig.engine.level.get(),
        Some(AttentionLevel::Inattentive)
    );
}

#[tokio::test(start_paused = true)]
async fn generic_activity_is_throttled() {
    let rig = rig(true);

    rig.engine
        .track(InteractionKind::UserActivity, serde_json::json!({}))
        .await;
    rig.engine
        .track(InteractionKind::UserActivity, serde_json::json!({}))
        .await;
    assert_eq!(rig.api.tracked().len(), 1);

    // Other kinds are never throttled.
    rig.engine
        .track(InteractionKind::Skip, serde_json::json!({}))
        .await;
    assert_eq!(rig.api.tracked().len(), 2);
}
