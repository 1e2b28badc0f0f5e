use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use serde_json::Value;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info};

use super::{fade::VolumeFade, surface::ControlSurface};
use crate::{
    config::AdaptationConfig,
    services::{
        api::{AttentionApi, AttentionLevel, AttentionState, InteractionKind, MusicStyle},
        common::Property,
        player::AudioOutput,
    },
};

/// Applies server attention state to playback and the UI surface.
///
/// Volume moves through [`VolumeFade`], so repeated applications of the
/// same state are no-ops and a user volume gesture cancels whatever fade
/// is in flight. Style and intensity treatments are mutually exclusive on
/// the surface; the engine just names the winner.
pub struct AdaptationEngine {
    api: Arc<dyn AttentionApi>,
    output: Arc<dyn AudioOutput>,
    surface: Arc<dyn ControlSurface>,
    fade: VolumeFade,
    enabled: bool,
    poll_interval: Duration,
    throttle: Duration,
    last_activity: Mutex<Option<Instant>>,
    last_style: Mutex<Option<MusicStyle>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Latest attention level, for indicator labels.
    pub level: Property<Option<AttentionLevel>>,
    /// Latest attention score (0..=100), for indicator fills.
    pub score: Property<f64>,
}

impl AdaptationEngine {
    /// Creates the engine around the injected collaborators.
    ///
    /// With `enabled` false the engine still mirrors attention state into
    /// its properties and reports interactions, but never touches volume
    /// or the surface treatments.
    pub fn new(
        api: Arc<dyn AttentionApi>,
        output: Arc<dyn AudioOutput>,
        surface: Arc<dyn ControlSurface>,
        config: &AdaptationConfig,
        enabled: bool,
    ) -> Self {
        Self {
            api,
            output,
            surface,
            fade: VolumeFade::new(config),
            enabled,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            throttle: Duration::from_secs(config.activity_throttle_secs),
            last_activity: Mutex::new(None),
            last_style: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
            level: Property::new(None),
            score: Property::new(0.0),
        }
    }

    /// Spawns the attention poll loop.
    pub fn start(self: &Arc<Self>) {
        info!(enabled = self.enabled, "starting adaptation engine");
        let weak = Arc::downgrade(self);
        let period = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let Some(engine) = weak.upgrade() else { break };
                match engine.api.attention_state().await {
                    Ok(state) => engine.apply(&state),
                    Err(e) => debug!(error = %e, "attention poll failed"),
                }
            }
        });
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).push(task);
    }

    /// Applies an attention state: fades volume, swaps style and intensity
    /// treatments, and suggests a pause when attention collapses.
    ///
    /// The pause suggestion fires once per transition into the pause style
    /// and only while audio is actually playing.
    pub fn apply(&self, state: &AttentionState) {
        self.level.set(Some(state.attention_level));
        self.score.set(state.attention_score);

        if !self.enabled {
            return;
        }

        let adaptations = state.adaptations;
        debug!(
            level = state.attention_level.label(),
            volume = adaptations.volume,
            "applying adaptations"
        );

        self.fade.start(adaptations.volume, &self.output, &self.surface);
        self.surface.set_music_style(adaptations.music_style);
        self.surface.set_ui_intensity(adaptations.ui_intensity);

        let previous = self
            .last_style
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(adaptations.music_style);
        if adaptations.music_style == MusicStyle::Pause
            && previous != Some(MusicStyle::Pause)
            && self.output.is_playing()
        {
            self.surface.notify("Attention is very low. Pause the music?");
        }
    }

    /// Fetches and applies the current attention state once, outside the
    /// poll cadence.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    pub async fn refresh(&self) -> Result<(), super::AttentionError> {
        let state = self.api.attention_state().await?;
        self.apply(&state);
        Ok(())
    }

    /// Whether a programmatic fade is currently moving the volume.
    pub fn is_adapting(&self) -> bool {
        self.fade.is_adapting()
    }

    /// Handles a user volume gesture: cancels any fade, applies the value,
    /// and reports the interaction.
    pub async fn user_volume_input(&self, volume: u8) {
        self.fade.cancel();
        let level = volume.min(100);
        self.output.set_volume(f32::from(level) / 100.0);
        self.surface.set_volume_slider(level);
        self.track(InteractionKind::Volume, serde_json::json!({"volume": level}))
            .await;
    }

    /// Reports a user interaction and applies any attention state the
    /// server returns with it.
    ///
    /// Volume interactions arriving mid-fade are dropped (they are the
    /// fade's own slider movement echoed back); generic activity is
    /// throttled to one post per window.
    pub async fn track(&self, kind: InteractionKind, data: Value) {
        if kind == InteractionKind::Volume && self.is_adapting() {
            debug!("suppressing fade-induced volume interaction");
            return;
        }
        if kind == InteractionKind::UserActivity && !self.throttle_allows() {
            return;
        }

        match self.api.track_interaction(kind, data).await {
            Ok(Some(state)) => self.apply(&state),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "interaction tracking failed"),
        }
    }

    /// Aborts the poll loop and any running fade.
    pub fn shutdown(&self) {
        debug!("shutting down adaptation engine");
        self.fade.cancel();
        self.abort_tasks();
    }

    fn throttle_allows(&self) -> bool {
        let mut last = self.last_activity.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        match *last {
            Some(at) if now.duration_since(at) < self.throttle => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    fn abort_tasks(&self) {
        for task in self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
        {
            task.abort();
        }
    }
}

impl Drop for AdaptationEngine {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
