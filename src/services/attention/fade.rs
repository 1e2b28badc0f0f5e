use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::debug;

use super::surface::ControlSurface;
use crate::{config::AdaptationConfig, services::player::AudioOutput};

/// Smooth volume transition controller.
///
/// Small deltas snap directly; larger ones interpolate over a fixed number
/// of steps, moving the engine gain and the surface slider in lockstep and
/// landing exactly on the target. A generation counter cancels an
/// in-progress fade: the running task re-checks it before every write, so a
/// cancelled fade never clobbers a newer volume.
pub(crate) struct VolumeFade {
    generation: Arc<AtomicU64>,
    adapting: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
    steps: u32,
    step_interval: Duration,
    snap_threshold: f64,
}

impl VolumeFade {
    pub(crate) fn new(config: &AdaptationConfig) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            adapting: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
            steps: config.fade_steps.max(1),
            step_interval: Duration::from_millis(config.fade_step_ms),
            snap_threshold: f64::from(config.snap_threshold),
        }
    }

    /// Whether a fade task is currently moving the volume.
    pub(crate) fn is_adapting(&self) -> bool {
        self.adapting.load(Ordering::SeqCst)
    }

    /// Cancels any in-progress fade, leaving the volume where it is.
    pub(crate) fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.adapting.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }
    }

    /// Moves engine and slider toward a 0..=100 target volume.
    pub(crate) fn start(
        &self,
        target: u8,
        output: &Arc<dyn AudioOutput>,
        surface: &Arc<dyn ControlSurface>,
    ) {
        // Claiming a fresh generation invalidates any running fade even if
        // its task has not been aborted yet.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.adapting.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }

        let current = f64::from(output.volume()) * 100.0;
        let target_level = f64::from(target.min(100));
        let delta = target_level - current;

        if delta.abs() <= self.snap_threshold {
            apply_volume(output, surface, target_level);
            return;
        }

        debug!(from = current, to = target_level, "starting volume fade");
        self.adapting.store(true, Ordering::SeqCst);

        let generations = Arc::clone(&self.generation);
        let adapting = Arc::clone(&self.adapting);
        let output = Arc::clone(output);
        let surface = Arc::clone(surface);
        let steps = self.steps;
        let step_interval = self.step_interval;

        let task = tokio::spawn(async move {
            let step_size = delta / f64::from(steps);
            for step in 1..=steps {
                tokio::time::sleep(step_interval).await;
                if generations.load(Ordering::SeqCst) != generation {
                    return;
                }
                // The last step lands exactly on the target.
                let level = if step == steps {
                    target_level
                } else {
                    current + step_size * f64::from(step)
                };
                apply_volume(&output, &surface, level);
            }
            // A fade that started after our last step owns the flag now.
            if generations.load(Ordering::SeqCst) == generation {
                adapting.store(false, Ordering::SeqCst);
            }
        });

        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }
}

impl Drop for VolumeFade {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }
    }
}

/// Sets engine gain and surface slider together.
pub(crate) fn apply_volume(
    output: &Arc<dyn AudioOutput>,
    surface: &Arc<dyn ControlSurface>,
    percent: f64,
) {
    let clamped = percent.clamp(0.0, 100.0);
    output.set_volume((clamped / 100.0) as f32);
    surface.set_volume_slider(clamped.round() as u8);
}
