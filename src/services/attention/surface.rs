use tracing::debug;

use crate::services::api::{MusicStyle, UiIntensity};

/// UI surface collaborator driven by the engines.
///
/// The crate computes every decision (fade levels, style transitions,
/// notification triggers); moving sliders, swapping style treatments and
/// showing toasts belongs to whichever surface embeds it.
pub trait ControlSurface: Send + Sync {
    /// Move the volume slider to a 0..=100 position.
    fn set_volume_slider(&self, volume: u8);

    /// Apply a music style treatment, replacing the previous one.
    fn set_music_style(&self, style: MusicStyle);

    /// Apply a UI intensity treatment, replacing the previous one.
    ///
    /// The intensity carries its control opacity via
    /// [`UiIntensity::opacity`](crate::services::api::UiIntensity::opacity).
    fn set_ui_intensity(&self, intensity: UiIntensity);

    /// Show a transient notification.
    fn notify(&self, message: &str);
}

/// Surface that logs notifications and ignores everything else.
///
/// For headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl ControlSurface for NullSurface {
    fn set_volume_slider(&self, _volume: u8) {}

    fn set_music_style(&self, _style: MusicStyle) {}

    fn set_ui_intensity(&self, _intensity: UiIntensity) {}

    fn notify(&self, message: &str) {
        debug!(message, "notification");
    }
}
