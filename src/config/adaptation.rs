use serde::{Deserialize, Serialize};

/// Attention adaptation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    /// Whether attention polling and adaptation run at all.
    pub enabled: bool,

    /// Seconds between attention-state polls.
    pub poll_interval_secs: u64,

    /// Number of interpolation steps in a volume fade.
    pub fade_steps: u32,

    /// Milliseconds between fade steps.
    pub fade_step_ms: u64,

    /// Volume deltas at or below this threshold snap instead of fading.
    pub snap_threshold: u8,

    /// Minimum seconds between generic activity tracking posts.
    pub activity_throttle_secs: u64,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 2,
            fade_steps: 20,
            fade_step_ms: 50,
            snap_threshold: 5,
            activity_throttle_secs: 2,
        }
    }
}
