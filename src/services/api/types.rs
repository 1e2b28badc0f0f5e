use serde::{Deserialize, Serialize};

/// Metadata of a track as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongInfo {
    /// Display title.
    pub title: String,

    /// Display artist.
    pub artist: String,

    /// Filename keying the audio resource under the media path.
    pub filename: String,
}

/// Server-authoritative playback state snapshot.
///
/// Returned by the current-state endpoint and by every mutating player
/// action. `state_version` increases monotonically on any server-side
/// mutation and drives the reconciliation fast path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    /// Current track, if the playlist is non-empty.
    #[serde(default)]
    pub song: Option<SongInfo>,

    /// Zero-based index of the current track.
    pub index: i64,

    /// Number of tracks in the playlist.
    pub total: u64,

    /// Whether the server considers playback active.
    pub is_playing: bool,

    /// Monotonically increasing state version.
    pub state_version: u64,
}

/// Shuffle and repeat flags, fetched independently of playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModesInfo {
    /// Shuffle enabled.
    pub shuffle: bool,

    /// Repeat enabled.
    pub repeat: bool,
}

/// Response of the shuffle toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ShuffleState {
    /// Shuffle enabled after the toggle.
    pub shuffle: bool,
}

/// Response of the repeat toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RepeatState {
    /// Repeat enabled after the toggle.
    pub repeat: bool,
}

/// Response of the upload endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResult {
    /// Filenames accepted by the server.
    pub uploaded: Vec<String>,

    /// State version after the upload.
    pub state_version: u64,
}

/// One entry of the playlist listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Display title.
    pub title: String,

    /// Display artist.
    pub artist: String,
}

/// Snapshot of the full playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    /// Ordered playlist entries.
    pub playlist: Vec<PlaylistEntry>,

    /// Zero-based index of the current track.
    pub current_index: i64,

    /// Whether the server considers playback active.
    pub is_playing: bool,
}

/// Response of the media rescan endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReloadResult {
    /// Number of tracks after the rescan.
    pub total: u64,

    /// State version after the rescan.
    pub state_version: u64,
}

/// Four-level attention classification computed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttentionLevel {
    /// User is fully engaged.
    #[serde(rename = "attentive")]
    Attentive,

    /// User is partially engaged.
    #[serde(rename = "semi-attentive")]
    SemiAttentive,

    /// User engagement is low.
    #[serde(rename = "low-attention")]
    LowAttention,

    /// User appears disengaged.
    #[serde(rename = "inattentive")]
    Inattentive,
}

impl AttentionLevel {
    /// Human-readable label for indicators.
    pub fn label(self) -> &'static str {
        match self {
            Self::Attentive => "Attentive",
            Self::SemiAttentive => "Semi-attentive",
            Self::LowAttention => "Low attention",
            Self::Inattentive => "Inattentive",
        }
    }
}

/// Music style directive accompanying an attention state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicStyle {
    /// Energetic selection for an attentive user.
    Engaging,

    /// Relaxed selection.
    Comfortable,

    /// Unobtrusive background selection.
    Discrete,

    /// Playback pause is suggested.
    Pause,
}

/// UI intensity directive accompanying an attention state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiIntensity {
    /// Full-intensity interface.
    High,

    /// Slightly dimmed interface.
    Medium,

    /// Dimmed interface.
    Low,

    /// Minimal interface.
    Minimal,
}

impl UiIntensity {
    /// Control opacity bound to this intensity.
    pub fn opacity(self) -> f32 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.9,
            Self::Low => 0.7,
            Self::Minimal => 0.5,
        }
    }
}

/// Adaptation directives computed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adaptations {
    /// Target volume in percent (0-100).
    pub volume: u8,

    /// Music style directive.
    pub music_style: MusicStyle,

    /// UI intensity directive.
    pub ui_intensity: UiIntensity,
}

/// Attention state snapshot.
///
/// Mutated only by server responses; the client never computes attention
/// locally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionState {
    /// Attention classification.
    pub attention_level: AttentionLevel,

    /// Attention score 0-100.
    pub attention_score: f64,

    /// Adaptation directives derived from the level.
    pub adaptations: Adaptations,
}

/// Wrapped attention state returned by the interaction tracking endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackedState {
    /// Updated attention state, when the server recomputed it.
    #[serde(default)]
    pub state: Option<AttentionState>,
}

/// Interaction kinds reported to the attention tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Playback was started.
    Play,

    /// Playback was paused.
    Pause,

    /// A track was skipped.
    Skip,

    /// Volume was changed manually.
    Volume,

    /// Position was changed manually.
    Seek,

    /// Playlist was modified or browsed.
    Playlist,

    /// Generic user activity (input, pointer, keys).
    UserActivity,
}
