use serde::{Deserialize, Serialize};

/// Messages emitted by the client over the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One captured camera frame, JPEG encoded as a data URL.
    VideoFrame {
        /// `data:image/jpeg;base64,...` payload.
        frame: String,
    },
    /// One captured microphone block, little-endian f32 samples in base64.
    AudioChunk {
        /// Base64 of the raw sample bytes.
        audio: String,
    },
    /// Ask the server to reset analyzer statistics.
    ResetStats,
}

/// Head orientation estimate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Horizontal rotation, negative left.
    pub yaw: f64,

    /// Vertical rotation, negative up.
    pub pitch: f64,
}

/// Per-frame video analysis computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    /// Whether a face was found in the frame.
    pub face_detected: bool,

    /// Head orientation of the detected face.
    #[serde(default)]
    pub head_pose: HeadPose,

    /// Engagement estimate 0-100.
    pub engagement_score: f64,

    /// Dominant emotion label, when the analyzer produced one.
    #[serde(default)]
    pub emotion_hint: Option<String>,
}

/// Per-block audio analysis computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    /// Whether speech was detected in the block.
    pub speech_detected: bool,

    /// Signal energy 0-100.
    pub energy_level: f64,

    /// Estimated fundamental frequency in Hz.
    pub pitch: f64,

    /// Dominant emotion label, when the analyzer produced one.
    #[serde(default)]
    pub emotion_hint: Option<String>,
}

/// Video analysis result with the server's running frame counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    /// Analysis of the most recent frame.
    pub result: VideoAnalysis,

    /// Frames analyzed since the last stats reset.
    pub frame_count: u64,
}

/// Audio analysis result with the server's running chunk counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioResult {
    /// Analysis of the most recent block.
    pub result: AudioAnalysis,

    /// Blocks analyzed since the last stats reset.
    pub chunk_count: u64,
}

/// Combined attention pattern classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionPattern {
    /// User present and behaving normally.
    Normal,

    /// Head tilt and low activity suggest drowsiness.
    Drowsy,

    /// Neither face nor voice detected.
    Absent,
}

/// Fused video+audio inference update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionUpdate {
    /// Combined attention score 0-100.
    pub attention_score: f64,

    /// Dominant emotion across modalities.
    #[serde(default)]
    pub emotion: Option<String>,

    /// Attention pattern classification.
    pub pattern: AttentionPattern,

    /// Whether movement was detected on the video channel.
    pub movement_detected: bool,

    /// Whether speech was detected on the audio channel.
    pub speech_detected: bool,

    /// Whether both channels were active simultaneously.
    pub both_active: bool,
}

/// Server-initiated request to re-fetch playback state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceRefresh {
    /// Machine-readable reason.
    pub reason: String,

    /// Human-readable message.
    pub message: String,
}

/// Confirmation that analyzer statistics were reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReset {
    /// Human-readable message.
    pub message: String,
}

/// Messages received from the server over the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Video analysis for an earlier frame.
    VideoResult(VideoResult),

    /// Audio analysis for an earlier block.
    AudioResult(AudioResult),

    /// Fused multimodal update.
    FusionUpdate(FusionUpdate),

    /// The client should re-fetch playback state immediately.
    ForceRefresh(ForceRefresh),

    /// Analyzer statistics were reset.
    StatsReset(StatsReset),
}
