//! Unit tests for socket wire messages and connection errors.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use crate::services::channel::{
    core::connect,
    error::ChannelError,
    messages::{AttentionPattern, ClientMessage, ServerMessage},
};

#[test]
fn client_messages_carry_event_tag() {
    let frame = ClientMessage::VideoFrame {
        frame: "data:image/jpeg;base64,xyz".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&frame).unwrap(),
        json!({"event": "video_frame", "frame": "data:image/jpeg;base64,xyz"})
    );

    let chunk = ClientMessage::AudioChunk {
        audio: "AAAA".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&chunk).unwrap(),
        json!({"event": "audio_chunk", "audio": "AAAA"})
    );

    assert_eq!(
        serde_json::to_value(&ClientMessage::ResetStats).unwrap(),
        json!({"event": "reset_stats"})
    );
}

#[test]
fn video_result_parses() {
    let text = r#"{
        "event": "video_result",
        "result": {
            "face_detected": true,
            "head_pose": {"yaw": -12.5, "pitch": 4.0},
            "engagement_score": 77.0,
            "emotion_hint": "focused"
        },
        "frame_count": 120
    }"#;

    let ServerMessage::VideoResult(video) = serde_json::from_str(text).unwrap() else {
        panic!("expected video_result");
    };

    assert!(video.result.face_detected);
    assert_eq!(video.result.head_pose.yaw, -12.5);
    assert_eq!(video.frame_count, 120);
}

#[test]
fn video_result_without_pose_defaults() {
    let text = r#"{
        "event": "video_result",
        "result": {"face_detected": false, "engagement_score": 0.0},
        "frame_count": 1
    }"#;

    let ServerMessage::VideoResult(video) = serde_json::from_str(text).unwrap() else {
        panic!("expected video_result");
    };

    assert_eq!(video.result.head_pose.yaw, 0.0);
    assert!(video.result.emotion_hint.is_none());
}

#[test]
fn fusion_update_parses_patterns() {
    let text = r#"{
        "event": "fusion_update",
        "attention_score": 15.0,
        "emotion": "tired",
        "pattern": "drowsy",
        "movement_detected": false,
        "speech_detected": false,
        "both_active": false
    }"#;

    let ServerMessage::FusionUpdate(fusion) = serde_json::from_str(text).unwrap() else {
        panic!("expected fusion_update");
    };

    assert_eq!(fusion.pattern, AttentionPattern::Drowsy);
    assert_eq!(fusion.attention_score, 15.0);
}

#[test]
fn force_refresh_and_stats_reset_parse() {
    let refresh: ServerMessage = serde_json::from_str(
        r#"{"event": "force_refresh", "reason": "playlist_changed", "message": "Playlist updated"}"#,
    )
    .unwrap();
    let ServerMessage::ForceRefresh(refresh) = refresh else {
        panic!("expected force_refresh");
    };
    assert_eq!(refresh.reason, "playlist_changed");

    let reset: ServerMessage =
        serde_json::from_str(r#"{"event": "stats_reset", "message": "Statistics reset"}"#).unwrap();
    assert!(matches!(reset, ServerMessage::StatsReset(_)));
}

#[test]
fn unknown_event_is_an_error() {
    let result = serde_json::from_str::<ServerMessage>(r#"{"event": "telemetry", "x": 1}"#);
    assert!(result.is_err());
}

#[tokio::test]
async fn refused_connection_names_the_socket_url() {
    // Bind then drop a listener so the port is known to refuse.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = format!("ws://127.0.0.1:{port}/ws");
    let err = connect(&url).await.unwrap_err();

    let ChannelError::ConnectionFailed { url: reported, .. } = err else {
        panic!("expected a connection failure");
    };
    assert_eq!(reported, url);
}
