//! Unit tests for wire types.
//!
//! Exercise the serde attributes against payload shapes the server
//! actually produces.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use crate::services::api::types::{
    AttentionLevel, AttentionState, CurrentState, InteractionKind, MusicStyle, PlaylistInfo,
    TrackedState, UiIntensity, UploadResult,
};

#[test]
fn current_state_with_song() {
    let payload = json!({
        "song": {"title": "Aurora", "artist": "Lumen", "filename": "aurora.mp3"},
        "index": 2,
        "total": 9,
        "is_playing": true,
        "state_version": 41
    });

    let state: CurrentState = serde_json::from_value(payload).unwrap();

    let song = state.song.unwrap();
    assert_eq!(song.filename, "aurora.mp3");
    assert_eq!(state.index, 2);
    assert_eq!(state.total, 9);
    assert!(state.is_playing);
    assert_eq!(state.state_version, 41);
}

#[test]
fn current_state_empty_playlist() {
    let payload = json!({
        "song": null,
        "index": 0,
        "total": 0,
        "is_playing": false,
        "state_version": 0
    });

    let state: CurrentState = serde_json::from_value(payload).unwrap();
    assert!(state.song.is_none());
}

#[test]
fn attention_state_wire_names() {
    let payload = json!({
        "attention_level": "semi-attentive",
        "attention_score": 62.5,
        "adaptations": {
            "volume": 90,
            "music_style": "comfortable",
            "ui_intensity": "medium"
        }
    });

    let state: AttentionState = serde_json::from_value(payload).unwrap();

    assert_eq!(state.attention_level, AttentionLevel::SemiAttentive);
    assert_eq!(state.adaptations.volume, 90);
    assert_eq!(state.adaptations.music_style, MusicStyle::Comfortable);
    assert_eq!(state.adaptations.ui_intensity, UiIntensity::Medium);
}

#[test]
fn attention_level_covers_all_wire_values() {
    for (wire, level) in [
        ("attentive", AttentionLevel::Attentive),
        ("semi-attentive", AttentionLevel::SemiAttentive),
        ("low-attention", AttentionLevel::LowAttention),
        ("inattentive", AttentionLevel::Inattentive),
    ] {
        let parsed: AttentionLevel = serde_json::from_value(json!(wire)).unwrap();
        assert_eq!(parsed, level);
    }
}

#[test]
fn interaction_kind_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(InteractionKind::UserActivity).unwrap(),
        json!("user_activity")
    );
    assert_eq!(
        serde_json::to_value(InteractionKind::Play).unwrap(),
        json!("play")
    );
}

#[test]
fn tracked_state_may_omit_state() {
    let tracked: TrackedState = serde_json::from_value(json!({"status": "ok"})).unwrap();
    assert!(tracked.state.is_none());
}

#[test]
fn ui_intensity_opacities() {
    assert_eq!(UiIntensity::High.opacity(), 1.0);
    assert_eq!(UiIntensity::Medium.opacity(), 0.9);
    assert_eq!(UiIntensity::Low.opacity(), 0.7);
    assert_eq!(UiIntensity::Minimal.opacity(), 0.5);
}

#[test]
fn playlist_and_upload_payloads() {
    let playlist: PlaylistInfo = serde_json::from_value(json!({
        "playlist": [
            {"title": "One", "artist": "A"},
            {"title": "Two", "artist": "B"}
        ],
        "current_index": 1,
        "is_playing": false
    }))
    .unwrap();
    assert_eq!(playlist.playlist.len(), 2);
    assert_eq!(playlist.current_index, 1);

    let upload: UploadResult = serde_json::from_value(json!({
        "uploaded": ["x.mp3", "y.mp3"],
        "state_version": 7
    }))
    .unwrap();
    assert_eq!(upload.uploaded.len(), 2);
    assert_eq!(upload.state_version, 7);
}
