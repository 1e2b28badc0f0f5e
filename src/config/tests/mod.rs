//! Unit tests for config module
//!
//! Tests configuration types, defaults, and parsing.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::unwrap_used)]

use crate::config::AttuneConfig;

#[test]
fn config_default() {
    let config = AttuneConfig::default();

    assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
    assert_eq!(config.server.poll_interval_secs, 3);
    assert_eq!(config.capture.frame_width, 640);
    assert_eq!(config.capture.frame_height, 480);
    assert_eq!(config.capture.block_size, 4096);
    assert_eq!(config.adaptation.fade_steps, 20);
    assert_eq!(config.adaptation.fade_step_ms, 50);
    assert_eq!(config.adaptation.snap_threshold, 5);
}

#[test]
fn config_serialize_toml() {
    let config = AttuneConfig::default();

    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("[server]"));
    assert!(toml_str.contains("[capture]"));
    assert!(toml_str.contains("[adaptation]"));
}

#[test]
fn config_deserialize_toml() {
    let toml_str = r#"
        [server]
        base_url = "http://music.local:8080"
        poll_interval_secs = 5

        [capture]
        emit_fps = 5

        [adaptation]
        enabled = false
    "#;

    let config: AttuneConfig = toml::from_str(toml_str).unwrap();

    assert_eq!(config.server.base_url, "http://music.local:8080");
    assert_eq!(config.server.poll_interval_secs, 5);
    assert_eq!(config.capture.emit_fps, 5);
    assert!(!config.adaptation.enabled);
    assert_eq!(config.capture.frame_width, 640);
}

#[test]
fn config_serialize_roundtrip() {
    let original = AttuneConfig::default();

    let toml_str = toml::to_string(&original).unwrap();

    let deserialized: AttuneConfig = toml::from_str(&toml_str).unwrap();

    assert_eq!(original, deserialized);
}

#[test]
fn config_empty_toml() {
    let config: AttuneConfig = toml::from_str("").unwrap();

    assert_eq!(config, AttuneConfig::default());
}

#[test]
fn ws_url_derivation() {
    let mut config = AttuneConfig::default();
    assert_eq!(config.server.ws_url(), "ws://127.0.0.1:5000/ws");

    config.server.base_url = "https://music.example.com/".to_string();
    assert_eq!(config.server.ws_url(), "wss://music.example.com/ws");
}
