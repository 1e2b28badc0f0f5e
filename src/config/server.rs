use serde::{Deserialize, Serialize};

/// Music server connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the music server's HTTP API.
    pub base_url: String,

    /// Seconds between periodic playback-state polls.
    pub poll_interval_secs: u64,

    /// Seconds between periodic playlist refreshes.
    pub playlist_refresh_secs: u64,

    /// Path of the WebSocket endpoint on the server.
    pub ws_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_secs: 3,
            playlist_refresh_secs: 10,
            ws_path: "/ws".to_string(),
        }
    }
}

impl ServerConfig {
    /// WebSocket URL derived from the HTTP base URL.
    ///
    /// Swaps the scheme (`http` → `ws`, `https` → `wss`) and appends the
    /// configured socket path.
    pub fn ws_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let socket_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        };
        format!("{socket_base}{}", self.ws_path)
    }
}
