use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::{
    ApiError,
    traits::{AnalyticsApi, AttentionApi, CaptureControlApi, PlayerApi},
    types::{
        AttentionState, CurrentState, InteractionKind, ModesInfo, PlaylistInfo, ReloadResult,
        RepeatState, ShuffleState, TrackedState, UploadResult,
    },
};

/// HTTP client for the music server, shared by all services.
///
/// Wraps a pooled `reqwest::Client`; cloning is cheap and clones share
/// the connection pool.
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the given base URL.
    ///
    /// A trailing slash on the base URL is ignored.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::request(path, e))?;

        Self::check(path, response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::decode(path, e))
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::request(path, e))?;

        Self::check(path, response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::decode(path, e))
    }

    async fn post_json_with<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::request(path, e))?;

        Self::check(path, response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::decode(path, e))
    }

    async fn post_ack(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::request(path, e))?;

        Self::check(path, response).await.map(|_| ())
    }

    async fn post_ack_with<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::request(path, e))?;

        Self::check(path, response).await.map(|_| ())
    }
}

#[async_trait]
impl PlayerApi for HttpApi {
    async fn current_state(&self) -> Result<CurrentState, ApiError> {
        self.get_json("/api/current").await
    }

    async fn play_pause(&self) -> Result<CurrentState, ApiError> {
        self.post_json("/api/play-pause").await
    }

    async fn next(&self) -> Result<CurrentState, ApiError> {
        self.post_json("/api/next").await
    }

    async fn previous(&self) -> Result<CurrentState, ApiError> {
        self.post_json("/api/previous").await
    }

    async fn play_index(&self, index: i64) -> Result<CurrentState, ApiError> {
        self.post_json_with("/api/play-index", &json!({ "index": index }))
            .await
    }

    async fn modes(&self) -> Result<ModesInfo, ApiError> {
        self.get_json("/api/modes").await
    }

    async fn toggle_shuffle(&self) -> Result<bool, ApiError> {
        let state: ShuffleState = self.post_json("/api/toggle-shuffle").await?;
        Ok(state.shuffle)
    }

    async fn toggle_repeat(&self) -> Result<bool, ApiError> {
        let state: RepeatState = self.post_json("/api/toggle-repeat").await?;
        Ok(state.repeat)
    }

    async fn upload(&self, files: Vec<PathBuf>) -> Result<UploadResult, ApiError> {
        const ENDPOINT: &str = "/api/upload";

        let mut form = reqwest::multipart::Form::new();
        for path in files {
            let bytes = tokio::fs::read(&path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            debug!("uploading {name} ({} bytes)", bytes.len());
            form = form.part(
                "files",
                reqwest::multipart::Part::bytes(bytes).file_name(name),
            );
        }

        let response = self
            .http
            .post(self.url(ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::request(ENDPOINT, e))?;

        Self::check(ENDPOINT, response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::decode(ENDPOINT, e))
    }

    async fn clear(&self) -> Result<CurrentState, ApiError> {
        self.post_json("/api/clear").await
    }

    async fn playlist(&self) -> Result<PlaylistInfo, ApiError> {
        self.get_json("/api/playlist").await
    }

    async fn reload_files(&self) -> Result<ReloadResult, ApiError> {
        self.post_json("/api/reload-files").await
    }

    async fn track_bytes(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let path = format!("/music/{filename}");
        let response = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| ApiError::request(&path, e))?;

        let bytes = Self::check(&path, response)
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::decode(&path, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AttentionApi for HttpApi {
    async fn attention_state(&self) -> Result<AttentionState, ApiError> {
        self.get_json("/api/attention/state").await
    }

    async fn track_interaction(
        &self,
        kind: InteractionKind,
        data: serde_json::Value,
    ) -> Result<Option<AttentionState>, ApiError> {
        let tracked: TrackedState = self
            .post_json_with("/api/attention/track", &json!({ "type": kind, "data": data }))
            .await?;
        Ok(tracked.state)
    }
}

#[async_trait]
impl AnalyticsApi for HttpApi {
    async fn start_session(&self) -> Result<(), ApiError> {
        self.post_ack("/api/analytics/start-session").await
    }

    async fn song_start(&self, song_id: &str) -> Result<(), ApiError> {
        self.post_ack_with("/api/analytics/song-start", &json!({ "song_id": song_id }))
            .await
    }

    async fn song_end(
        &self,
        song_id: &str,
        duration_secs: f64,
        listened_secs: f64,
        completed: bool,
    ) -> Result<(), ApiError> {
        self.post_ack_with(
            "/api/analytics/song-end",
            &json!({
                "song_id": song_id,
                "duration": duration_secs,
                "listened_duration": listened_secs,
                "completed": completed,
            }),
        )
        .await
    }

    async fn song_skip(&self, song_id: &str) -> Result<(), ApiError> {
        self.post_ack_with("/api/analytics/song-skip", &json!({ "song_id": song_id }))
            .await
    }

    async fn stats(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("/api/analytics/get-stats").await
    }

    async fn reset(&self) -> Result<(), ApiError> {
        self.post_ack("/api/analytics/reset").await
    }
}

#[async_trait]
impl CaptureControlApi for HttpApi {
    async fn capture_started(&self) -> Result<(), ApiError> {
        self.post_ack("/api/multimodal/start").await
    }

    async fn capture_stopped(&self) -> Result<(), ApiError> {
        self.post_ack("/api/multimodal/stop").await
    }
}
