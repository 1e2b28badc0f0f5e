use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::tracker::FinishedSong;
use crate::services::api::{AnalyticsApi, ApiError};

/// Fire-and-forget listening analytics client.
///
/// Reporting methods never return errors; a failed POST is logged and
/// dropped so playback control flow cannot stall on analytics.
pub struct AnalyticsService {
    api: Arc<dyn AnalyticsApi>,
}

impl AnalyticsService {
    /// Creates the service around an analytics endpoint client.
    pub fn new(api: Arc<dyn AnalyticsApi>) -> Self {
        Self { api }
    }

    /// Opens a listening session.
    pub async fn start_session(&self) {
        if let Err(e) = self.api.start_session().await {
            warn!(error = %e, "failed to start analytics session");
        }
    }

    /// Reports that a song started playing.
    pub async fn song_start(&self, song_id: &str) {
        debug!(song = song_id, "reporting song start");
        if let Err(e) = self.api.song_start(song_id).await {
            warn!(error = %e, "failed to report song start");
        }
    }

    /// Reports that a song's tracking window closed.
    ///
    /// When the engine never learned the track length, the listened time
    /// stands in for it.
    pub async fn song_end(&self, song: &FinishedSong, completed: bool) {
        let listened = song.listened.as_secs_f64();
        let duration = song.duration.map_or(listened, |d| d.as_secs_f64());
        debug!(song = %song.id, listened, completed, "reporting song end");
        if let Err(e) = self.api.song_end(&song.id, duration, listened, completed).await {
            warn!(error = %e, "failed to report song end");
        }
    }

    /// Reports that a song was skipped.
    pub async fn song_skip(&self, song_id: &str) {
        debug!(song = song_id, "reporting song skip");
        if let Err(e) = self.api.song_skip(song_id).await {
            warn!(error = %e, "failed to report song skip");
        }
    }

    /// Fetches aggregate listening statistics.
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be decoded.
    pub async fn stats(&self) -> Result<Value, ApiError> {
        self.api.stats().await
    }

    /// Resets server-side listening statistics.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn reset(&self) -> Result<(), ApiError> {
        self.api.reset().await
    }
}
