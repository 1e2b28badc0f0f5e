use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use serde_json::json;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tokio_stream::StreamExt;
use tracing::{debug, info, instrument, warn};

use super::{
    PlayerError,
    output::AudioOutput,
    store::PlaybackStateStore,
    sync::SyncController,
};
use crate::{
    config::ServerConfig,
    services::{
        analytics::{AnalyticsService, ListeningTracker},
        api::{ApiError, InteractionKind, PlayerApi},
        attention::{AdaptationEngine, ControlSurface},
        channel::ForceRefresh,
    },
};

/// Playback control service.
///
/// Mirrors server playback state into [`PlaybackStateStore`], keeps the
/// local audio engine reconciled against it, and exposes the user-facing
/// transport and playlist actions. Each action posts to the server and
/// reconciles the engine from the response, so the cached version always
/// reflects the action the user just took.
pub struct PlayerService {
    api: Arc<dyn PlayerApi>,
    output: Arc<dyn AudioOutput>,
    surface: Arc<dyn ControlSurface>,
    analytics: Arc<AnalyticsService>,
    adaptation: Arc<AdaptationEngine>,
    sync: Arc<SyncController>,
    /// Observable playback state for UI surfaces.
    pub store: Arc<PlaybackStateStore>,
    tracker: Arc<ListeningTracker>,
    completed: Arc<AtomicBool>,
    poll_interval: Duration,
    playlist_interval: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PlayerService {
    /// Creates the service around the injected collaborators.
    pub fn new(
        api: Arc<dyn PlayerApi>,
        output: Arc<dyn AudioOutput>,
        surface: Arc<dyn ControlSurface>,
        analytics: Arc<AnalyticsService>,
        adaptation: Arc<AdaptationEngine>,
        config: &ServerConfig,
    ) -> Self {
        let store = Arc::new(PlaybackStateStore::new());
        let sync = Arc::new(SyncController::new(
            Arc::clone(&api),
            Arc::clone(&output),
            Arc::clone(&surface),
            Arc::clone(&store),
        ));

        Self {
            api,
            output,
            surface,
            analytics,
            adaptation,
            sync,
            store,
            tracker: Arc::new(ListeningTracker::new()),
            completed: Arc::new(AtomicBool::new(false)),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            playlist_interval: Duration::from_secs(config.playlist_refresh_secs),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Opens the analytics session and spawns the background loops.
    ///
    /// The state poll fires immediately, so the first reconciliation happens
    /// right after startup without waiting a full interval.
    pub async fn start(&self) {
        info!("starting player service");
        self.analytics.start_session().await;

        match self.api.modes().await {
            Ok(modes) => self.store.set_modes(modes),
            Err(e) => warn!(error = %e, "failed to fetch playback modes"),
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.push(self.spawn_state_poll());
        tasks.push(self.spawn_playlist_refresh());
        tasks.push(self.spawn_ended_advance());
        tasks.push(self.spawn_song_lifecycle());
    }

    /// Re-fetches server state and playlist through the normal reconcile
    /// path. Used at startup, after uploads, and on forced refreshes.
    ///
    /// # Errors
    /// Returns error if the state fetch or reconciliation fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), PlayerError> {
        let state = self.api.current_state().await?;
        self.sync.reconcile(&state).await?;

        match self.api.playlist().await {
            Ok(info) => self.store.set_playlist(&info),
            Err(e) => warn!(error = %e, "playlist refresh failed"),
        }
        Ok(())
    }

    /// Toggles play/pause on the server and applies the response.
    ///
    /// # Errors
    /// Returns error if the request or reconciliation fails.
    pub async fn play_pause(&self) -> Result<(), PlayerError> {
        let state = self.request(self.api.play_pause().await)?;
        self.sync.reconcile(&state).await?;

        let kind = if state.is_playing {
            InteractionKind::Play
        } else {
            InteractionKind::Pause
        };
        self.adaptation.track(kind, json!({})).await;
        Ok(())
    }

    /// Skips to the next track.
    ///
    /// # Errors
    /// Returns error if the request or reconciliation fails.
    pub async fn next(&self) -> Result<(), PlayerError> {
        if let Some(song) = self.store.now_playing.get() {
            self.analytics.song_skip(&song.filename).await;
        }
        let state = self.request(self.api.next().await)?;
        self.sync.reconcile(&state).await?;
        self.adaptation
            .track(InteractionKind::Skip, json!({"direction": "next"}))
            .await;
        Ok(())
    }

    /// Skips to the previous track.
    ///
    /// # Errors
    /// Returns error if the request or reconciliation fails.
    pub async fn previous(&self) -> Result<(), PlayerError> {
        if let Some(song) = self.store.now_playing.get() {
            self.analytics.song_skip(&song.filename).await;
        }
        let state = self.request(self.api.previous().await)?;
        self.sync.reconcile(&state).await?;
        self.adaptation
            .track(InteractionKind::Skip, json!({"direction": "previous"}))
            .await;
        Ok(())
    }

    /// Jumps to a playlist entry by index.
    ///
    /// # Errors
    /// Returns error if the request or reconciliation fails.
    pub async fn play_index(&self, index: i64) -> Result<(), PlayerError> {
        let state = self.request(self.api.play_index(index).await)?;
        self.sync.reconcile(&state).await?;
        self.adaptation
            .track(InteractionKind::Playlist, json!({"index": index}))
            .await;
        Ok(())
    }

    /// Seeks within the current track to a 0.0..=1.0 fraction.
    ///
    /// # Errors
    /// Returns error if no track is loaded, its length is unknown, or the
    /// source cannot seek.
    pub async fn seek_to_fraction(&self, fraction: f64) -> Result<(), PlayerError> {
        let duration = self.output.duration().ok_or(PlayerError::UnknownDuration)?;
        let position = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.output.seek(position)?;
        self.adaptation
            .track(
                InteractionKind::Seek,
                json!({"position_secs": position.as_secs_f64()}),
            )
            .await;
        Ok(())
    }

    /// Toggles shuffle mode, returning the new flag.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn toggle_shuffle(&self) -> Result<bool, PlayerError> {
        let enabled = self.request(self.api.toggle_shuffle().await)?;
        self.store.shuffle.set(enabled);
        self.adaptation
            .track(InteractionKind::Playlist, json!({"shuffle": enabled}))
            .await;
        Ok(enabled)
    }

    /// Toggles repeat mode, returning the new flag.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn toggle_repeat(&self) -> Result<bool, PlayerError> {
        let enabled = self.request(self.api.toggle_repeat().await)?;
        self.store.repeat.set(enabled);
        self.adaptation
            .track(InteractionKind::Playlist, json!({"repeat": enabled}))
            .await;
        Ok(enabled)
    }

    /// Uploads audio files and refreshes state, returning the stored names.
    ///
    /// # Errors
    /// Returns error if the upload or the follow-up refresh fails.
    pub async fn upload(&self, files: Vec<PathBuf>) -> Result<Vec<String>, PlayerError> {
        let result = self.request(self.api.upload(files).await)?;
        info!(count = result.uploaded.len(), "uploaded tracks");
        self.refresh().await?;
        self.adaptation
            .track(
                InteractionKind::Playlist,
                json!({"uploaded": result.uploaded.len()}),
            )
            .await;
        Ok(result.uploaded)
    }

    /// Clears the playlist and stops the engine.
    ///
    /// # Errors
    /// Returns error if the request or reconciliation fails.
    pub async fn clear(&self) -> Result<(), PlayerError> {
        let state = self.request(self.api.clear().await)?;
        self.sync.reconcile(&state).await?;
        self.store.playlist.set(Vec::new());
        self.adaptation
            .track(InteractionKind::Playlist, json!({"cleared": true}))
            .await;
        Ok(())
    }

    /// Rescans the server music directory and refreshes state.
    ///
    /// # Errors
    /// Returns error if the request or the follow-up refresh fails.
    pub async fn reload_files(&self) -> Result<u64, PlayerError> {
        let result = self.request(self.api.reload_files().await)?;
        info!(total = result.total, "reloaded music directory");
        self.refresh().await?;
        Ok(result.total)
    }

    /// Spawns a listener that applies server-initiated refresh requests.
    ///
    /// Each request funnels through [`refresh`](Self::refresh), so a forced
    /// refresh reconciles the engine the same way the poll loop does.
    pub fn listen_refresh_requests(self: &Arc<Self>, mut requests: broadcast::Receiver<ForceRefresh>) {
        let weak = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            loop {
                match requests.recv().await {
                    Ok(request) => {
                        let Some(player) = weak.upgrade() else { break };
                        info!(reason = %request.reason, "server requested refresh");
                        if let Err(e) = player.refresh().await {
                            warn!(error = %e, "forced refresh failed");
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(task);
    }

    /// Playback position within the current track.
    pub fn position(&self) -> Duration {
        self.output.position()
    }

    /// Total length of the current track, when known.
    pub fn duration(&self) -> Option<Duration> {
        self.output.duration()
    }

    /// Aborts the background loops and stops the engine.
    pub fn shutdown(&self) {
        debug!("shutting down player service");
        self.abort_tasks();
        self.output.stop();
    }

    fn request<T>(&self, result: Result<T, ApiError>) -> Result<T, PlayerError> {
        result.map_err(|e| {
            self.surface.notify("Unable to reach the player server");
            PlayerError::from(e)
        })
    }

    fn spawn_state_poll(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let sync = Arc::clone(&self.sync);
        let period = self.poll_interval;

        tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                match api.current_state().await {
                    Ok(state) => {
                        if let Err(e) = sync.reconcile(&state).await {
                            warn!(error = %e, "reconciliation failed");
                        }
                    }
                    Err(e) => warn!(error = %e, "state poll failed"),
                }
            }
        })
    }

    fn spawn_playlist_refresh(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);
        let period = self.playlist_interval;

        tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                match api.playlist().await {
                    Ok(info) => store.set_playlist(&info),
                    Err(e) => warn!(error = %e, "playlist poll failed"),
                }
            }
        })
    }

    /// Advances to the next track when the engine reports natural end.
    fn spawn_ended_advance(&self) -> JoinHandle<()> {
        let mut ended = self.output.ended();
        let api = Arc::clone(&self.api);
        let sync = Arc::clone(&self.sync);
        let completed = Arc::clone(&self.completed);

        tokio::spawn(async move {
            loop {
                match ended.recv().await {
                    Ok(()) => {
                        completed.store(true, Ordering::SeqCst);
                        debug!("track ended, advancing");
                        match api.next().await {
                            Ok(state) => {
                                if let Err(e) = sync.reconcile(&state).await {
                                    warn!(error = %e, "auto-advance reconciliation failed");
                                }
                            }
                            Err(e) => warn!(error = %e, "auto-advance request failed"),
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Emits analytics song-start/song-end events as the current track
    /// changes. The `completed` flag distinguishes natural completion from
    /// a skip or playlist change.
    fn spawn_song_lifecycle(&self) -> JoinHandle<()> {
        let mut stream = self.store.now_playing.watch();
        let output = Arc::clone(&self.output);
        let analytics = Arc::clone(&self.analytics);
        let tracker = Arc::clone(&self.tracker);
        let completed = Arc::clone(&self.completed);

        tokio::spawn(async move {
            while let Some(song) = stream.next().await {
                match song {
                    Some(info) => {
                        let previous = tracker.begin(&info.filename, output.duration());
                        if let Some(prev) = previous {
                            let done = completed.swap(false, Ordering::SeqCst);
                            analytics.song_end(&prev, done).await;
                        }
                        analytics.song_start(&info.filename).await;
                    }
                    None => {
                        if let Some(prev) = tracker.finish() {
                            let done = completed.swap(false, Ordering::SeqCst);
                            analytics.song_end(&prev, done).await;
                        }
                    }
                }
            }
        })
    }

    fn abort_tasks(&self) {
        for task in self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
        {
            task.abort();
        }
    }
}

impl Drop for PlayerService {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}
