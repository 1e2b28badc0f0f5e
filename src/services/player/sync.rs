use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tracing::{debug, warn};

use super::{PlayerError, output::AudioOutput, store::PlaybackStateStore};
use crate::services::{
    api::{CurrentState, PlayerApi},
    attention::ControlSurface,
};

const PLAY_RETRY_DELAY: Duration = Duration::from_millis(100);

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Another pass was in flight; this state was dropped, not queued.
    Dropped,
    /// Version matched the cache; at most the transport was realigned.
    FastPath,
    /// Same track under a new version; only the transport changed.
    TransportOnly,
    /// A different track was fetched and loaded into the engine.
    TrackLoaded,
    /// The playlist emptied; the engine was stopped.
    Cleared,
}

/// Reconciles server playback state against the local audio engine.
///
/// The only code path that mutates the audio source. Server state arrives
/// from the poll loop, from user-action responses and from forced refreshes;
/// all of them funnel through [`reconcile`](Self::reconcile), which compares
/// the reported `state_version` and track against the store's cache and
/// applies the narrowest change that closes the gap.
pub struct SyncController {
    api: Arc<dyn PlayerApi>,
    output: Arc<dyn AudioOutput>,
    surface: Arc<dyn ControlSurface>,
    store: Arc<PlaybackStateStore>,
    in_flight: AtomicBool,
}

impl SyncController {
    /// Creates a controller around the injected collaborators.
    pub fn new(
        api: Arc<dyn PlayerApi>,
        output: Arc<dyn AudioOutput>,
        surface: Arc<dyn ControlSurface>,
        store: Arc<PlaybackStateStore>,
    ) -> Self {
        Self {
            api,
            output,
            surface,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Applies a server state snapshot to the engine and store.
    ///
    /// At most one pass runs at a time; a snapshot arriving while another is
    /// being applied is dropped (the next poll delivers a fresher one). The
    /// store is committed only after the engine accepted every command, so a
    /// failed pass leaves the cache untouched and the transition retries on
    /// the next poll.
    ///
    /// # Errors
    /// Returns error if fetching or decoding the track fails, or the engine
    /// rejects a transport command.
    pub async fn reconcile(&self, state: &CurrentState) -> Result<ReconcileOutcome, PlayerError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!(
                version = state.state_version,
                "reconciliation in flight, dropping snapshot"
            );
            return Ok(ReconcileOutcome::Dropped);
        }

        let result = self.apply(state).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    /// Whether a reconciliation pass is currently applying a snapshot.
    pub fn is_reconciling(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn apply(&self, state: &CurrentState) -> Result<ReconcileOutcome, PlayerError> {
        let cache = self.store.cache();

        if cache.version == Some(state.state_version) {
            // Unchanged version means the loaded track is current, but the
            // transport can still drift (a rejected play, an engine pause).
            if cache.playing != state.is_playing {
                debug!(
                    playing = state.is_playing,
                    "version unchanged, realigning transport"
                );
                let playing = self.align_transport(state.is_playing).await;
                self.store.commit_playing(playing);
            }
            return Ok(ReconcileOutcome::FastPath);
        }

        let Some(song) = &state.song else {
            debug!(version = state.state_version, "playlist empty, stopping engine");
            self.output.stop();
            self.store.commit(state);
            return Ok(ReconcileOutcome::Cleared);
        };

        if cache.track.as_deref() == Some(song.filename.as_str()) && self.output.is_loaded() {
            // Same track under a new version: play/pause toggle, seek, or a
            // playlist edit that kept the current entry. A finished source
            // falls through to a reload instead (repeat-one restarts).
            debug!(
                version = state.state_version,
                playing = state.is_playing,
                "track unchanged, applying transport"
            );
            let playing = self.align_transport(state.is_playing).await;
            let mut applied = state.clone();
            applied.is_playing = playing;
            self.store.commit(&applied);
            return Ok(ReconcileOutcome::TransportOnly);
        }

        debug!(
            track = %song.filename,
            version = state.state_version,
            "track changed, loading"
        );
        let bytes = self.api.track_bytes(&song.filename).await?;
        self.output.load(bytes)?;

        let playing = if state.is_playing {
            self.attempt_play().await
        } else {
            false
        };
        let mut applied = state.clone();
        applied.is_playing = playing;
        self.store.commit(&applied);
        Ok(ReconcileOutcome::TrackLoaded)
    }

    /// Drives the transport toward the requested playing flag.
    ///
    /// Returns the flag the engine actually ended up in.
    async fn align_transport(&self, playing: bool) -> bool {
        if playing {
            self.attempt_play().await
        } else {
            self.output.pause();
            false
        }
    }

    /// Starts playback with a single bounded retry.
    ///
    /// On a rejected start, waits 100 ms and tries once more; a second
    /// rejection surfaces a notification instead of looping.
    async fn attempt_play(&self) -> bool {
        match self.output.play() {
            Ok(()) => return true,
            Err(e) => debug!(error = %e, "play rejected, retrying once"),
        }

        tokio::time::sleep(PLAY_RETRY_DELAY).await;
        match self.output.play() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "play retry rejected");
                self.surface.notify("Press play to start playback");
                false
            }
        }
    }
}
