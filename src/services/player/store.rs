use std::sync::Mutex;

use crate::services::{
    api::{CurrentState, ModesInfo, PlaylistEntry, PlaylistInfo, SongInfo},
    common::Property,
};

/// Snapshot of the last successfully reconciled server state.
///
/// Updated only after a reconciliation (or user action) fully succeeds, so a
/// failed attempt leaves the cache untouched and the next poll retries the
/// same transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncCache {
    /// Server `state_version` at the last successful reconciliation.
    pub version: Option<u64>,
    /// Filename of the track currently loaded into the engine.
    pub track: Option<String>,
    /// Whether the engine was left playing.
    pub playing: bool,
}

/// Local mirror of server playback state.
///
/// Holds the reconciliation cache plus reactive properties observers can
/// watch for metadata, transport and playlist changes. Only the sync
/// controller mutates it.
#[derive(Debug)]
pub struct PlaybackStateStore {
    cache: Mutex<SyncCache>,

    /// Metadata of the current track, if any.
    pub now_playing: Property<Option<SongInfo>>,
    /// Whether the server reports playback as active.
    pub playing: Property<bool>,
    /// Zero-based index of the current track (-1 when nothing is queued).
    pub track_index: Property<i64>,
    /// Number of tracks in the playlist.
    pub track_total: Property<u64>,
    /// Playlist entries from the last refresh.
    pub playlist: Property<Vec<PlaylistEntry>>,
    /// Shuffle mode flag.
    pub shuffle: Property<bool>,
    /// Repeat mode flag.
    pub repeat: Property<bool>,
}

impl Default for PlaybackStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackStateStore {
    /// Creates an empty store (no version cached, nothing playing).
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(SyncCache::default()),
            now_playing: Property::new(None),
            playing: Property::new(false),
            track_index: Property::new(-1),
            track_total: Property::new(0),
            playlist: Property::new(Vec::new()),
            shuffle: Property::new(false),
            repeat: Property::new(false),
        }
    }

    /// Returns a copy of the reconciliation cache.
    pub fn cache(&self) -> SyncCache {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Records a fully applied server state.
    ///
    /// Cache fields and observable properties move together so observers
    /// never see a version the engine has not caught up with.
    pub(crate) fn commit(&self, state: &CurrentState) {
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.version = Some(state.state_version);
            cache.track = state.song.as_ref().map(|song| song.filename.clone());
            cache.playing = state.is_playing;
        }
        self.now_playing.set(state.song.clone());
        self.playing.set(state.is_playing);
        self.track_index.set(state.index);
        self.track_total.set(state.total);
    }

    /// Records an is-playing realignment on the version fast path.
    pub(crate) fn commit_playing(&self, playing: bool) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).playing = playing;
        self.playing.set(playing);
    }

    /// Updates the playlist property from a refresh response.
    pub(crate) fn set_playlist(&self, info: &PlaylistInfo) {
        self.playlist.set(info.playlist.clone());
    }

    /// Updates the shuffle/repeat properties.
    pub(crate) fn set_modes(&self, modes: ModesInfo) {
        self.shuffle.set(modes.shuffle);
        self.repeat.set(modes.repeat);
    }
}
