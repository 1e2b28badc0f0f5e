use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

/// A song whose tracking window just closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedSong {
    /// Server-side identifier (the track filename).
    pub id: String,
    /// Total track length, when the engine knew it.
    pub duration: Option<Duration>,
    /// Wall-clock time the song was the current track.
    pub listened: Duration,
}

#[derive(Debug)]
struct TrackedSong {
    id: String,
    duration: Option<Duration>,
    started: Instant,
}

/// Timestamps song starts and derives listened durations.
///
/// The player begins a window whenever the current track changes and closes
/// the previous one in the same call, so exactly one song is tracked at a
/// time.
#[derive(Debug, Default)]
pub struct ListeningTracker {
    current: Mutex<Option<TrackedSong>>,
}

impl ListeningTracker {
    /// Creates a tracker with no song in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a song, closing the previous window if one was open.
    pub fn begin(&self, id: &str, duration: Option<Duration>) -> Option<FinishedSong> {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let previous = current.take().map(finish);
        *current = Some(TrackedSong {
            id: id.to_string(),
            duration,
            started: Instant::now(),
        });
        previous
    }

    /// Closes the current window without opening a new one.
    pub fn finish(&self) -> Option<FinishedSong> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .map(finish)
    }
}

fn finish(tracked: TrackedSong) -> FinishedSong {
    FinishedSong {
        id: tracked.id,
        duration: tracked.duration,
        listened: tracked.started.elapsed(),
    }
}
