use std::{
    io::Cursor,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, mpsc},
    time::Duration,
};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::broadcast;
use tracing::debug;

use super::{PlayerError, output::AudioOutput};

const ENDED_POLL: Duration = Duration::from_millis(250);

/// Rodio-backed audio output.
///
/// `rodio::OutputStream` is not `Send`, so the stream lives on a dedicated
/// thread that parks until shutdown; the handle it sends back is enough to
/// build sinks from any thread. Each `load` replaces the sink wholesale,
/// which resets the position to zero.
pub struct RodioOutput {
    handle: OutputStreamHandle,
    inner: Arc<RwLock<Inner>>,
    ended_tx: broadcast::Sender<()>,
    watcher: tokio::task::JoinHandle<()>,
    // Dropping this closes the channel the stream thread blocks on,
    // letting it exit and release the device.
    _shutdown_tx: mpsc::Sender<()>,
}

struct Inner {
    sink: Option<Sink>,
    duration: Option<Duration>,
    loaded: bool,
    volume: f32,
}

impl RodioOutput {
    /// Open the default audio output device.
    ///
    /// # Errors
    /// Returns error if no output device is available or the stream
    /// thread cannot be spawned.
    pub fn new() -> Result<Self, PlayerError> {
        let (init_tx, init_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        std::thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = init_tx.send(Ok(handle));
                    // Keep the stream alive until the service drops.
                    let _stream = stream;
                    let _ = shutdown_rx.recv();
                    debug!("audio output thread exiting");
                }
                Err(e) => {
                    let _ = init_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?;

        let handle = init_rx
            .recv()
            .map_err(|_| PlayerError::DeviceUnavailable("audio thread exited".to_string()))?
            .map_err(PlayerError::DeviceUnavailable)?;

        let inner = Arc::new(RwLock::new(Inner {
            sink: None,
            duration: None,
            loaded: false,
            volume: 1.0,
        }));
        let (ended_tx, _) = broadcast::channel(8);
        let watcher = spawn_ended_watcher(Arc::clone(&inner), ended_tx.clone());

        Ok(Self {
            handle,
            inner,
            ended_tx,
            watcher,
            _shutdown_tx: shutdown_tx,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl AudioOutput for RodioOutput {
    fn load(&self, bytes: Vec<u8>) -> Result<(), PlayerError> {
        let source =
            Decoder::new(Cursor::new(bytes)).map_err(|e| PlayerError::DecodeFailed(e.to_string()))?;
        let duration = source.total_duration();

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?;
        sink.pause();
        sink.append(source);

        let mut guard = self.write();
        sink.set_volume(guard.volume);
        // Replacing the sink drops the previous source mid-queue.
        guard.sink = Some(sink);
        guard.duration = duration;
        guard.loaded = true;
        Ok(())
    }

    fn play(&self) -> Result<(), PlayerError> {
        let guard = self.read();
        let sink = guard.sink.as_ref().ok_or(PlayerError::NothingLoaded)?;
        sink.play();
        Ok(())
    }

    fn pause(&self) {
        if let Some(sink) = self.read().sink.as_ref() {
            sink.pause();
        }
    }

    fn stop(&self) {
        let mut guard = self.write();
        guard.loaded = false;
        guard.duration = None;
        if let Some(sink) = guard.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        let mut guard = self.write();
        guard.volume = clamped;
        if let Some(sink) = guard.sink.as_ref() {
            sink.set_volume(clamped);
        }
    }

    fn volume(&self) -> f32 {
        self.read().volume
    }

    fn position(&self) -> Duration {
        self.read()
            .sink
            .as_ref()
            .map(Sink::get_pos)
            .unwrap_or(Duration::ZERO)
    }

    fn duration(&self) -> Option<Duration> {
        self.read().duration
    }

    fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    fn is_playing(&self) -> bool {
        let guard = self.read();
        guard.loaded
            && guard
                .sink
                .as_ref()
                .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }

    fn seek(&self, position: Duration) -> Result<(), PlayerError> {
        let guard = self.read();
        let sink = guard.sink.as_ref().ok_or(PlayerError::NothingLoaded)?;
        sink.try_seek(position)
            .map_err(|e| PlayerError::SeekFailed(e.to_string()))
    }

    fn ended(&self) -> broadcast::Receiver<()> {
        self.ended_tx.subscribe()
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

/// Polls the sink for natural end of track.
///
/// An emptied, unpaused sink that still counts as loaded means the track
/// played to completion; explicit `stop`/`load` clear the flag first so
/// they never fire the event.
fn spawn_ended_watcher(
    inner: Arc<RwLock<Inner>>,
    ended_tx: broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(ENDED_POLL);
        loop {
            tick.tick().await;
            let finished = {
                let mut guard = inner.write().unwrap_or_else(|e| e.into_inner());
                let done = guard.loaded
                    && guard
                        .sink
                        .as_ref()
                        .is_some_and(|sink| sink.empty() && !sink.is_paused());
                if done {
                    guard.loaded = false;
                }
                done
            };

            if finished {
                debug!("track played to completion");
                let _ = ended_tx.send(());
            }
        }
    })
}
