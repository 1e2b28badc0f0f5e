use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    sync::{Mutex as AsyncMutex, mpsc},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, trace, warn};

use super::{
    CaptureError,
    encode::{frame_to_jpeg_data_url, samples_to_base64},
    source::{AudioBlockSource, FrameSource},
};
use crate::{
    config::CaptureConfig,
    services::{api::CaptureControlApi, channel::ClientMessage, common::Property},
};

const BLOCK_QUEUE: usize = 4;

/// Camera and microphone capture engine.
///
/// Owns both hardware sources exclusively. `start` acquires them as one
/// request: if either fails the other is released and the engine stays
/// inactive. While active, a sampler task emits JPEG frames at the
/// configured ceiling and a forwarder task emits base64 audio blocks;
/// both drop work when the socket writer has not consumed the previous
/// message.
pub struct CaptureEngine {
    frames: Arc<dyn FrameSource>,
    audio: Arc<dyn AudioBlockSource>,
    control: Arc<dyn CaptureControlApi>,
    frame_tx: mpsc::Sender<ClientMessage>,
    audio_tx: mpsc::Sender<ClientMessage>,
    frame_period: Duration,
    jpeg_quality: u8,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Serializes start/stop so concurrent calls cannot double-acquire.
    transition: AsyncMutex<()>,

    /// Whether capture is currently running.
    pub active: Property<bool>,
}

/// Tick period for the frame sampler.
///
/// Clamped to at least 1 ms; `interval` panics on a zero period.
pub(super) fn frame_period(emit_fps: u32) -> Duration {
    Duration::from_millis((1000 / u64::from(emit_fps.max(1))).max(1))
}

impl CaptureEngine {
    /// Creates the engine around the injected sources.
    ///
    /// `frame_tx` and `audio_tx` are the socket channel's lossy outbound
    /// senders; the engine never blocks on them.
    pub fn new(
        frames: Arc<dyn FrameSource>,
        audio: Arc<dyn AudioBlockSource>,
        control: Arc<dyn CaptureControlApi>,
        frame_tx: mpsc::Sender<ClientMessage>,
        audio_tx: mpsc::Sender<ClientMessage>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            frames,
            audio,
            control,
            frame_tx,
            audio_tx,
            frame_period: frame_period(config.emit_fps),
            jpeg_quality: config.jpeg_quality,
            tasks: Mutex::new(Vec::new()),
            transition: AsyncMutex::new(()),
            active: Property::new(false),
        }
    }

    /// Acquires camera and microphone and starts streaming.
    ///
    /// The acquisition is all-or-nothing: a microphone failure releases
    /// the already-opened camera before returning. A no-op when capture
    /// is already active.
    ///
    /// # Errors
    /// Returns error if either device cannot be acquired.
    pub async fn start(&self) -> Result<(), CaptureError> {
        let _transition = self.transition.lock().await;
        if self.active.get() {
            return Ok(());
        }

        self.frames.open()?;

        let (block_tx, block_rx) = mpsc::channel(BLOCK_QUEUE);
        if let Err(e) = self.audio.start(block_tx) {
            self.frames.close();
            return Err(e);
        }

        self.active.set(true);
        info!("capture started");

        if let Err(e) = self.control.capture_started().await {
            warn!(error = %e, "failed to notify server of capture start");
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.push(self.spawn_frame_sampler());
        tasks.push(self.spawn_audio_forwarder(block_rx));
        Ok(())
    }

    /// Stops streaming and releases both devices.
    ///
    /// Teardown order: the active flag drops first so in-flight callbacks
    /// no-op, then the hardware is released, then the sampling tasks are
    /// cleared. Idempotent; calling while inactive does nothing.
    pub async fn stop(&self) {
        let _transition = self.transition.lock().await;
        if !self.active.get() {
            return;
        }

        self.active.set(false);
        self.frames.close();
        self.audio.stop();
        self.abort_tasks();
        info!("capture stopped");

        if let Err(e) = self.control.capture_stopped().await {
            warn!(error = %e, "failed to notify server of capture stop");
        }
    }

    /// Samples the latest camera frame at the emission cadence.
    ///
    /// A tick with no new frame, a tick that fires while the previous
    /// encode still runs, or a full outbound channel all drop the frame.
    fn spawn_frame_sampler(&self) -> JoinHandle<()> {
        let frames = Arc::clone(&self.frames);
        let frame_tx = self.frame_tx.clone();
        let active = self.active.clone();
        let period = self.frame_period;
        let quality = self.jpeg_quality;

        tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                if !active.get() {
                    break;
                }
                let Some(frame) = frames.grab() else {
                    continue;
                };
                let encoded =
                    tokio::task::spawn_blocking(move || frame_to_jpeg_data_url(&frame, quality))
                        .await;
                match encoded {
                    Ok(Ok(data_url)) => {
                        if frame_tx
                            .try_send(ClientMessage::VideoFrame { frame: data_url })
                            .is_err()
                        {
                            trace!("socket writer busy, dropping frame");
                        }
                    }
                    Ok(Err(e)) => warn!(error = %e, "frame encoding failed"),
                    Err(_) => break,
                }
            }
            debug!("frame sampler exiting");
        })
    }

    /// Forwards microphone blocks to the socket as base64 chunks.
    fn spawn_audio_forwarder(&self, mut blocks: mpsc::Receiver<Vec<f32>>) -> JoinHandle<()> {
        let audio_tx = self.audio_tx.clone();
        let active = self.active.clone();

        tokio::spawn(async move {
            while let Some(block) = blocks.recv().await {
                if !active.get() {
                    break;
                }
                let audio = samples_to_base64(&block);
                if audio_tx
                    .try_send(ClientMessage::AudioChunk { audio })
                    .is_err()
                {
                    trace!("socket writer busy, dropping audio block");
                }
            }
            debug!("audio forwarder exiting");
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

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        if self.active.get() {
            self.active.set(false);
            self.frames.close();
            self.audio.stop();
        }
        self.abort_tasks();
    }
}
