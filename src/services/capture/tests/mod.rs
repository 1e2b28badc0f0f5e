//! Unit tests for the capture engine.
//!
//! Hardware sources are in-memory fakes; the engine's acquisition,
//! teardown and encoding behavior is exercised without devices.

#![allow(clippy::panic)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tokio::sync::mpsc;

use super::{
    AudioBlockSource, CaptureEngine, CaptureError, FrameSource, RgbFrame,
    core::frame_period,
    encode::{frame_to_jpeg_data_url, samples_to_base64},
};
use crate::{
    config::CaptureConfig,
    services::{
        api::{ApiError, CaptureControlApi},
        channel::ClientMessage,
    },
};

struct FakeCamera {
    fail_open: bool,
    opens: AtomicU32,
    closes: AtomicU32,
    frame: Mutex<Option<RgbFrame>>,
}

impl FakeCamera {
    fn new(fail_open: bool) -> Self {
        Self {
            fail_open,
            opens: AtomicU32::new(0),
            closes: AtomicU32::new(0),
            frame: Mutex::new(None),
        }
    }

    fn provide(&self, frame: RgbFrame) {
        *self.frame.lock().unwrap() = Some(frame);
    }
}

impl FrameSource for FakeCamera {
    fn open(&self) -> Result<(), CaptureError> {
        if self.fail_open {
            return Err(CaptureError::Camera("no camera".to_string()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn grab(&self) -> Option<RgbFrame> {
        self.frame.lock().unwrap().clone()
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeMic {
    fail_start: bool,
    starts: AtomicU32,
    stops: AtomicU32,
    blocks_tx: Mutex<Option<mpsc::Sender<Vec<f32>>>>,
}

impl FakeMic {
    fn new(fail_start: bool) -> Self {
        Self {
            fail_start,
            starts: AtomicU32::new(0),
            stops: AtomicU32::new(0),
            blocks_tx: Mutex::new(None),
        }
    }

    async fn deliver(&self, block: Vec<f32>) {
        let tx = self
            .blocks_tx
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| panic!("mic not started"));
        tx.send(block).await.unwrap_or_else(|_| panic!("forwarder gone"));
    }
}

impl AudioBlockSource for FakeMic {
    fn start(&self, blocks: mpsc::Sender<Vec<f32>>) -> Result<(), CaptureError> {
        if self.fail_start {
            return Err(CaptureError::Microphone("no microphone".to_string()));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.blocks_tx.lock().unwrap() = Some(blocks);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.blocks_tx.lock().unwrap().take();
    }
}

#[derive(Default)]
struct FakeControl {
    started: AtomicU32,
    stopped: AtomicU32,
}

#[async_trait]
impl CaptureControlApi for FakeControl {
    async fn capture_started(&self) -> Result<(), ApiError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn capture_stopped(&self) -> Result<(), ApiError> {
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Rig {
    camera: Arc<FakeCamera>,
    mic: Arc<FakeMic>,
    control: Arc<FakeControl>,
    engine: CaptureEngine,
    frame_rx: mpsc::Receiver<ClientMessage>,
    audio_rx: mpsc::Receiver<ClientMessage>,
}

fn rig(fail_camera: bool, fail_mic: bool) -> Rig {
    let camera = Arc::new(FakeCamera::new(fail_camera));
    let mic = Arc::new(FakeMic::new(fail_mic));
    let control = Arc::new(FakeControl::default());
    let (frame_tx, frame_rx) = mpsc::channel(1);
    let (audio_tx, audio_rx) = mpsc::channel(1);

    let engine = CaptureEngine::new(
        Arc::clone(&camera) as Arc<dyn FrameSource>,
        Arc::clone(&mic) as Arc<dyn AudioBlockSource>,
        Arc::clone(&control) as Arc<dyn CaptureControlApi>,
        frame_tx,
        audio_tx,
        &CaptureConfig::default(),
    );

    Rig {
        camera,
        mic,
        control,
        engine,
        frame_rx,
        audio_rx,
    }
}

fn test_frame() -> RgbFrame {
    RgbFrame {
        width: 2,
        height: 2,
        data: vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
    }
}

#[tokio::test]
async fn start_acquires_both_sources_and_notifies_server() {
    let rig = rig(false, false);

    rig.engine.start().await.unwrap_or_else(|e| panic!("{e}"));

    assert!(rig.engine.active.get());
    assert_eq!(rig.camera.opens.load(Ordering::SeqCst), 1);
    assert_eq!(rig.mic.starts.load(Ordering::SeqCst), 1);
    assert_eq!(rig.control.started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn start_is_a_noop_while_active() {
    let rig = rig(false, false);

    rig.engine.start().await.unwrap_or_else(|e| panic!("{e}"));
    rig.engine.start().await.unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(rig.camera.opens.load(Ordering::SeqCst), 1);
    assert_eq!(rig.control.started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_starts_acquire_the_hardware_once() {
    let rig = rig(false, false);

    let (first, second) = tokio::join!(rig.engine.start(), rig.engine.start());
    first.unwrap_or_else(|e| panic!("{e}"));
    second.unwrap_or_else(|e| panic!("{e}"));

    assert!(rig.engine.active.get());
    assert_eq!(rig.camera.opens.load(Ordering::SeqCst), 1);
    assert_eq!(rig.mic.starts.load(Ordering::SeqCst), 1);
    assert_eq!(rig.control.started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn microphone_failure_releases_the_opened_camera() {
    let rig = rig(false, true);

    let result = rig.engine.start().await;

    assert!(matches!(result, Err(CaptureError::Microphone(_))));
    assert!(!rig.engine.active.get());
    assert_eq!(rig.camera.opens.load(Ordering::SeqCst), 1);
    assert_eq!(rig.camera.closes.load(Ordering::SeqCst), 1);
    assert_eq!(rig.control.started.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn camera_failure_leaves_everything_untouched() {
    let rig = rig(true, false);

    let result = rig.engine.start().await;

    assert!(matches!(result, Err(CaptureError::Camera(_))));
    assert!(!rig.engine.active.get());
    assert_eq!(rig.mic.starts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let rig = rig(false, false);
    rig.engine.start().await.unwrap_or_else(|e| panic!("{e}"));

    rig.engine.stop().await;
    rig.engine.stop().await;

    assert!(!rig.engine.active.get());
    assert_eq!(rig.camera.closes.load(Ordering::SeqCst), 1);
    assert_eq!(rig.mic.stops.load(Ordering::SeqCst), 1);
    assert_eq!(rig.control.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stop_before_start_does_nothing() {
    let rig = rig(false, false);

    rig.engine.stop().await;

    assert_eq!(rig.camera.closes.load(Ordering::SeqCst), 0);
    assert_eq!(rig.control.stopped.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn frames_are_emitted_as_jpeg_data_urls() {
    let mut rig = rig(false, false);
    rig.camera.provide(test_frame());

    rig.engine.start().await.unwrap_or_else(|e| panic!("{e}"));

    let message = rig
        .frame_rx
        .recv()
        .await
        .unwrap_or_else(|| panic!("no frame emitted"));
    match message {
        ClientMessage::VideoFrame { frame } => {
            assert!(frame.starts_with("data:image/jpeg;base64,"));
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn audio_blocks_round_trip_as_base64_f32le() {
    let mut rig = rig(false, false);
    rig.engine.start().await.unwrap_or_else(|e| panic!("{e}"));

    let block = vec![0.0_f32, 0.5, -1.0, 0.25];
    rig.mic.deliver(block.clone()).await;

    let message = rig
        .audio_rx
        .recv()
        .await
        .unwrap_or_else(|| panic!("no audio emitted"));
    let ClientMessage::AudioChunk { audio } = message else {
        panic!("unexpected message");
    };

    let bytes = STANDARD
        .decode(audio)
        .unwrap_or_else(|e| panic!("invalid base64: {e}"));
    let expected: Vec<u8> = block.iter().flat_map(|s| s.to_le_bytes()).collect();
    assert_eq!(bytes, expected);
}

#[test]
fn sample_encoding_matches_little_endian_layout() {
    let samples = [1.0_f32, -0.5, 0.0];
    let encoded = samples_to_base64(&samples);

    let bytes = STANDARD
        .decode(encoded)
        .unwrap_or_else(|e| panic!("invalid base64: {e}"));
    assert_eq!(bytes.len(), 12);
    assert_eq!(&bytes[0..4], 1.0_f32.to_le_bytes());
    assert_eq!(&bytes[4..8], (-0.5_f32).to_le_bytes());
}

#[test]
fn frame_period_never_collapses_to_zero() {
    assert_eq!(frame_period(10), std::time::Duration::from_millis(100));
    assert_eq!(frame_period(0), std::time::Duration::from_secs(1));
    // Absurdly high ceilings still yield a tickable period.
    assert_eq!(frame_period(5000), std::time::Duration::from_millis(1));
}

#[test]
fn frame_encoding_produces_a_data_url() {
    let url = frame_to_jpeg_data_url(&test_frame(), 80).unwrap_or_else(|e| panic!("{e}"));
    assert!(url.starts_with("data:image/jpeg;base64,"));
    assert!(url.len() > "data:image/jpeg;base64,".len());
}
