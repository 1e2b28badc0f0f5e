use std::sync::{Arc, Mutex, mpsc};

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};
use tracing::{debug, warn};

use super::{
    CaptureError,
    source::{FrameSource, RgbFrame},
};
use crate::config::CaptureConfig;

/// Camera capture backed by nokhwa.
///
/// The camera is opened on a dedicated thread that continuously decodes
/// frames into a single latest-frame slot; `grab` takes from that slot.
/// The capture thread exits when its stop channel closes.
pub struct CameraSource {
    width: u32,
    height: u32,
    fps: u32,
    latest: Arc<Mutex<Option<RgbFrame>>>,
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl CameraSource {
    /// Creates a source requesting the configured resolution and rate.
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            width: config.frame_width,
            height: config.frame_height,
            fps: config.camera_fps,
            latest: Arc::new(Mutex::new(None)),
            stop_tx: Mutex::new(None),
        }
    }
}

impl FrameSource for CameraSource {
    fn open(&self) -> Result<(), CaptureError> {
        let mut stop_slot = self.stop_tx.lock().unwrap_or_else(|e| e.into_inner());
        if stop_slot.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (init_tx, init_rx) = mpsc::channel();
        let latest = Arc::clone(&self.latest);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(self.width, self.height),
                FrameFormat::MJPEG,
                self.fps,
            ),
        ));

        std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                let mut camera = match Camera::new(CameraIndex::Index(0), requested) {
                    Ok(camera) => camera,
                    Err(e) => {
                        let _ = init_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                if let Err(e) = camera.open_stream() {
                    let _ = init_tx.send(Err(e.to_string()));
                    return;
                }
                let _ = init_tx.send(Ok(()));
                debug!("camera stream open");

                // frame() blocks until the camera delivers, pacing the loop
                // at the hardware rate.
                while matches!(stop_rx.try_recv(), Err(mpsc::TryRecvError::Empty)) {
                    let buffer = match camera.frame() {
                        Ok(buffer) => buffer,
                        Err(e) => {
                            warn!(error = %e, "camera frame read failed");
                            break;
                        }
                    };
                    match buffer.decode_image::<RgbFormat>() {
                        Ok(decoded) => {
                            let frame = RgbFrame {
                                width: decoded.width(),
                                height: decoded.height(),
                                data: decoded.into_raw(),
                            };
                            *latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(frame);
                        }
                        Err(e) => warn!(error = %e, "camera frame decode failed"),
                    }
                }

                let _ = camera.stop_stream();
                debug!("camera capture thread exiting");
            })
            .map_err(|e| CaptureError::Camera(e.to_string()))?;

        init_rx
            .recv()
            .map_err(|_| CaptureError::Camera("capture thread exited".to_string()))?
            .map_err(CaptureError::Camera)?;

        *stop_slot = Some(stop_tx);
        Ok(())
    }

    fn grab(&self) -> Option<RgbFrame> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    fn close(&self) {
        if self
            .stop_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some()
        {
            debug!("camera released");
        }
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}
