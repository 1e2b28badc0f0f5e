use std::sync::{Mutex, mpsc};

use cpal::{
    BufferSize, SampleRate, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, trace, warn};

use super::{CaptureError, source::AudioBlockSource};
use crate::config::CaptureConfig;

/// Microphone capture backed by cpal.
///
/// The input stream lives on a dedicated thread (cpal streams are not
/// `Send`); device callbacks accumulate samples into fixed-size blocks and
/// hand them to the engine through a bounded channel. A mono stream at the
/// configured rate is requested first; if the device refuses, its default
/// format is used and frames are downmixed in the callback.
pub struct MicSource {
    sample_rate: u32,
    block_size: usize,
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl MicSource {
    /// Creates a source requesting the configured rate and block size.
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            stop_tx: Mutex::new(None),
        }
    }
}

impl AudioBlockSource for MicSource {
    fn start(&self, blocks: tokio_mpsc::Sender<Vec<f32>>) -> Result<(), CaptureError> {
        let mut stop_slot = self.stop_tx.lock().unwrap_or_else(|e| e.into_inner());
        if stop_slot.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (init_tx, init_rx) = mpsc::channel();
        let sample_rate = self.sample_rate;
        let block_size = self.block_size;

        std::thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || {
                let stream = match build_stream(sample_rate, block_size, &blocks) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = init_tx.send(Err(e.to_string()));
                    return;
                }
                let _ = init_tx.send(Ok(()));
                debug!("microphone stream open");

                // Keep the stream alive until the source is stopped.
                let _stream = stream;
                let _ = stop_rx.recv();
                debug!("microphone capture thread exiting");
            })
            .map_err(|e| CaptureError::Microphone(e.to_string()))?;

        init_rx
            .recv()
            .map_err(|_| CaptureError::Microphone("capture thread exited".to_string()))?
            .map_err(CaptureError::Microphone)?;

        *stop_slot = Some(stop_tx);
        Ok(())
    }

    fn stop(&self) {
        if self
            .stop_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some()
        {
            debug!("microphone released");
        }
    }
}

fn build_stream(
    sample_rate: u32,
    block_size: usize,
    blocks: &tokio_mpsc::Sender<Vec<f32>>,
) -> Result<cpal::Stream, String> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| "no default input device".to_string())?;

    // Mono at the analyzer's rate first.
    let desired = StreamConfig {
        channels: 1,
        sample_rate: SampleRate(sample_rate),
        buffer_size: BufferSize::Default,
    };
    let tx = blocks.clone();
    let mut accumulator = Vec::with_capacity(block_size);
    if let Ok(stream) = device.build_input_stream(
        &desired,
        move |data: &[f32], _| {
            accumulate(data.iter().copied(), 1, &mut accumulator, block_size, &tx);
        },
        log_stream_error,
        None,
    ) {
        return Ok(stream);
    }

    let default_config = device
        .default_input_config()
        .map_err(|e| e.to_string())?;
    let channels = usize::from(default_config.channels());
    debug!(
        rate = default_config.sample_rate().0,
        channels, "requested format refused, using device default"
    );
    let config: StreamConfig = default_config.clone().into();

    let stream = match default_config.sample_format() {
        cpal::SampleFormat::F32 => {
            let tx = blocks.clone();
            let mut accumulator = Vec::with_capacity(block_size);
            device.build_input_stream(
                &config,
                move |data: &[f32], _| {
                    accumulate(data.iter().copied(), channels, &mut accumulator, block_size, &tx);
                },
                log_stream_error,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let tx = blocks.clone();
            let mut accumulator = Vec::with_capacity(block_size);
            device.build_input_stream(
                &config,
                move |data: &[i16], _| {
                    accumulate(
                        data.iter().map(|&s| f32::from(s) / f32::from(i16::MAX)),
                        channels,
                        &mut accumulator,
                        block_size,
                        &tx,
                    );
                },
                log_stream_error,
                None,
            )
        }
        cpal::SampleFormat::U16 => {
            let tx = blocks.clone();
            let mut accumulator = Vec::with_capacity(block_size);
            device.build_input_stream(
                &config,
                move |data: &[u16], _| {
                    accumulate(
                        data.iter()
                            .map(|&s| (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0),
                        channels,
                        &mut accumulator,
                        block_size,
                        &tx,
                    );
                },
                log_stream_error,
                None,
            )
        }
        other => return Err(format!("unsupported sample format: {other:?}")),
    };

    stream.map_err(|e| e.to_string())
}

fn log_stream_error(err: cpal::StreamError) {
    warn!(error = %err, "microphone stream error");
}

/// Downmixes interleaved frames to mono and emits full blocks.
///
/// cpal delivers whole frames per callback, so per-call channel chunking
/// never splits a frame.
fn accumulate(
    samples: impl Iterator<Item = f32>,
    channels: usize,
    accumulator: &mut Vec<f32>,
    block_size: usize,
    blocks: &tokio_mpsc::Sender<Vec<f32>>,
) {
    if channels <= 1 {
        accumulator.extend(samples);
    } else {
        let mut sum = 0.0f32;
        let mut in_frame = 0usize;
        for sample in samples {
            sum += sample;
            in_frame += 1;
            if in_frame == channels {
                accumulator.push(sum / channels as f32);
                sum = 0.0;
                in_frame = 0;
            }
        }
    }

    while accumulator.len() >= block_size {
        let block: Vec<f32> = accumulator.drain(..block_size).collect();
        if blocks.try_send(block).is_err() {
            trace!("audio forwarder busy, dropping block");
        }
    }
}
