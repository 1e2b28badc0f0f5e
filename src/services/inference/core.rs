use std::sync::{Arc, Mutex};

use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, info};

use super::overlay::{DrawOp, OverlayScene, OverlaySink, Point};
use crate::services::{
    channel::{
        AttentionPattern, AudioResult, FusionUpdate, SocketChannel, VideoAnalysis, VideoResult,
    },
    common::Property,
};

const MARKER_RADIUS: f64 = 40.0;
const YAW_OFFSET_SCALE: f64 = 4.0;
const PITCH_OFFSET_SCALE: f64 = 3.0;
const DIRECTION_LENGTH: f64 = 30.0;
const DIRECTION_NORM: f64 = 50.0;

/// Alert raised while the fused attention pattern is not normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternAlert {
    /// Pattern that triggered the alert.
    pub pattern: AttentionPattern,

    /// Display text for the alert.
    pub message: &'static str,
}

/// Message text per abnormal pattern; `Normal` clears the alert.
fn alert_message(pattern: AttentionPattern) -> Option<&'static str> {
    match pattern {
        AttentionPattern::Normal => None,
        AttentionPattern::Drowsy => Some("You seem drowsy. Want something more energizing?"),
        AttentionPattern::Absent => Some("Nobody seems to be listening right now."),
    }
}

/// Consumer of the server's inference results.
///
/// Subscribes to the channel's three result streams and treats the latest
/// result on each as authoritative for that channel alone; results carry
/// no correlation to the captures that produced them and no cross-channel
/// order. Video results additionally drive the tracking overlay, exactly
/// one redraw per result. Audio and fusion results only update the
/// metrics properties.
pub struct ResultRenderer {
    overlay: Arc<dyn OverlaySink>,
    last_marker: Mutex<Option<Point>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Latest video analysis, with the server's frame counter.
    pub video: Property<Option<VideoResult>>,
    /// Latest audio analysis, with the server's chunk counter.
    pub audio: Property<Option<AudioResult>>,
    /// Latest fused multimodal update.
    pub fusion: Property<Option<FusionUpdate>>,
    /// Active abnormal-pattern alert, if any.
    pub pattern_alert: Property<Option<PatternAlert>>,
}

impl ResultRenderer {
    /// Creates the renderer around an overlay surface.
    pub fn new(overlay: Arc<dyn OverlaySink>) -> Self {
        Self {
            overlay,
            last_marker: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
            video: Property::new(None),
            audio: Property::new(None),
            fusion: Property::new(None),
            pattern_alert: Property::new(None),
        }
    }

    /// Subscribes to the channel's result streams.
    ///
    /// Each stream gets its own consumer task, so a slow channel never
    /// delays the others. A lagged receiver skips straight to the newest
    /// result, which is last-write-wins under bursts.
    pub fn start(self: &Arc<Self>, channel: &SocketChannel) {
        info!("starting result renderer");
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());

        let weak = Arc::downgrade(self);
        let mut video = channel.video_results();
        tasks.push(tokio::spawn(async move {
            loop {
                match video.recv().await {
                    Ok(result) => {
                        let Some(renderer) = weak.upgrade() else { break };
                        renderer.apply_video(result);
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }));

        let weak = Arc::downgrade(self);
        let mut audio = channel.audio_results();
        tasks.push(tokio::spawn(async move {
            loop {
                match audio.recv().await {
                    Ok(result) => {
                        let Some(renderer) = weak.upgrade() else { break };
                        renderer.apply_audio(result);
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }));

        let weak = Arc::downgrade(self);
        let mut fusion = channel.fusion_updates();
        tasks.push(tokio::spawn(async move {
            loop {
                match fusion.recv().await {
                    Ok(update) => {
                        let Some(renderer) = weak.upgrade() else { break };
                        renderer.apply_fusion(update);
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }));

        let weak = Arc::downgrade(self);
        let mut resets = channel.stats_resets();
        tasks.push(tokio::spawn(async move {
            loop {
                match resets.recv().await {
                    Ok(reset) => {
                        debug!(message = %reset.message, "analyzer stats reset");
                        let Some(renderer) = weak.upgrade() else { break };
                        renderer.apply_reset();
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }));
    }

    /// Applies a video result: one overlay redraw, then the metrics update.
    pub fn apply_video(&self, result: VideoResult) {
        self.draw(&result.result);
        self.video.set(Some(result));
    }

    /// Applies an audio result to the metrics model.
    pub fn apply_audio(&self, result: AudioResult) {
        self.audio.set(Some(result));
    }

    /// Applies a fusion update and toggles the pattern alert.
    pub fn apply_fusion(&self, update: FusionUpdate) {
        let alert = alert_message(update.pattern).map(|message| PatternAlert {
            pattern: update.pattern,
            message,
        });
        self.pattern_alert.set(alert);
        self.fusion.set(Some(update));
    }

    /// Clears all three channels, the alert, and the trail.
    pub fn apply_reset(&self) {
        self.video.set(None);
        self.audio.set(None);
        self.fusion.set(None);
        self.pattern_alert.set(None);
        *self.last_marker.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Aborts the consumer tasks.
    pub fn shutdown(&self) {
        debug!("shutting down result renderer");
        self.abort_tasks();
    }

    fn draw(&self, analysis: &VideoAnalysis) {
        // Surface size is re-read per draw so a resize between results
        // never leaves the scene scaled to stale dimensions.
        let (width, height) = self.overlay.dimensions();
        let mut last_marker = self.last_marker.lock().unwrap_or_else(|e| e.into_inner());
        let scene = compose_scene(analysis, width, height, &mut last_marker);
        drop(last_marker);
        self.overlay.render(scene);
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

impl Drop for ResultRenderer {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// Builds the draw list for one video result.
///
/// The marker sits at the frame center offset by scaled yaw/pitch; the
/// direction indicator points along the same vector; the trail connects
/// only the immediately prior marker, a single-sample history that resets
/// whenever the face is lost.
fn compose_scene(
    analysis: &VideoAnalysis,
    width: u32,
    height: u32,
    last_marker: &mut Option<Point>,
) -> OverlayScene {
    let mut ops = vec![DrawOp::Clear];

    if !analysis.face_detected {
        ops.push(DrawOp::NoFaceNotice);
        *last_marker = None;
        return OverlayScene { ops };
    }

    let yaw = analysis.head_pose.yaw;
    let pitch = analysis.head_pose.pitch;
    let marker = Point::new(
        f64::from(width) / 2.0 + yaw * YAW_OFFSET_SCALE,
        f64::from(height) / 2.0 + pitch * PITCH_OFFSET_SCALE,
    );

    ops.push(DrawOp::HeadMarker {
        center: marker,
        radius: MARKER_RADIUS,
    });
    ops.push(DrawOp::DirectionIndicator {
        from: marker,
        to: Point::new(
            marker.x + yaw / DIRECTION_NORM * DIRECTION_LENGTH,
            marker.y + pitch / DIRECTION_NORM * DIRECTION_LENGTH,
        ),
    });
    if let Some(previous) = *last_marker {
        ops.push(DrawOp::Trail {
            from: previous,
            to: marker,
        });
    }
    ops.push(DrawOp::PoseReadout { yaw, pitch });

    *last_marker = Some(marker);
    OverlayScene { ops }
}
