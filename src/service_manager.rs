use std::sync::Arc;

use tracing::info;

use crate::{
    config::AttuneConfig,
    core::Result,
    services::{
        analytics::AnalyticsService,
        api::{AnalyticsApi, AttentionApi, CaptureControlApi, HttpApi, PlayerApi},
        attention::{AdaptationEngine, ControlSurface},
        capture::{CameraSource, CaptureEngine, MicSource},
        channel::SocketChannel,
        inference::{OverlaySink, ResultRenderer},
        player::{AudioOutput, PlayerService, RodioOutput},
    },
};

/// Container for all application services.
///
/// Wires the HTTP client, the socket channel, the audio engine and the
/// engines around them once per session; everything downstream holds Arc
/// references. The UI surfaces come in as collaborator traits so the same
/// wiring serves the headless binary and any embedded frontend.
pub struct Services {
    /// Persistent socket to the inference pipeline.
    pub channel: Arc<SocketChannel>,
    /// Playback state mirror, reconciliation and user actions.
    pub player: Arc<PlayerService>,
    /// Camera/microphone capture engine.
    pub capture: Arc<CaptureEngine>,
    /// Inference result renderer.
    pub renderer: Arc<ResultRenderer>,
    /// Attention adaptation engine.
    pub adaptation: Arc<AdaptationEngine>,
    /// Listening analytics reporting.
    pub analytics: Arc<AnalyticsService>,
}

impl Services {
    /// Creates all application services around the injected surfaces.
    ///
    /// # Errors
    /// Returns error if the audio output device cannot be opened.
    pub fn new(
        config: &AttuneConfig,
        surface: Arc<dyn ControlSurface>,
        overlay: Arc<dyn OverlaySink>,
    ) -> Result<Self> {
        let api = Arc::new(HttpApi::new(&config.server.base_url));
        let output: Arc<dyn AudioOutput> = Arc::new(RodioOutput::new()?);
        let channel = Arc::new(SocketChannel::new(config.server.ws_url()));

        let analytics = Arc::new(AnalyticsService::new(
            Arc::clone(&api) as Arc<dyn AnalyticsApi>
        ));
        let adaptation = Arc::new(AdaptationEngine::new(
            Arc::clone(&api) as Arc<dyn AttentionApi>,
            Arc::clone(&output),
            Arc::clone(&surface),
            &config.adaptation,
            config.adaptation.enabled,
        ));
        let player = Arc::new(PlayerService::new(
            Arc::clone(&api) as Arc<dyn PlayerApi>,
            Arc::clone(&output),
            surface,
            Arc::clone(&analytics),
            Arc::clone(&adaptation),
            &config.server,
        ));
        let capture = Arc::new(CaptureEngine::new(
            Arc::new(CameraSource::new(&config.capture)),
            Arc::new(MicSource::new(&config.capture)),
            Arc::clone(&api) as Arc<dyn CaptureControlApi>,
            channel.frame_sender(),
            channel.audio_sender(),
            &config.capture,
        ));
        let renderer = Arc::new(ResultRenderer::new(overlay));

        Ok(Self {
            channel,
            player,
            capture,
            renderer,
            adaptation,
            analytics,
        })
    }

    /// Starts the background loops: result consumption, state polling,
    /// attention polling, and server-initiated refresh handling.
    ///
    /// Capture does not start here; it is an explicit user action
    /// ([`CaptureEngine::start`]).
    pub async fn start(&self) {
        info!("starting services");
        self.renderer.start(&self.channel);
        self.player.start().await;
        self.adaptation.start();
        self.player
            .listen_refresh_requests(self.channel.refresh_requests());
    }

    /// Stops capture, the engines, and the socket, releasing all hardware
    /// and timer resources.
    pub async fn shutdown(&self) {
        info!("shutting down services");
        self.capture.stop().await;
        self.adaptation.shutdown();
        self.player.shutdown();
        self.renderer.shutdown();
        self.channel.shutdown();
    }
}
