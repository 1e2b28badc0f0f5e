use std::{sync::Mutex, time::Duration};

use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{
    net::TcpStream,
    sync::{broadcast, mpsc},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, instrument, warn};

use super::{
    error::ChannelError,
    messages::{
        AudioResult, ClientMessage, ForceRefresh, FusionUpdate, ServerMessage, StatsReset,
        VideoResult,
    },
};
use crate::services::common::Property;

const RECONNECT_DELAY: Duration = Duration::from_secs(3);
const RESULT_BUFFER: usize = 32;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Persistent duplex channel to the server's inference pipeline.
///
/// Owns the socket connection and reconnects with a fixed delay when it
/// drops. Outbound media messages flow through bounded single-slot
/// channels so producers stay lossy instead of building backlog; inbound
/// results are fanned out per message kind on broadcast channels.
pub struct SocketChannel {
    frame_tx: mpsc::Sender<ClientMessage>,
    audio_tx: mpsc::Sender<ClientMessage>,
    control_tx: mpsc::UnboundedSender<ClientMessage>,

    video_results_tx: broadcast::Sender<VideoResult>,
    audio_results_tx: broadcast::Sender<AudioResult>,
    fusion_updates_tx: broadcast::Sender<FusionUpdate>,
    refresh_requests_tx: broadcast::Sender<ForceRefresh>,
    stats_resets_tx: broadcast::Sender<StatsReset>,

    /// Whether the socket is currently connected.
    pub connected: Property<bool>,

    run_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

struct Outbound {
    frame_rx: mpsc::Receiver<ClientMessage>,
    audio_rx: mpsc::Receiver<ClientMessage>,
    control_rx: mpsc::UnboundedReceiver<ClientMessage>,
}

#[derive(Clone)]
struct Fanout {
    video: broadcast::Sender<VideoResult>,
    audio: broadcast::Sender<AudioResult>,
    fusion: broadcast::Sender<FusionUpdate>,
    refresh: broadcast::Sender<ForceRefresh>,
    reset: broadcast::Sender<StatsReset>,
}

impl SocketChannel {
    /// Create the channel and start connecting to the given socket URL.
    ///
    /// The connection task runs for the life of the service and keeps
    /// retrying on failure; `connected` reflects the current link state.
    pub fn new(ws_url: String) -> Self {
        let (frame_tx, frame_rx) = mpsc::channel(1);
        let (audio_tx, audio_rx) = mpsc::channel(1);
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let (video_results_tx, _) = broadcast::channel(RESULT_BUFFER);
        let (audio_results_tx, _) = broadcast::channel(RESULT_BUFFER);
        let (fusion_updates_tx, _) = broadcast::channel(RESULT_BUFFER);
        let (refresh_requests_tx, _) = broadcast::channel(8);
        let (stats_resets_tx, _) = broadcast::channel(8);

        let connected = Property::new(false);

        let outbound = Outbound {
            frame_rx,
            audio_rx,
            control_rx,
        };
        let fanout = Fanout {
            video: video_results_tx.clone(),
            audio: audio_results_tx.clone(),
            fusion: fusion_updates_tx.clone(),
            refresh: refresh_requests_tx.clone(),
            reset: stats_resets_tx.clone(),
        };

        let run_handle = tokio::spawn(run(ws_url, outbound, fanout, connected.clone()));

        Self {
            frame_tx,
            audio_tx,
            control_tx,
            video_results_tx,
            audio_results_tx,
            fusion_updates_tx,
            refresh_requests_tx,
            stats_resets_tx,
            connected,
            run_handle: Mutex::new(Some(run_handle)),
        }
    }

    /// Sender for outbound video frames.
    ///
    /// Capacity is one message; producers use `try_send` and drop the
    /// frame when the previous one has not been written yet.
    pub fn frame_sender(&self) -> mpsc::Sender<ClientMessage> {
        self.frame_tx.clone()
    }

    /// Sender for outbound audio chunks, same lossy semantics as frames.
    pub fn audio_sender(&self) -> mpsc::Sender<ClientMessage> {
        self.audio_tx.clone()
    }

    /// Ask the server to reset analyzer statistics.
    pub fn reset_stats(&self) {
        let _ = self.control_tx.send(ClientMessage::ResetStats);
    }

    /// Subscribe to video analysis results.
    pub fn video_results(&self) -> broadcast::Receiver<VideoResult> {
        self.video_results_tx.subscribe()
    }

    /// Subscribe to audio analysis results.
    pub fn audio_results(&self) -> broadcast::Receiver<AudioResult> {
        self.audio_results_tx.subscribe()
    }

    /// Subscribe to fused multimodal updates.
    pub fn fusion_updates(&self) -> broadcast::Receiver<FusionUpdate> {
        self.fusion_updates_tx.subscribe()
    }

    /// Subscribe to server-initiated refresh requests.
    pub fn refresh_requests(&self) -> broadcast::Receiver<ForceRefresh> {
        self.refresh_requests_tx.subscribe()
    }

    /// Subscribe to stats reset confirmations.
    pub fn stats_resets(&self) -> broadcast::Receiver<StatsReset> {
        self.stats_resets_tx.subscribe()
    }

    /// Shutdown the channel and stop reconnecting.
    pub fn shutdown(&self) {
        if let Some(handle) = self
            .run_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
        self.connected.set(false);
    }
}

impl Drop for SocketChannel {
    fn drop(&mut self) {
        if let Some(handle) = self
            .run_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

#[instrument(skip_all, fields(url = %url))]
async fn run(url: String, mut outbound: Outbound, fanout: Fanout, connected: Property<bool>) {
    loop {
        match serve(&url, &mut outbound, &fanout, &connected).await {
            Ok(()) => debug!("socket closed by server"),
            Err(e) => warn!(error = %e, "socket session failed"),
        }
        connected.set(false);

        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Connects and drives one session until the transport fails or closes.
async fn serve(
    url: &str,
    outbound: &mut Outbound,
    fanout: &Fanout,
    connected: &Property<bool>,
) -> Result<(), ChannelError> {
    let ws = connect(url).await?;
    debug!("socket connected");
    connected.set(true);

    let (sink, stream) = ws.split();
    session(sink, stream, outbound, fanout).await
}

pub(super) async fn connect(
    url: &str,
) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>, ChannelError> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| ChannelError::ConnectionFailed {
            url: url.to_string(),
            details: e.to_string(),
        })?;
    Ok(ws)
}

async fn session(
    mut sink: WsSink,
    mut stream: WsStream,
    outbound: &mut Outbound,
    fanout: &Fanout,
) -> Result<(), ChannelError> {
    loop {
        tokio::select! {
            Some(message) = outbound.frame_rx.recv() => {
                write(&mut sink, &message).await?;
            }
            Some(message) = outbound.audio_rx.recv() => {
                write(&mut sink, &message).await?;
            }
            Some(message) = outbound.control_rx.recv() => {
                write(&mut sink, &message).await?;
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => dispatch(&text, fanout),
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ChannelError::Transport(e.to_string())),
            }
        }
    }
}

async fn write(sink: &mut WsSink, message: &ClientMessage) -> Result<(), ChannelError> {
    let text = serde_json::to_string(message)?;
    sink.send(Message::Text(text))
        .await
        .map_err(|e| ChannelError::Transport(e.to_string()))
}

fn dispatch(text: &str, fanout: &Fanout) {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::VideoResult(result)) => {
            let _ = fanout.video.send(result);
        }
        Ok(ServerMessage::AudioResult(result)) => {
            let _ = fanout.audio.send(result);
        }
        Ok(ServerMessage::FusionUpdate(update)) => {
            let _ = fanout.fusion.send(update);
        }
        Ok(ServerMessage::ForceRefresh(refresh)) => {
            debug!("server requested refresh: {}", refresh.reason);
            let _ = fanout.refresh.send(refresh);
        }
        Ok(ServerMessage::StatsReset(reset)) => {
            let _ = fanout.reset.send(reset);
        }
        Err(e) => {
            debug!("unrecognized socket message: {e}");
        }
    }
}
