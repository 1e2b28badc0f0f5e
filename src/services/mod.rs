/// Listening analytics client
pub mod analytics;
/// HTTP collaborator client and wire types
pub mod api;
/// Attention adaptation engine
pub mod attention;
/// Camera and microphone capture engine
pub mod capture;
/// WebSocket duplex channel
pub mod channel;
/// Common utilities and abstractions for services
pub mod common;
/// Inference result renderer
pub mod inference;
/// Playback state store and sync controller
pub mod player;

pub use analytics::AnalyticsService;
pub use attention::AdaptationEngine;
pub use capture::CaptureEngine;
pub use channel::SocketChannel;
pub use inference::ResultRenderer;
pub use player::PlayerService;
