/// WebSocket channel implementation
pub mod core;
/// Channel error types
pub mod error;
/// Wire messages exchanged over the socket
pub mod messages;

#[cfg(test)]
mod tests;

pub use core::SocketChannel;
pub use error::ChannelError;
pub use messages::*;
