use std::net::SocketAddr;
use std::time::Duration;

pub mod connection;
pub mod in_memory;
pub mod queue;
pub mod state;

pub use connection::{ConnectionError, ConnectionManager};
pub use in_memory::InMemoryLink;
pub use queue::InboundQueue;
pub use state::ConnectionState;

/// Both ends of an established connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerDescriptor {
    pub peer: SocketAddr,
    pub local: SocketAddr,
}

/// Notifications published by a [`ConnectionManager`] to its subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected(PeerDescriptor),
    Disconnected,
    MessageReceived(String),
}

/// A bidirectional frame link the game logic can run over.
#[async_trait::async_trait]
pub trait Link: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<(), ConnectionError>;
    fn has_messages(&self) -> bool;
    fn pop_message(&self) -> Option<String>;
    fn is_connected(&self) -> bool;
    /// Suspend until a frame may be available or `timeout` elapses.
    async fn wait_for_message(&self, timeout: Duration);
}
