//! A game session: one connection, either hosted or joined.

use core::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use log::info;
use tokio::sync::mpsc;

use crate::config::NetConfig;
use crate::transport::{
    ConnectionError, ConnectionEvent, ConnectionManager, ConnectionState, Link,
};

/// Which side of the connection this peer set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Host,
    Join,
}

impl Role {
    /// The host attacks first.
    pub fn has_initiative(self) -> bool {
        self == Role::Host
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Hosting,
    Joining,
    Connected,
    Error,
}

impl From<ConnectionState> for SessionState {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Disconnected => SessionState::Idle,
            ConnectionState::Listening => SessionState::Hosting,
            ConnectionState::Connecting => SessionState::Joining,
            ConnectionState::Connected => SessionState::Connected,
            ConnectionState::Error => SessionState::Error,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Hosting => "hosting",
            SessionState::Joining => "joining",
            SessionState::Connected => "connected",
            SessionState::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is busy ({0})")]
    Busy(SessionState),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("connection failed")]
    Failed,
    #[error("connection closed before a peer arrived")]
    Closed,
}

/// Thin layer over a [`ConnectionManager`] that remembers whether this peer
/// hosted or joined.
#[derive(Debug, Default)]
pub struct Session {
    manager: ConnectionManager,
    role: Option<Role>,
}

impl Session {
    /// A new idle session. Opens nothing.
    pub fn new(config: NetConfig) -> Self {
        Self {
            manager: ConnectionManager::new(config),
            role: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.manager.state().into()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn config(&self) -> &NetConfig {
        self.manager.config()
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Idle => Ok(()),
            other => Err(SessionError::Busy(other)),
        }
    }

    /// Start listening for one peer on `port`. Returns once listening; use
    /// [`wait_until_connected`](Self::wait_until_connected) to wait for the peer.
    pub async fn host_game(&mut self, port: u16) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.manager.start_listening(port).await?;
        self.role = Some(Role::Host);
        info!("hosting on port {port}");
        Ok(())
    }

    /// Connect to a hosting peer.
    pub async fn join_game(&mut self, ip: &str, port: u16) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.manager.connect_to_peer(ip, port).await?;
        self.role = Some(Role::Join);
        info!("joined {ip}:{port}");
        Ok(())
    }

    /// Suspend until a peer is attached.
    pub async fn wait_until_connected(&self) -> Result<(), SessionError> {
        let poll = self.config().poll_interval;
        loop {
            match self.state() {
                SessionState::Connected => return Ok(()),
                SessionState::Error => return Err(SessionError::Failed),
                SessionState::Idle => return Err(SessionError::Closed),
                SessionState::Hosting | SessionState::Joining => tokio::time::sleep(poll).await,
            }
        }
    }

    pub async fn disconnect(&mut self) {
        self.manager.disconnect().await;
        self.role = None;
    }

    pub async fn send_message(&self, text: &str) -> Result<(), ConnectionError> {
        self.manager.send_message(text).await
    }

    pub fn has_messages(&self) -> bool {
        self.manager.has_messages()
    }

    pub fn pop_message(&self) -> Option<String> {
        self.manager.pop_message()
    }

    pub async fn wait_for_message(&self, timeout: Duration) {
        self.manager.wait_for_message(timeout).await
    }

    pub fn peer_info(&self) -> Option<SocketAddr> {
        self.manager.peer_info()
    }

    pub fn local_info(&self) -> Option<SocketAddr> {
        self.manager.local_info()
    }

    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ConnectionEvent>> {
        self.manager.take_events()
    }
}

#[async_trait::async_trait]
impl Link for Session {
    async fn send_message(&self, text: &str) -> Result<(), ConnectionError> {
        Session::send_message(self, text).await
    }

    fn has_messages(&self) -> bool {
        Session::has_messages(self)
    }

    fn pop_message(&self) -> Option<String> {
        Session::pop_message(self)
    }

    fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    async fn wait_for_message(&self, timeout: Duration) {
        Session::wait_for_message(self, timeout).await
    }
}
