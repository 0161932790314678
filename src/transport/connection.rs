//! TCP connection manager: one listening or connected socket, one background
//! task, and a queue of complete inbound frames.
//!
//! The host side runs accept and receive as two phases of the same task; the
//! joining side connects on the caller's task and then spawns the receive
//! task. Frames are newline-delimited text.

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::NetConfig;
use crate::transport::queue::InboundQueue;
use crate::transport::state::{ConnectionState, SharedState};
use crate::transport::{ConnectionEvent, Link, PeerDescriptor};

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("operation not allowed while {0}")]
    InvalidState(ConnectionState),
    #[error("`{0}` is not an IP address")]
    Address(String),
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("refusing to send frame: {0}")]
    InvalidFrame(&'static str),
}

/// Check that `text` can travel as exactly one frame.
pub fn validate_frame(text: &str, max_len: usize) -> Result<(), ConnectionError> {
    if text.is_empty() {
        return Err(ConnectionError::InvalidFrame("frame is empty"));
    }
    if text.contains(['\n', '\r']) {
        return Err(ConnectionError::InvalidFrame("frame contains a line break"));
    }
    if text.len() > max_len {
        return Err(ConnectionError::InvalidFrame("frame is too long"));
    }
    Ok(())
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the manager and its background task.
#[derive(Debug, Default)]
struct Shared {
    state: SharedState,
    inbound: InboundQueue,
    peer: Mutex<Option<PeerDescriptor>>,
    listen_addr: Mutex<Option<SocketAddr>>,
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    events: Mutex<Option<mpsc::UnboundedSender<ConnectionEvent>>>,
}

impl Shared {
    fn emit(&self, event: ConnectionEvent) {
        let mut events = lock(&self.events);
        if let Some(tx) = events.as_ref() {
            if tx.send(event).is_err() {
                // Subscriber went away; stop producing.
                *events = None;
            }
        }
    }

    /// Split `stream`, publish the peer, and move `from` → `Connected`.
    async fn establish(
        &self,
        stream: TcpStream,
        from: ConnectionState,
    ) -> std::io::Result<OwnedReadHalf> {
        let peer = stream.peer_addr()?;
        let local = stream.local_addr()?;
        let _ = stream.set_nodelay(true);
        let (reader, writer) = stream.into_split();
        *self.writer.lock().await = Some(writer);
        let descriptor = PeerDescriptor { peer, local };
        *lock(&self.peer) = Some(descriptor);
        if let Err(now) = self.state.transition(from, ConnectionState::Connected) {
            // disconnect() won the race; leave the socket to be dropped.
            self.writer.lock().await.take();
            lock(&self.peer).take();
            return Err(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                format!("connection abandoned while {now}"),
            ));
        }
        info!("connected: local {local}, peer {peer}");
        self.emit(ConnectionEvent::Connected(descriptor));
        self.inbound.wake();
        Ok(reader)
    }

    /// The peer went away or the stream failed. Runs at most once per connection.
    async fn peer_dropped(&self) {
        let prev = self.state.swap(ConnectionState::Disconnected);
        if prev == ConnectionState::Disconnected {
            return;
        }
        info!("peer disconnected");
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }
        lock(&self.peer).take();
        lock(&self.listen_addr).take();
        self.emit(ConnectionEvent::Disconnected);
        self.inbound.wake();
    }
}

/// Owns one socket and the background task reading from it.
#[derive(Debug)]
pub struct ConnectionManager {
    config: NetConfig,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(NetConfig::default())
    }
}

impl ConnectionManager {
    pub fn new(config: NetConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::default()),
            task: None,
            shutdown: None,
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state.load()
    }

    fn ensure_disconnected(&self) -> Result<(), ConnectionError> {
        match self.state() {
            ConnectionState::Disconnected => Ok(()),
            other => Err(ConnectionError::InvalidState(other)),
        }
    }

    /// Subscribe to connection events. Only the first call gets a receiver.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ConnectionEvent>> {
        let mut events = lock(&self.shared.events);
        if events.is_some() {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *events = Some(tx);
        Some(rx)
    }

    /// Listen on `0.0.0.0:port` for a single peer. Port 0 picks a free port;
    /// [`local_info`](Self::local_info) reports the one chosen.
    pub async fn start_listening(&mut self, port: u16) -> Result<(), ConnectionError> {
        self.ensure_disconnected()?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = match bind_single(addr) {
            Ok(listener) => listener,
            Err(source) => {
                warn!("listen on {addr} failed: {source}");
                self.shared.state.store(ConnectionState::Error);
                return Err(ConnectionError::Bind { addr, source });
            }
        };
        let bound = listener.local_addr().unwrap_or(addr);
        *lock(&self.shared.listen_addr) = Some(bound);
        self.shared.state.store(ConnectionState::Listening);
        info!("listening on {bound}");

        let (tx, rx) = watch::channel(false);
        self.shutdown = Some(tx);
        let shared = Arc::clone(&self.shared);
        let config = self.config;
        self.task = Some(tokio::spawn(async move {
            accept_then_receive(shared, listener, rx, config).await;
        }));
        Ok(())
    }

    /// Connect to `ip:port`. Suspends the caller until the connect succeeds or fails.
    pub async fn connect_to_peer(&mut self, ip: &str, port: u16) -> Result<(), ConnectionError> {
        self.ensure_disconnected()?;
        let Ok(addr) = ip.trim().parse::<IpAddr>() else {
            self.shared.state.store(ConnectionState::Error);
            return Err(ConnectionError::Address(ip.to_string()));
        };
        self.shared.state.store(ConnectionState::Connecting);
        debug!("connecting to {addr}:{port}");
        let stream = match TcpStream::connect((addr, port)).await {
            Ok(stream) => stream,
            Err(source) => {
                warn!("connect to {ip}:{port} failed: {source}");
                self.shared.state.store(ConnectionState::Error);
                return Err(ConnectionError::Connect {
                    addr: format!("{ip}:{port}"),
                    source,
                });
            }
        };
        let reader = match self
            .shared
            .establish(stream, ConnectionState::Connecting)
            .await
        {
            Ok(reader) => reader,
            Err(source) => {
                self.shared.state.store(ConnectionState::Error);
                return Err(ConnectionError::Connect {
                    addr: format!("{ip}:{port}"),
                    source,
                });
            }
        };

        let (tx, rx) = watch::channel(false);
        self.shutdown = Some(tx);
        let shared = Arc::clone(&self.shared);
        let config = self.config;
        self.task = Some(tokio::spawn(async move {
            receive_loop(shared, reader, rx, config).await;
        }));
        Ok(())
    }

    /// Queue `text` as one frame. Silently dropped unless connected; write
    /// failures only show up later as a disconnect.
    pub async fn send_message(&self, text: &str) -> Result<(), ConnectionError> {
        validate_frame(text, self.config.max_frame_len)?;
        let state = self.state();
        if state != ConnectionState::Connected {
            debug!("dropping frame while {state}: {text:?}");
            return Ok(());
        }
        let mut writer = self.shared.writer.lock().await;
        let Some(writer) = writer.as_mut() else {
            debug!("dropping frame, no writer: {text:?}");
            return Ok(());
        };
        let mut frame = String::with_capacity(text.len() + 1);
        frame.push_str(text);
        frame.push('\n');
        trace!("-> {text}");
        if let Err(e) = writer.write_all(frame.as_bytes()).await {
            warn!("send failed: {e}");
        }
        Ok(())
    }

    pub fn has_messages(&self) -> bool {
        !self.shared.inbound.is_empty()
    }

    /// Next queued frame, or `None` when nothing is available. Never blocks.
    pub fn pop_message(&self) -> Option<String> {
        self.shared.inbound.pop()
    }

    /// Suspend until a frame is queued, the link comes up or drops, or
    /// `timeout` elapses. Returns at once when there is no link at all.
    pub async fn wait_for_message(&self, timeout: Duration) {
        if self.has_messages() {
            return;
        }
        match self.state() {
            ConnectionState::Disconnected | ConnectionState::Error => {}
            _ => self.shared.inbound.wait(timeout).await,
        }
    }

    /// Remote endpoint of the established connection.
    pub fn peer_info(&self) -> Option<SocketAddr> {
        lock(&self.shared.peer).map(|p| p.peer)
    }

    /// Local endpoint: the connected socket once a peer is attached,
    /// otherwise the listening address.
    pub fn local_info(&self) -> Option<SocketAddr> {
        lock(&self.shared.peer)
            .map(|p| p.local)
            .or_else(|| *lock(&self.shared.listen_addr))
    }

    /// Tear everything down. Safe to call repeatedly and from any state.
    pub async fn disconnect(&mut self) {
        let prev = self.shared.state.swap(ConnectionState::Disconnected);
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(mut writer) = self.shared.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("background task ended abnormally: {e}");
            }
        }
        if prev != ConnectionState::Disconnected {
            info!("disconnected (was {prev})");
            self.shared.emit(ConnectionEvent::Disconnected);
        }
        lock(&self.shared.peer).take();
        lock(&self.shared.listen_addr).take();
        let dropped = self.shared.inbound.drain();
        if dropped > 0 {
            debug!("discarded {dropped} unread frame(s)");
        }
        self.shared.inbound.wake();
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.shared.state.store(ConnectionState::Disconnected);
    }
}

#[async_trait::async_trait]
impl Link for ConnectionManager {
    async fn send_message(&self, text: &str) -> Result<(), ConnectionError> {
        ConnectionManager::send_message(self, text).await
    }

    fn has_messages(&self) -> bool {
        ConnectionManager::has_messages(self)
    }

    fn pop_message(&self) -> Option<String> {
        ConnectionManager::pop_message(self)
    }

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    async fn wait_for_message(&self, timeout: Duration) {
        ConnectionManager::wait_for_message(self, timeout).await
    }
}

/// Bind with a backlog of one: this game never has more than one peer.
fn bind_single(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1)
}

async fn accept_then_receive(
    shared: Arc<Shared>,
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
    config: NetConfig,
) {
    let accepted = tokio::select! {
        res = listener.accept() => res,
        _ = shutdown.changed() => {
            debug!("accept cancelled");
            return;
        }
    };
    // One peer only; stop accepting.
    drop(listener);
    let stream = match accepted {
        Ok((stream, addr)) => {
            debug!("accepted {addr}");
            stream
        }
        Err(e) => {
            warn!("accept failed: {e}");
            let _ = shared
                .state
                .transition(ConnectionState::Listening, ConnectionState::Error);
            shared.inbound.wake();
            return;
        }
    };
    let reader = match shared.establish(stream, ConnectionState::Listening).await {
        Ok(reader) => reader,
        Err(e) => {
            debug!("{e}");
            return;
        }
    };
    receive_loop(shared, reader, shutdown, config).await;
}

async fn receive_loop(
    shared: Arc<Shared>,
    mut reader: OwnedReadHalf,
    mut shutdown: watch::Receiver<bool>,
    config: NetConfig,
) {
    let mut buf = vec![0u8; config.recv_buffer_size.max(1)];
    let mut partial: Vec<u8> = Vec::new();

    while shared.state.load() == ConnectionState::Connected {
        let read = tokio::select! {
            res = reader.read(&mut buf) => res,
            _ = shutdown.changed() => {
                debug!("receive cancelled");
                return;
            }
        };
        let n = match read {
            Ok(0) => {
                debug!("peer closed the stream");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                debug!("read failed: {e}");
                break;
            }
        };
        partial.extend_from_slice(&buf[..n]);
        for frame in split_frames(&mut partial) {
            trace!("<- {frame}");
            shared.inbound.push(frame.clone());
            shared.emit(ConnectionEvent::MessageReceived(frame));
        }
        if partial.len() > config.max_frame_len {
            warn!(
                "peer sent {} bytes without a delimiter; dropping connection",
                partial.len()
            );
            break;
        }
    }
    shared.peer_dropped().await;
}

/// Remove every complete frame from the front of `partial`. A trailing `\r`
/// is stripped and blank lines are skipped.
pub(crate) fn split_frames(partial: &mut Vec<u8>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Some(pos) = partial.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = partial.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }
        frames.push(String::from_utf8_lossy(&line).into_owned());
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_split_across_reads() {
        let mut partial = b"SHIP 1 0 0 H\nATT".to_vec();
        assert_eq!(split_frames(&mut partial), vec!["SHIP 1 0 0 H".to_string()]);
        partial.extend_from_slice(b"ACK 3 4\r\n\nMISS\n");
        assert_eq!(
            split_frames(&mut partial),
            vec!["ATTACK 3 4".to_string(), "MISS".to_string()]
        );
        assert!(partial.is_empty());
    }

    #[test]
    fn frame_validation() {
        assert!(validate_frame("HIT", 16).is_ok());
        assert!(matches!(
            validate_frame("", 16),
            Err(ConnectionError::InvalidFrame(_))
        ));
        assert!(matches!(
            validate_frame("HIT\nWIN", 16),
            Err(ConnectionError::InvalidFrame(_))
        ));
        assert!(matches!(
            validate_frame("ATTACK 1 2 3 4 5 6 7", 16),
            Err(ConnectionError::InvalidFrame(_))
        ));
    }
}
