use core::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a connection manager's socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Listening,
    Error,
}

impl ConnectionState {
    const fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Listening => 3,
            ConnectionState::Error => 4,
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Listening,
            4 => ConnectionState::Error,
            _ => ConnectionState::Disconnected,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Listening => "listening",
            ConnectionState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Connection state readable from any thread without a lock.
#[derive(Debug)]
pub struct SharedState(AtomicU8);

impl SharedState {
    pub const fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state.to_u8()))
    }

    pub fn load(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: ConnectionState) {
        self.0.store(state.to_u8(), Ordering::Release);
    }

    /// Store `state` and return the previous one.
    pub fn swap(&self, state: ConnectionState) -> ConnectionState {
        ConnectionState::from_u8(self.0.swap(state.to_u8(), Ordering::AcqRel))
    }

    /// Move from `current` to `next`; fails with the actual state if it was not `current`.
    pub fn transition(
        &self,
        current: ConnectionState,
        next: ConnectionState,
    ) -> Result<(), ConnectionState> {
        self.0
            .compare_exchange(
                current.to_u8(),
                next.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(ConnectionState::from_u8)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(ConnectionState::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_only_from_expected_state() {
        let s = SharedState::new(ConnectionState::Listening);
        assert_eq!(
            s.transition(ConnectionState::Connecting, ConnectionState::Connected),
            Err(ConnectionState::Listening)
        );
        assert!(s
            .transition(ConnectionState::Listening, ConnectionState::Connected)
            .is_ok());
        assert_eq!(s.swap(ConnectionState::Disconnected), ConnectionState::Connected);
        assert_eq!(s.load(), ConnectionState::Disconnected);
    }
}
