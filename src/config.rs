use std::time::Duration;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 10;

/// Ship sizes of the standard fleet, placed in this order.
pub const FLEET: [u8; NUM_SHIPS] = [4, 3, 3, 2, 2, 2, 1, 1, 1, 1];

/// Total number of ship segments in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 4 + 3 + 3 + 2 + 2 + 2 + 1 + 1 + 1 + 1;

/// Port used by the CLI when none is given.
pub const DEFAULT_PORT: u16 = 9000;

/// Upper bound on how long a waiting consumer sleeps before re-checking the link.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Size of the fixed read buffer used by the receive task.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Longest frame accepted before the peer is considered faulty (64 KiB).
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Tunables for a connection manager and the turn synchronizer driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetConfig {
    pub poll_interval: Duration,
    pub recv_buffer_size: usize,
    pub max_frame_len: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            recv_buffer_size: RECV_BUFFER_SIZE,
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

impl NetConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
