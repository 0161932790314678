pub mod bitboard;
pub mod board;
pub mod config;
pub mod local;
pub mod logging;
pub mod player;
pub mod protocol;
pub mod session;
pub mod ship;
pub mod sync;
pub mod transport;
pub mod ui;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::*;
pub use config::*;
pub use local::*;
pub use logging::init_logging;
pub use player::{AutoPlayer, CliPlayer, Player, PlayerError};
pub use protocol::*;
pub use session::*;
pub use ship::*;
pub use sync::*;
pub use transport::{
    ConnectionError, ConnectionEvent, ConnectionManager, ConnectionState, InMemoryLink, Link,
    PeerDescriptor,
};
