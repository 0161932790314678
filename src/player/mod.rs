//! Who decides where ships go and where to fire.
//!
//! - [`AutoPlayer`]: random search that finishes off wounded ships
//! - [`CliPlayer`]: interactive console player

use rand::rngs::SmallRng;

use crate::board::{Board, BoardError, SeaView, Shot};

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("console I/O failed: {0}")]
    Input(#[from] std::io::Error),
    #[error("player quit")]
    Quit,
    #[error("no cell left to attack")]
    NoTarget,
}

/// Interface implemented by the different player kinds.
pub trait Player: Send {
    /// Produce a complete board with the standard fleet.
    fn place_ships(&mut self, rng: &mut SmallRng) -> Result<Board, PlayerError>;

    /// Choose the next cell `(x, y)` to fire at. `enemy` is what is known
    /// about the opponent's sea.
    fn select_target(
        &mut self,
        rng: &mut SmallRng,
        own: &Board,
        enemy: &SeaView,
    ) -> Result<(usize, usize), PlayerError>;

    /// Result of this player's own shot.
    fn handle_attack_result(&mut self, _coord: (usize, usize), _shot: Shot) {}

    /// Result of the opponent's shot against this player's board.
    fn handle_incoming_attack(&mut self, _coord: (usize, usize), _shot: Shot) {}
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn place_ships(&mut self, rng: &mut SmallRng) -> Result<Board, PlayerError> {
        (**self).place_ships(rng)
    }

    fn select_target(
        &mut self,
        rng: &mut SmallRng,
        own: &Board,
        enemy: &SeaView,
    ) -> Result<(usize, usize), PlayerError> {
        (**self).select_target(rng, own, enemy)
    }

    fn handle_attack_result(&mut self, coord: (usize, usize), shot: Shot) {
        (**self).handle_attack_result(coord, shot)
    }

    fn handle_incoming_attack(&mut self, coord: (usize, usize), shot: Shot) {
        (**self).handle_incoming_attack(coord, shot)
    }
}

pub mod auto;
pub use auto::AutoPlayer;

pub mod cli;
pub use cli::{CliPlayer, LineSource};
