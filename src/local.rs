//! Hot-seat game: both players on this machine, no network.

use log::{debug, info};
use rand::rngs::SmallRng;

use crate::board::{Board, Shot};
use crate::player::{Player, PlayerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

/// Two players sharing one process. Same turn rule as a network match:
/// a hit keeps the turn, a miss passes it.
pub struct LocalGame {
    players: [Box<dyn Player>; 2],
    boards: [Board; 2],
    turn: Seat,
    shots: [usize; 2],
    winner: Option<Seat>,
}

impl LocalGame {
    pub fn new(first: Box<dyn Player>, second: Box<dyn Player>) -> Self {
        Self {
            players: [first, second],
            boards: [Board::new(), Board::new()],
            turn: Seat::First,
            shots: [0; 2],
            winner: None,
        }
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn board(&self, seat: Seat) -> &Board {
        &self.boards[seat.index()]
    }

    pub fn shots(&self, seat: Seat) -> usize {
        self.shots[seat.index()]
    }

    /// Let both players lay out their fleets.
    pub fn setup(&mut self, rng: &mut SmallRng) -> Result<(), PlayerError> {
        for seat in [Seat::First, Seat::Second] {
            let i = seat.index();
            self.boards[i] = self.players[i].place_ships(rng)?;
        }
        Ok(())
    }

    /// One shot by the player whose turn it is. Returns the winner once the
    /// game is over.
    pub fn play_turn(&mut self, rng: &mut SmallRng) -> Result<Option<Seat>, PlayerError> {
        if let Some(winner) = self.winner {
            return Ok(Some(winner));
        }
        let (me, them) = (self.turn.index(), self.turn.other().index());
        let view = self.boards[them].sea_view();
        let (x, y) = self.players[me].select_target(rng, &self.boards[me], &view)?;
        let shot = self.boards[them].receive_attack(x, y)?;
        self.shots[me] += 1;
        debug!("{:?} fires at ({x}, {y}): {shot:?}", self.turn);
        self.players[me].handle_attack_result((x, y), shot);
        self.players[them].handle_incoming_attack((x, y), shot);

        if self.boards[them].is_defeated() {
            info!("{:?} wins after {} shots", self.turn, self.shots[me]);
            self.winner = Some(self.turn);
            return Ok(self.winner);
        }
        if shot == Shot::Miss {
            self.turn = self.turn.other();
        }
        Ok(None)
    }

    /// Place fleets and play to the end.
    pub fn run(&mut self, rng: &mut SmallRng) -> Result<Seat, PlayerError> {
        self.setup(rng)?;
        loop {
            if let Some(winner) = self.play_turn(rng)? {
                return Ok(winner);
            }
        }
    }
}
