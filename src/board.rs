//! One player's sea: the fleet, and every shot fired at it.

use core::fmt;
use rand::Rng;

use crate::bitboard::BitBoardError;
use crate::config::{BOARD_SIZE, FLEET};
use crate::ship::{Grid, Orientation, Ship, ShipPlacement};

const PLACEMENT_ATTEMPTS: usize = 100;
const LAYOUT_RESTARTS: usize = 64;

/// Errors returned by Board operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    BitBoard(#[from] BitBoardError),
    #[error("ship does not fit on the board")]
    ShipOutOfBounds,
    #[error("ship overlaps another ship")]
    ShipOverlaps,
    #[error("ship touches another ship")]
    ShipsTouching,
    #[error("cell ({x}, {y}) is outside the board")]
    OutOfBounds { x: usize, y: usize },
    #[error("cell ({x}, {y}) was already attacked")]
    AlreadyAttacked { x: usize, y: usize },
    #[error("unable to place ship of size {0}")]
    UnableToPlaceShip(u8),
}

/// Outcome of one attack against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    Miss,
    Hit,
    /// The hit finished off a ship of this size.
    Sunk { size: u8 },
}

impl Shot {
    pub fn is_hit(self) -> bool {
        !matches!(self, Shot::Miss)
    }
}

/// What an opponent is allowed to know about a board: where shots landed,
/// and the outline of ships already sunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeaView {
    pub hits: Grid,
    pub misses: Grid,
    pub sunk: Grid,
}

impl SeaView {
    pub fn is_attacked(&self, x: usize, y: usize) -> bool {
        self.hits.contains(y, x) || self.misses.contains(y, x)
    }

    /// Hit cells that belong to ships still afloat.
    pub fn wounded(&self) -> Grid {
        self.hits & !self.sunk
    }
}

#[derive(Clone, Default)]
pub struct Board {
    ships: Vec<Ship>,
    occupied: Grid,
    hits: Grid,
    misses: Grid,
}

impl Board {
    /// Empty sea, no ships.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board from a layout, enforcing the usual placement rules.
    pub fn from_placements(placements: &[ShipPlacement]) -> Result<Self, BoardError> {
        let mut board = Board::new();
        for p in placements {
            board.place(*p)?;
        }
        Ok(board)
    }

    /// Random layout of `fleet`. Restarts from an empty sea when a ship cannot be fitted.
    pub fn auto_place<R: Rng>(rng: &mut R, fleet: &[u8]) -> Result<Self, BoardError> {
        'restart: for _ in 0..LAYOUT_RESTARTS {
            let mut board = Board::new();
            for &size in fleet {
                match board.random_placement(rng, size) {
                    Ok(p) => board.place(p)?,
                    Err(BoardError::UnableToPlaceShip(_)) => continue 'restart,
                    Err(e) => return Err(e),
                }
            }
            return Ok(board);
        }
        Err(BoardError::UnableToPlaceShip(fleet.first().copied().unwrap_or(0)))
    }

    /// Random layout of the standard fleet.
    pub fn auto_place_standard<R: Rng>(rng: &mut R) -> Result<Self, BoardError> {
        Self::auto_place(rng, &FLEET)
    }

    /// Check a placement against the current fleet without placing it.
    pub fn check_placement(&self, placement: &ShipPlacement) -> Result<Ship, BoardError> {
        let ship = Ship::new(*placement)?;
        if !(self.occupied & ship.mask()).is_empty() {
            return Err(BoardError::ShipOverlaps);
        }
        if !(self.occupied.halo() & ship.mask()).is_empty() {
            return Err(BoardError::ShipsTouching);
        }
        Ok(ship)
    }

    /// Add a ship. Ships may neither overlap nor touch, diagonals included.
    pub fn place(&mut self, placement: ShipPlacement) -> Result<(), BoardError> {
        let ship = self.check_placement(&placement)?;
        self.occupied |= ship.mask();
        self.ships.push(ship);
        Ok(())
    }

    /// A random legal placement for a ship of `size`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        size: u8,
    ) -> Result<ShipPlacement, BoardError> {
        let n = BOARD_SIZE;
        if size == 0 || size > n {
            return Err(BoardError::ShipOutOfBounds);
        }
        for _ in 0..PLACEMENT_ATTEMPTS {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_x, max_y) = match orientation {
                Orientation::Horizontal => (n - size, n - 1),
                Orientation::Vertical => (n - 1, n - size),
            };
            let p = ShipPlacement::new(
                size,
                rng.random_range(0..=max_x),
                rng.random_range(0..=max_y),
                orientation,
            );
            if self.check_placement(&p).is_ok() {
                return Ok(p);
            }
        }
        Err(BoardError::UnableToPlaceShip(size))
    }

    /// Fire at `(x, y)` (column, row).
    pub fn receive_attack(&mut self, x: usize, y: usize) -> Result<Shot, BoardError> {
        let n = BOARD_SIZE as usize;
        if x >= n || y >= n {
            return Err(BoardError::OutOfBounds { x, y });
        }
        if self.is_attacked(x, y) {
            return Err(BoardError::AlreadyAttacked { x, y });
        }
        if let Some(ship) = self.ships.iter_mut().find(|s| s.occupies(x, y)) {
            ship.hit(x, y);
            self.hits.set(y, x)?;
            if ship.is_sunk() {
                return Ok(Shot::Sunk { size: ship.size() });
            }
            return Ok(Shot::Hit);
        }
        self.misses.set(y, x)?;
        Ok(Shot::Miss)
    }

    pub fn is_attacked(&self, x: usize, y: usize) -> bool {
        self.hits.contains(y, x) || self.misses.contains(y, x)
    }

    /// `true` once a non-empty fleet has every ship sunk.
    pub fn is_defeated(&self) -> bool {
        !self.ships.is_empty() && self.ships.iter().all(Ship::is_sunk)
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ships_afloat(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_sunk()).count()
    }

    /// The layout in placement order, ready for the wire.
    pub fn placements(&self) -> Vec<ShipPlacement> {
        self.ships.iter().map(Ship::placement).collect()
    }

    /// Sorted ship sizes of the fleet.
    pub fn fleet_sizes(&self) -> Vec<u8> {
        let mut sizes: Vec<u8> = self.ships.iter().map(Ship::size).collect();
        sizes.sort_unstable();
        sizes
    }

    /// The board as the opponent sees it.
    pub fn sea_view(&self) -> SeaView {
        let mut sunk = Grid::new();
        for ship in self.ships.iter().filter(|s| s.is_sunk()) {
            sunk |= ship.mask();
        }
        SeaView {
            hits: self.hits,
            misses: self.misses,
            sunk,
        }
    }

    pub fn occupied(&self) -> Grid {
        self.occupied
    }

    pub fn hits(&self) -> Grid {
        self.hits
    }

    pub fn misses(&self) -> Grid {
        self.misses
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("ships", &self.ships)
            .field("hits", &self.hits.count_ones())
            .field("misses", &self.misses.count_ones())
            .finish()
    }
}
