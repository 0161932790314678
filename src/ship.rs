//! Ship placements and placed ships tracked on a `BitBoard`.

use core::fmt;

use crate::bitboard::BitBoard;
use crate::board::BoardError;
use crate::config::BOARD_SIZE;

/// Occupancy grid for one 10×10 sea.
pub type Grid = BitBoard<u128, { BOARD_SIZE as usize }>;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Single-letter wire form.
    pub fn as_char(self) -> char {
        match self {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'H' => Some(Orientation::Horizontal),
            'V' => Some(Orientation::Vertical),
            _ => None,
        }
    }
}

/// Where one ship sits: its size, anchor cell and orientation.
///
/// `x` is the column and `y` the row, both 0-based. The anchor is the
/// left-most (horizontal) or top-most (vertical) segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ShipPlacement {
    pub size: u8,
    pub x: u8,
    pub y: u8,
    pub orientation: Orientation,
}

impl ShipPlacement {
    pub const fn new(size: u8, x: u8, y: u8, orientation: Orientation) -> Self {
        Self {
            size,
            x,
            y,
            orientation,
        }
    }

    /// Cells covered by the ship as `(x, y)`, anchor first. May leave the board.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (x, y) = (self.x as usize, self.y as usize);
        (0..self.size as usize).map(move |i| match self.orientation {
            Orientation::Horizontal => (x + i, y),
            Orientation::Vertical => (x, y + i),
        })
    }

    /// Whether every segment lies on the board.
    pub fn fits(&self) -> bool {
        let n = BOARD_SIZE as usize;
        if self.size == 0 {
            return false;
        }
        let (x, y, len) = (self.x as usize, self.y as usize, self.size as usize);
        match self.orientation {
            Orientation::Horizontal => x + len <= n && y < n,
            Orientation::Vertical => y + len <= n && x < n,
        }
    }
}

/// A ship on the board with its segments and the segments already hit.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    placement: ShipPlacement,
    mask: Grid,
    hits: Grid,
}

impl Ship {
    pub fn new(placement: ShipPlacement) -> Result<Self, BoardError> {
        if !placement.fits() {
            return Err(BoardError::ShipOutOfBounds);
        }
        let mut mask = Grid::new();
        for (x, y) in placement.cells() {
            mask.set(y, x)?;
        }
        Ok(Ship {
            placement,
            mask,
            hits: Grid::new(),
        })
    }

    pub fn placement(&self) -> ShipPlacement {
        self.placement
    }

    pub fn size(&self) -> u8 {
        self.placement.size
    }

    pub fn occupies(&self, x: usize, y: usize) -> bool {
        self.mask.contains(y, x)
    }

    /// Record a hit on `(x, y)`. Returns `true` if the cell belongs to this ship.
    /// Hitting the same segment twice counts once.
    pub fn hit(&mut self, x: usize, y: usize) -> bool {
        if self.occupies(x, y) {
            let _ = self.hits.set(y, x);
            true
        } else {
            false
        }
    }

    pub fn hit_count(&self) -> usize {
        self.hits.count_ones()
    }

    pub fn is_sunk(&self) -> bool {
        self.hits == self.mask
    }

    pub fn mask(&self) -> Grid {
        self.mask
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ size: {}, anchor: ({}, {}), orientation: {:?}, hits: {} }}",
            self.placement.size,
            self.placement.x,
            self.placement.y,
            self.placement.orientation,
            self.hits.count_ones(),
        )
    }
}
