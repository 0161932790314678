use rand::rngs::SmallRng;
use rand::Rng;

use crate::board::{Board, SeaView};
use crate::config::BOARD_SIZE;
use crate::ship::Grid;

use super::{Player, PlayerError};

/// Fires at random untried cells, but finishes a wounded ship before
/// searching again. Cells next to sunk ships are skipped since ships never touch.
#[derive(Debug, Default)]
pub struct AutoPlayer;

impl AutoPlayer {
    pub fn new() -> Self {
        Self
    }
}

const N: usize = BOARD_SIZE as usize;

fn open_cells(
    enemy: &SeaView,
    blocked: &Grid,
    pick: impl Fn(usize, usize) -> bool,
) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    for y in 0..N {
        for x in 0..N {
            if !enemy.is_attacked(x, y) && !blocked.contains(y, x) && pick(x, y) {
                cells.push((x, y));
            }
        }
    }
    cells
}

/// Untried cells continuing the wounded ship. A wounded line only grows
/// along its own axis.
fn finishing_moves(enemy: &SeaView, wounded: &Grid, blocked: &Grid) -> Vec<(usize, usize)> {
    let cells: Vec<(usize, usize)> = wounded.iter_set_bits().map(|(r, c)| (c, r)).collect();
    let horizontal = cells.len() > 1 && cells.iter().all(|&(_, y)| y == cells[0].1);
    let vertical = cells.len() > 1 && cells.iter().all(|&(x, _)| x == cells[0].0);
    open_cells(enemy, blocked, |x, y| {
        cells.iter().any(|&(wx, wy)| {
            let dx = x.abs_diff(wx);
            let dy = y.abs_diff(wy);
            match (horizontal, vertical) {
                (true, _) => dy == 0 && dx == 1,
                (_, true) => dx == 0 && dy == 1,
                _ => dx + dy == 1,
            }
        })
    })
}

impl Player for AutoPlayer {
    fn place_ships(&mut self, rng: &mut SmallRng) -> Result<Board, PlayerError> {
        Ok(Board::auto_place_standard(rng)?)
    }

    fn select_target(
        &mut self,
        rng: &mut SmallRng,
        _own: &Board,
        enemy: &SeaView,
    ) -> Result<(usize, usize), PlayerError> {
        let blocked = enemy.sunk.halo();
        let wounded = enemy.wounded();
        let mut candidates = if wounded.is_empty() {
            Vec::new()
        } else {
            finishing_moves(enemy, &wounded, &blocked)
        };
        if candidates.is_empty() {
            candidates = open_cells(enemy, &blocked, |_, _| true);
        }
        if candidates.is_empty() {
            candidates = open_cells(enemy, &Grid::new(), |_, _| true);
        }
        if candidates.is_empty() {
            return Err(PlayerError::NoTarget);
        }
        Ok(candidates[rng.random_range(0..candidates.len())])
    }
}
