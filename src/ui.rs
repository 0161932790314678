//! Text rendering of boards and console coordinate handling.
//!
//! Columns are letters `A..J` (the `x` coordinate), rows are numbers `1..10`
//! (the `y` coordinate plus one).

use core::fmt::Write;

use crate::board::{Board, SeaView};
use crate::config::BOARD_SIZE;

const HIT: char = 'X';
const MISS: char = 'o';
const SHIP: char = '#';
const WATER: char = '.';

/// `(x, y)` as a console label such as `B7`.
pub fn coord_label(x: usize, y: usize) -> String {
    format!("{}{}", (b'A' + x as u8) as char, y + 1)
}

/// Parse a console label such as `b7` into `(x, y)`.
pub fn parse_coord(input: &str) -> Result<(usize, usize), String> {
    let input = input.trim();
    let mut chars = input.chars();
    let col_ch = chars
        .next()
        .ok_or_else(|| "empty input".to_string())?
        .to_ascii_uppercase();
    if !col_ch.is_ascii_alphabetic() {
        return Err(format!("invalid column '{col_ch}', expected a letter A-J"));
    }
    let x = (col_ch as u8 - b'A') as usize;
    if x >= BOARD_SIZE as usize {
        return Err(format!("column '{col_ch}' is off the board (A-J)"));
    }
    let row_str = chars.as_str();
    let row: usize = row_str
        .parse()
        .map_err(|_| format!("invalid row '{row_str}', expected a number 1-10"))?;
    if row == 0 || row > BOARD_SIZE as usize {
        return Err(format!("row {row} is off the board (1-10)"));
    }
    Ok((x, row - 1))
}

fn render(out: &mut String, cell: impl Fn(usize, usize) -> char) {
    let n = BOARD_SIZE as usize;
    let _ = writeln!(out, "    ╔════════════════════════╗");
    let _ = write!(out, "    ║   ");
    for x in 0..n {
        let _ = write!(out, " {}", (b'A' + x as u8) as char);
    }
    let _ = writeln!(out, " ║");
    let _ = writeln!(out, "    ╠════════════════════════╣");
    for y in 0..n {
        let _ = write!(out, "    ║ {:2}", y + 1);
        for x in 0..n {
            let _ = write!(out, " {}", cell(x, y));
        }
        let _ = writeln!(out, " ║");
    }
    let _ = writeln!(out, "    ╚════════════════════════╝");
}

/// The owner's view: ships are visible.
pub fn render_own(board: &Board) -> String {
    let (hits, misses, occupied) = (board.hits(), board.misses(), board.occupied());
    let mut out = String::new();
    render(&mut out, |x, y| {
        if hits.contains(y, x) {
            HIT
        } else if misses.contains(y, x) {
            MISS
        } else if occupied.contains(y, x) {
            SHIP
        } else {
            WATER
        }
    });
    let _ = writeln!(
        out,
        "    Legend: {SHIP}=Ship  {HIT}=Hit  {MISS}=Miss  {WATER}=Water   ({} afloat)",
        board.ships_afloat()
    );
    out
}

/// The opponent's view: only shot results are visible.
pub fn render_enemy(view: &SeaView) -> String {
    let mut out = String::new();
    render(&mut out, |x, y| {
        if view.hits.contains(y, x) {
            HIT
        } else if view.misses.contains(y, x) {
            MISS
        } else {
            WATER
        }
    });
    let _ = writeln!(out, "    Legend: {HIT}=Hit  {MISS}=Miss  {WATER}=Unknown");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ship::{Orientation, ShipPlacement};

    #[test]
    fn coordinates_round_trip_through_labels() {
        assert_eq!(parse_coord("a1"), Ok((0, 0)));
        assert_eq!(parse_coord("J10"), Ok((9, 9)));
        assert_eq!(coord_label(1, 6), "B7");
        assert!(parse_coord("K1").is_err());
        assert!(parse_coord("A0").is_err());
        assert!(parse_coord("A11").is_err());
        assert!(parse_coord("").is_err());
    }

    #[test]
    fn enemy_view_hides_ships() {
        let mut board =
            Board::from_placements(&[ShipPlacement::new(2, 0, 0, Orientation::Horizontal)])
                .unwrap();
        board.receive_attack(0, 0).unwrap();
        board.receive_attack(5, 5).unwrap();
        let own = render_own(&board);
        let enemy = render_enemy(&board.sea_view());
        assert!(own.contains(SHIP));
        assert!(!enemy.contains(SHIP));
        assert!(enemy.contains(HIT) && enemy.contains(MISS));
    }
}
