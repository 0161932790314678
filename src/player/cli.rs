use std::io::{self, BufRead, Cursor, Stdin, Stdout, Write};

use rand::rngs::SmallRng;

use crate::board::{Board, SeaView, Shot};
use crate::config::FLEET;
use crate::ship::{Orientation, ShipPlacement};
use crate::ui::{coord_label, parse_coord, render_enemy, render_own};

use super::{Player, PlayerError};

/// Where a console player reads its lines from.
///
/// Readers never buffer past the line they return, so several players can
/// take turns on one source.
pub trait LineSource: Send {
    /// Same contract as [`BufRead::read_line`]: `Ok(0)` means end of input.
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

/// Goes through the process-wide stdin buffer, shared by every `Stdin` handle.
impl LineSource for Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]> + Send> LineSource for Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        (**self).read_line(buf)
    }
}

/// Interactive console player. Reads commands line by line from `input`
/// and writes prompts and boards to `output`.
pub struct CliPlayer<R, W> {
    input: R,
    output: W,
    name: String,
}

impl CliPlayer<Stdin, Stdout> {
    pub fn stdio(name: impl Into<String>) -> Self {
        Self::new(io::stdin(), io::stdout(), name)
    }
}

impl<R: LineSource, W: Write> CliPlayer<R, W> {
    pub fn new(input: R, output: W, name: impl Into<String>) -> Self {
        Self {
            input,
            output,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt(&mut self, text: &str) -> Result<String, PlayerError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PlayerError::Quit);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
            return Err(PlayerError::Quit);
        }
        Ok(line.to_string())
    }

    fn place_manually(&mut self, rng: &mut SmallRng) -> Result<Board, PlayerError> {
        let mut board = Board::new();
        writeln!(
            self.output,
            "Enter the bow cell and orientation, e.g. `A5 H` or `C2 V`. Empty line places randomly."
        )?;
        for (i, &size) in FLEET.iter().enumerate() {
            loop {
                write!(self.output, "\n{}", render_own(&board))?;
                let line = self.prompt(&format!(
                    "Ship {}/{} (length {size}): ",
                    i + 1,
                    FLEET.len()
                ))?;
                let placement = if line.is_empty() {
                    board.random_placement(rng, size)?
                } else {
                    match parse_placement(&line, size) {
                        Ok(p) => p,
                        Err(msg) => {
                            writeln!(self.output, "{msg}")?;
                            continue;
                        }
                    }
                };
                match board.place(placement) {
                    Ok(()) => break,
                    Err(e) => writeln!(self.output, "Cannot place ship there: {e}")?,
                }
            }
        }
        write!(self.output, "\n{}", render_own(&board))?;
        Ok(board)
    }
}

fn parse_placement(line: &str, size: u8) -> Result<ShipPlacement, String> {
    let mut parts = line.split_whitespace();
    let (x, y) = parse_coord(parts.next().unwrap_or_default())?;
    let orientation = match parts.next() {
        None => Orientation::Horizontal,
        Some(o) => {
            let mut chars = o.chars();
            match (chars.next().map(|c| c.to_ascii_uppercase()), chars.next()) {
                (Some(c), None) => Orientation::from_char(c)
                    .ok_or_else(|| format!("invalid orientation '{o}', expected H or V"))?,
                _ => return Err(format!("invalid orientation '{o}', expected H or V")),
            }
        }
    };
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected '{extra}'"));
    }
    Ok(ShipPlacement::new(size, x as u8, y as u8, orientation))
}

impl<R: LineSource, W: Write + Send> Player for CliPlayer<R, W> {
    fn place_ships(&mut self, rng: &mut SmallRng) -> Result<Board, PlayerError> {
        writeln!(self.output, "\n=== {}: ship placement ===", self.name)?;
        let answer = self.prompt("Place ships manually? [y/N]: ")?;
        if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
            return self.place_manually(rng);
        }
        let board = Board::auto_place_standard(rng)?;
        write!(self.output, "{}", render_own(&board))?;
        Ok(board)
    }

    fn select_target(
        &mut self,
        _rng: &mut SmallRng,
        own: &Board,
        enemy: &SeaView,
    ) -> Result<(usize, usize), PlayerError> {
        writeln!(self.output, "\n=== {}: your turn ===", self.name)?;
        writeln!(self.output, "Opponent's sea:")?;
        write!(self.output, "{}", render_enemy(enemy))?;
        writeln!(self.output, "Your sea:")?;
        write!(self.output, "{}", render_own(own))?;
        loop {
            let line = self.prompt("Target (e.g. B7): ")?;
            match parse_coord(&line) {
                Ok((x, y)) if enemy.is_attacked(x, y) => {
                    writeln!(self.output, "{} was already attacked", coord_label(x, y))?;
                }
                Ok(coord) => return Ok(coord),
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }

    fn handle_attack_result(&mut self, (x, y): (usize, usize), shot: Shot) {
        let label = coord_label(x, y);
        let _ = match shot {
            Shot::Miss => writeln!(self.output, "{label}: miss"),
            Shot::Hit => writeln!(self.output, "{label}: hit! Fire again."),
            Shot::Sunk { size } => writeln!(self.output, "{label}: sunk a ship of length {size}!"),
        };
    }

    fn handle_incoming_attack(&mut self, (x, y): (usize, usize), shot: Shot) {
        let label = coord_label(x, y);
        let _ = match shot {
            Shot::Miss => writeln!(self.output, "Opponent fired at {label}: miss"),
            Shot::Hit => writeln!(self.output, "Opponent fired at {label}: hit"),
            Shot::Sunk { size } => writeln!(
                self.output,
                "Opponent fired at {label}: your ship of length {size} sank"
            ),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn placement_parsing() {
        assert_eq!(
            parse_placement("c2 v", 3),
            Ok(ShipPlacement::new(3, 2, 1, Orientation::Vertical))
        );
        assert_eq!(
            parse_placement("A1", 1),
            Ok(ShipPlacement::new(1, 0, 0, Orientation::Horizontal))
        );
        assert!(parse_placement("A1 X", 2).is_err());
        assert!(parse_placement("A1 H extra", 2).is_err());
    }

    #[test]
    fn rejects_repeated_target_then_accepts_new_one() {
        let mut enemy = Board::new();
        enemy.receive_attack(1, 6).unwrap();
        let input = Cursor::new(b"B7\nZ9\nC3\n".to_vec());
        let mut player = CliPlayer::new(input, Vec::new(), "tester");
        let mut rng = SmallRng::seed_from_u64(0);
        let target = player
            .select_target(&mut rng, &Board::new(), &enemy.sea_view())
            .unwrap();
        assert_eq!(target, (2, 2));
        let out = String::from_utf8(player.into_output()).unwrap();
        assert!(out.contains("B7 was already attacked"));
    }

    #[test]
    fn players_sharing_input_take_one_line_each() {
        let mut input = Cursor::new(b"A1\nB2\nC3\n".to_vec());
        let view = Board::new().sea_view();
        let mut rng = SmallRng::seed_from_u64(0);
        let first = CliPlayer::new(&mut input, Vec::new(), "first")
            .select_target(&mut rng, &Board::new(), &view)
            .unwrap();
        let second = CliPlayer::new(&mut input, Vec::new(), "second")
            .select_target(&mut rng, &Board::new(), &view)
            .unwrap();
        assert_eq!((first, second), ((0, 0), (1, 1)));
        let mut rest = String::new();
        LineSource::read_line(&mut input, &mut rest).unwrap();
        assert_eq!(rest, "C3\n");
    }

    #[test]
    fn console_players_read_the_shared_stdin_handle() {
        let a = CliPlayer::stdio("a");
        let b = CliPlayer::stdio("b");
        let _: (&Stdin, &Stdin) = (&a.input, &b.input);
    }

    #[test]
    fn end_of_input_means_quit() {
        let mut player = CliPlayer::new(Cursor::new(Vec::new()), Vec::new(), "tester");
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            player.place_ships(&mut rng),
            Err(PlayerError::Quit)
        ));
    }
}
