//! Line protocol spoken between two peers once the link is up.
//!
//! Every frame is one line of space-separated ASCII tokens:
//!
//! ```text
//! SHIP <size> <x> <y> <H|V> [SHIP ...]   full layout in one frame
//! ATTACK <x> <y>
//! HIT
//! MISS
//! WIN
//! ```
//!
//! Frames never contain the newline delimiter; the connection layer refuses
//! to send one that does.

use core::fmt;

use crate::config::BOARD_SIZE;
use crate::ship::{Orientation, ShipPlacement};

const SHIP: &str = "SHIP";
const ATTACK: &str = "ATTACK";
const HIT: &str = "HIT";
const MISS: &str = "MISS";
const WIN: &str = "WIN";

/// One protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The sender's whole fleet.
    Ships(Vec<ShipPlacement>),
    /// Fire at column `x`, row `y`.
    Attack { x: u8, y: u8 },
    /// Verdict on the preceding attack: the attacker keeps the turn.
    Hit,
    /// Verdict on the preceding attack: the turn passes.
    Miss,
    /// The sender has sunk every opposing ship.
    Win,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,
    #[error("{command}: missing field `{field}`")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },
    #[error("{command}: `{value}` is not a valid {field}")]
    InvalidNumber {
        command: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("SHIP: `{0}` is not an orientation (expected H or V)")]
    InvalidOrientation(String),
    #[error("{command}: {field} {value} is off the board")]
    OutOfBounds {
        command: &'static str,
        field: &'static str,
        value: u8,
    },
    #[error("{command}: unexpected token `{token}`")]
    UnexpectedToken {
        command: &'static str,
        token: String,
    },
    #[error("SHIP: layout is empty")]
    EmptyLayout,
}

impl Message {
    /// Verdict frame for the outcome of an attack.
    pub fn verdict(hit: bool) -> Self {
        if hit {
            Message::Hit
        } else {
            Message::Miss
        }
    }

    /// Wire form, without the trailing delimiter.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parse one frame.
    ///
    /// Frames starting with an unknown command yield `Ok(None)` so newer peers
    /// can add commands without breaking older ones.
    pub fn parse(frame: &str) -> Result<Option<Message>, ProtocolError> {
        let mut tokens = frame.split_whitespace().peekable();
        let command = tokens.peek().copied().ok_or(ProtocolError::Empty)?;
        let msg = match command {
            SHIP => Message::Ships(parse_layout(&mut tokens)?),
            ATTACK => {
                tokens.next();
                let x = coord(ATTACK, "x", tokens.next())?;
                let y = coord(ATTACK, "y", tokens.next())?;
                no_trailing(ATTACK, &mut tokens)?;
                Message::Attack { x, y }
            }
            HIT | MISS | WIN => {
                tokens.next();
                let (name, msg) = match command {
                    HIT => (HIT, Message::Hit),
                    MISS => (MISS, Message::Miss),
                    _ => (WIN, Message::Win),
                };
                no_trailing(name, &mut tokens)?;
                msg
            }
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }

    /// Short name used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Ships(_) => SHIP,
            Message::Attack { .. } => ATTACK,
            Message::Hit => HIT,
            Message::Miss => MISS,
            Message::Win => WIN,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Ships(layout) => {
                for (i, p) in layout.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(
                        f,
                        "{SHIP} {} {} {} {}",
                        p.size,
                        p.x,
                        p.y,
                        p.orientation.as_char()
                    )?;
                }
                Ok(())
            }
            Message::Attack { x, y } => write!(f, "{ATTACK} {x} {y}"),
            Message::Hit => f.write_str(HIT),
            Message::Miss => f.write_str(MISS),
            Message::Win => f.write_str(WIN),
        }
    }
}

fn parse_layout<'a, I>(tokens: &mut I) -> Result<Vec<ShipPlacement>, ProtocolError>
where
    I: Iterator<Item = &'a str>,
{
    let mut layout = Vec::new();
    while let Some(tok) = tokens.next() {
        if tok != SHIP {
            return Err(ProtocolError::UnexpectedToken {
                command: SHIP,
                token: tok.to_string(),
            });
        }
        let size = number(SHIP, "size", tokens.next())?;
        if size == 0 || size > BOARD_SIZE {
            return Err(ProtocolError::OutOfBounds {
                command: SHIP,
                field: "size",
                value: size,
            });
        }
        let x = coord(SHIP, "x", tokens.next())?;
        let y = coord(SHIP, "y", tokens.next())?;
        let orient = tokens.next().ok_or(ProtocolError::MissingField {
            command: SHIP,
            field: "orientation",
        })?;
        let orientation = single_char(orient)
            .and_then(Orientation::from_char)
            .ok_or_else(|| ProtocolError::InvalidOrientation(orient.to_string()))?;
        layout.push(ShipPlacement::new(size, x, y, orientation));
    }
    if layout.is_empty() {
        return Err(ProtocolError::EmptyLayout);
    }
    Ok(layout)
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn number(
    command: &'static str,
    field: &'static str,
    token: Option<&str>,
) -> Result<u8, ProtocolError> {
    let token = token.ok_or(ProtocolError::MissingField { command, field })?;
    token.parse().map_err(|_| ProtocolError::InvalidNumber {
        command,
        field,
        value: token.to_string(),
    })
}

fn coord(
    command: &'static str,
    field: &'static str,
    token: Option<&str>,
) -> Result<u8, ProtocolError> {
    let value = number(command, field, token)?;
    if value >= BOARD_SIZE {
        return Err(ProtocolError::OutOfBounds {
            command,
            field,
            value,
        });
    }
    Ok(value)
}

fn no_trailing<'a, I>(command: &'static str, tokens: &mut I) -> Result<(), ProtocolError>
where
    I: Iterator<Item = &'a str>,
{
    match tokens.next() {
        Some(token) => Err(ProtocolError::UnexpectedToken {
            command,
            token: token.to_string(),
        }),
        None => Ok(()),
    }
}
