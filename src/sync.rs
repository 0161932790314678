//! Turn synchronization between two peers over a [`Link`].
//!
//! Both sides run the same state machine. The attacker knows the opponent's
//! layout (exchanged up front), so it judges its own shot and sends the
//! verdict right after the `ATTACK` frame; the defender applies the shot to
//! its own board and cross-checks that verdict. A `MISS` passes the turn,
//! a `HIT` keeps it.

use core::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::SmallRng;

use crate::board::{Board, BoardError, SeaView, Shot};
use crate::config::NetConfig;
use crate::player::{Player, PlayerError};
use crate::protocol::{Message, ProtocolError};
use crate::session::Role;
use crate::transport::{ConnectionError, Link};

/// Where a match currently stands. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchState {
    Placement,
    Attacking,
    Defending,
    Won,
    Lost,
}

impl MatchState {
    pub fn is_finished(self) -> bool {
        matches!(self, MatchState::Won | MatchState::Lost)
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchState::Placement => "placement",
            MatchState::Attacking => "attacking",
            MatchState::Defending => "defending",
            MatchState::Won => "won",
            MatchState::Lost => "lost",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Won,
    Lost,
}

/// Per-side statistics of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MatchReport {
    pub outcome: Option<MatchOutcome>,
    pub shots_fired: usize,
    pub hits_scored: usize,
    pub shots_received: usize,
    pub ships_afloat: usize,
}

/// Verdict on a single attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Hit,
    Miss,
}

impl From<Shot> for Verdict {
    fn from(shot: Shot) -> Self {
        if shot.is_hit() {
            Verdict::Hit
        } else {
            Verdict::Miss
        }
    }
}

/// Which side may attack. Both peers apply every verdict to their own token,
/// so exactly one of them holds it at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnToken {
    mine: bool,
}

impl TurnToken {
    pub fn new(initiative: bool) -> Self {
        Self { mine: initiative }
    }

    pub fn holds(&self) -> bool {
        self.mine
    }

    /// A miss passes the token to the other side; a hit keeps it where it is.
    pub fn apply_verdict(&mut self, verdict: Verdict) {
        if verdict == Verdict::Miss {
            self.mine = !self.mine;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("malformed frame {frame:?}: {source}")]
    Protocol {
        frame: String,
        #[source]
        source: ProtocolError,
    },
    #[error("expected {expected}, got {got}")]
    Unexpected {
        expected: &'static str,
        got: &'static str,
    },
    #[error("peer sent an invalid layout: {0}")]
    InvalidLayout(#[source] BoardError),
    #[error("peer fleet {theirs:?} does not match ours {ours:?}")]
    FleetMismatch { ours: Vec<u8>, theirs: Vec<u8> },
    #[error("peer judged the shot at ({x}, {y}) differently")]
    Desync { x: usize, y: usize },
    #[error("not allowed while {0}")]
    OutOfTurn(MatchState),
    #[error("peer disconnected")]
    PeerDisconnected,
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Player(#[from] PlayerError),
}

/// Drives one match over `link`.
pub struct TurnSynchronizer<'a, L: Link + ?Sized> {
    link: &'a L,
    poll_interval: Duration,
    own: Board,
    enemy: Board,
    token: TurnToken,
    state: MatchState,
    shots_fired: usize,
    hits_scored: usize,
    shots_received: usize,
}

impl<'a, L: Link + ?Sized> TurnSynchronizer<'a, L> {
    /// `own` must already hold the full fleet. The host gets the first turn.
    pub fn new(link: &'a L, own: Board, role: Role, config: &NetConfig) -> Self {
        Self {
            link,
            poll_interval: config.poll_interval,
            own,
            enemy: Board::new(),
            token: TurnToken::new(role.has_initiative()),
            state: MatchState::Placement,
            shots_fired: 0,
            hits_scored: 0,
            shots_received: 0,
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn token(&self) -> TurnToken {
        self.token
    }

    pub fn own_board(&self) -> &Board {
        &self.own
    }

    /// What is known about the opponent's sea.
    pub fn enemy_view(&self) -> SeaView {
        self.enemy.sea_view()
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        match self.state {
            MatchState::Won => Some(MatchOutcome::Won),
            MatchState::Lost => Some(MatchOutcome::Lost),
            _ => None,
        }
    }

    pub fn report(&self) -> MatchReport {
        MatchReport {
            outcome: self.outcome(),
            shots_fired: self.shots_fired,
            hits_scored: self.hits_scored,
            shots_received: self.shots_received,
            ships_afloat: self.own.ships_afloat(),
        }
    }

    async fn send(&self, msg: &Message) -> Result<(), SyncError> {
        debug!("send {msg}");
        self.link.send_message(&msg.encode()).await?;
        Ok(())
    }

    /// Next known message from the peer. Unknown commands are skipped.
    async fn next_message(&self) -> Result<Message, SyncError> {
        loop {
            // Sample the link before popping so frames queued ahead of a drop
            // are still delivered.
            let connected = self.link.is_connected();
            if let Some(frame) = self.link.pop_message() {
                match Message::parse(&frame) {
                    Ok(Some(msg)) => {
                        debug!("recv {msg}");
                        return Ok(msg);
                    }
                    Ok(None) => {
                        debug!("ignoring unknown frame {frame:?}");
                        continue;
                    }
                    Err(source) => {
                        warn!("malformed frame {frame:?}: {source}");
                        return Err(SyncError::Protocol { frame, source });
                    }
                }
            }
            if !connected {
                return Err(SyncError::PeerDisconnected);
            }
            self.link.wait_for_message(self.poll_interval).await;
        }
    }

    fn finish(&mut self, state: MatchState) {
        self.state = state;
        info!(
            "match {state}: fired {}, hit {}, received {}",
            self.shots_fired, self.hits_scored, self.shots_received
        );
    }

    /// Send our layout, then wait for and validate the peer's.
    pub async fn exchange_placements(&mut self) -> Result<(), SyncError> {
        if self.state != MatchState::Placement {
            return Err(SyncError::OutOfTurn(self.state));
        }
        self.send(&Message::Ships(self.own.placements())).await?;
        let layout = match self.next_message().await? {
            Message::Ships(layout) => layout,
            Message::Win => {
                self.finish(MatchState::Lost);
                return Ok(());
            }
            other => {
                return Err(SyncError::Unexpected {
                    expected: "SHIP",
                    got: other.kind(),
                })
            }
        };
        let enemy = Board::from_placements(&layout).map_err(SyncError::InvalidLayout)?;
        let (ours, theirs) = (self.own.fleet_sizes(), enemy.fleet_sizes());
        if ours != theirs {
            return Err(SyncError::FleetMismatch { ours, theirs });
        }
        self.enemy = enemy;
        self.state = if self.token.holds() {
            MatchState::Attacking
        } else {
            MatchState::Defending
        };
        info!("layouts exchanged, {}", self.state);
        Ok(())
    }

    /// Fire at `(x, y)`: send the attack and its verdict, and `WIN` if it
    /// sank the last ship.
    pub async fn fire(&mut self, x: usize, y: usize) -> Result<Shot, SyncError> {
        if self.state != MatchState::Attacking {
            return Err(SyncError::OutOfTurn(self.state));
        }
        let shot = self.enemy.receive_attack(x, y)?;
        let verdict = Verdict::from(shot);
        // Coordinates are on the board, so they fit in a u8.
        self.send(&Message::Attack {
            x: x as u8,
            y: y as u8,
        })
        .await?;
        self.send(&Message::verdict(shot.is_hit())).await?;
        self.shots_fired += 1;
        if shot.is_hit() {
            self.hits_scored += 1;
        }
        self.token.apply_verdict(verdict);
        if self.enemy.is_defeated() {
            self.send(&Message::Win).await?;
            self.finish(MatchState::Won);
        } else if verdict == Verdict::Miss {
            self.state = MatchState::Defending;
        }
        Ok(shot)
    }

    /// Take one incoming attack and its verdict. Returns `None` when the
    /// peer announced its win instead of attacking.
    pub async fn defend_turn(&mut self) -> Result<Option<((usize, usize), Shot)>, SyncError> {
        if self.state != MatchState::Defending {
            return Err(SyncError::OutOfTurn(self.state));
        }
        let (x, y) = match self.next_message().await? {
            Message::Attack { x, y } => (x as usize, y as usize),
            Message::Win => {
                self.finish(MatchState::Lost);
                return Ok(None);
            }
            other => {
                return Err(SyncError::Unexpected {
                    expected: "ATTACK",
                    got: other.kind(),
                })
            }
        };
        let shot = self.own.receive_attack(x, y)?;
        self.shots_received += 1;
        if self.own.is_defeated() {
            self.finish(MatchState::Lost);
            return Ok(Some(((x, y), shot)));
        }
        let verdict = match self.next_message().await? {
            Message::Hit => Verdict::Hit,
            Message::Miss => Verdict::Miss,
            Message::Win => {
                self.finish(MatchState::Lost);
                return Ok(Some(((x, y), shot)));
            }
            other => {
                return Err(SyncError::Unexpected {
                    expected: "HIT or MISS",
                    got: other.kind(),
                })
            }
        };
        if verdict != Verdict::from(shot) {
            return Err(SyncError::Desync { x, y });
        }
        self.token.apply_verdict(verdict);
        if verdict == Verdict::Miss {
            self.state = MatchState::Attacking;
        }
        Ok(Some(((x, y), shot)))
    }

    /// Play until someone wins, asking `player` for targets on our turns.
    pub async fn run<P: Player + ?Sized>(
        &mut self,
        player: &mut P,
        rng: &mut SmallRng,
    ) -> Result<MatchOutcome, SyncError> {
        loop {
            match self.state {
                MatchState::Won => return Ok(MatchOutcome::Won),
                MatchState::Lost => return Ok(MatchOutcome::Lost),
                MatchState::Placement => self.exchange_placements().await?,
                MatchState::Attacking => {
                    let view = self.enemy.sea_view();
                    let (x, y) = player.select_target(rng, &self.own, &view)?;
                    let shot = self.fire(x, y).await?;
                    player.handle_attack_result((x, y), shot);
                }
                MatchState::Defending => {
                    if let Some((coord, shot)) = self.defend_turn().await? {
                        player.handle_incoming_attack(coord, shot);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_moves_only_on_miss() {
        let mut host = TurnToken::new(true);
        let mut join = TurnToken::new(false);
        for v in [Verdict::Hit, Verdict::Hit, Verdict::Miss, Verdict::Hit] {
            host.apply_verdict(v);
            join.apply_verdict(v);
            assert_ne!(host.holds(), join.holds());
        }
        assert!(join.holds());
    }
}
