use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::{EngineIdentity, EngineTransport, UmiError, NULL_MOVE};

/// A turn block of this many lines or fewer carries no move lines, which
/// means the mover had no legal moves and forfeits the game.
pub const NO_MOVE_BLOCK_LEN: usize = 2;

/// The two per-game sides. Yellow always moves first; which engine holds
/// which side changes between games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Yellow,
    Blue,
}

impl FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("yellow") {
            Ok(Side::Yellow)
        } else if s.eq_ignore_ascii_case("blue") {
            Ok(Side::Blue)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Yellow => write!(f, "yellow"),
            Side::Blue => write!(f, "blue"),
        }
    }
}

/// Everything one `take_turn` exchange produced.
///
/// `block` is relayed to the opponent verbatim and appended to the game
/// log; `info` holds the diagnostic lines that preceded the block.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub block: Vec<String>,
    pub info: Vec<String>,
    pub declared_winner: Option<Side>,
    pub no_moves: bool,
}

/// Engine-facing verbs, independent of which wire variant the engine
/// speaks. An `Err` from `take_turn` is the engine-panic signal and is
/// scored by the caller as a forfeit.
pub trait Protocol {
    fn identity(&self) -> &EngineIdentity;

    /// `startpos` or a FEN payload.
    fn set_position(&mut self, position: &str) -> Result<(), UmiError>;

    fn take_turn(&mut self, time_control: &str) -> Result<TurnReport, UmiError>;

    /// Replay the opponent's block lines verbatim so this engine's position
    /// tracking stays synchronized.
    fn relay(&mut self, lines: &[String]) -> Result<(), UmiError>;

    fn shutdown(self: Box<Self>) -> Result<(), UmiError>;
}

/// Wire variant an engine speaks, selected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    /// `play` answered by a `turn`..`endturn` block.
    Turn,
    /// `go` answered by a single `bestmove` line.
    Move,
}

/// Launch an engine and wrap it in the requested protocol adapter.
pub fn connect(kind: ProtocolKind, path: &Path) -> Result<Box<dyn Protocol>, UmiError> {
    let transport = EngineTransport::start(path)?;

    Ok(match kind {
        ProtocolKind::Turn => Box::new(TurnProtocol::new(transport)),
        ProtocolKind::Move => Box::new(MoveProtocol::new(transport)),
    })
}

/// Adapter for engines that answer `play` with a multi-line turn block.
pub struct TurnProtocol {
    transport: EngineTransport,
}

impl TurnProtocol {
    pub fn new(transport: EngineTransport) -> Self {
        Self { transport }
    }
}

impl Protocol for TurnProtocol {
    fn identity(&self) -> &EngineIdentity {
        self.transport.identity()
    }

    fn set_position(&mut self, position: &str) -> Result<(), UmiError> {
        send_position(&mut self.transport, position)
    }

    fn take_turn(&mut self, time_control: &str) -> Result<TurnReport, UmiError> {
        self.transport.send(&format!("play {}", time_control))?;

        let until_turn = self.transport.read_until("turn")?;
        let until_end = self.transport.read_until("endturn")?;

        Ok(split_turn_response(until_turn, until_end))
    }

    fn relay(&mut self, lines: &[String]) -> Result<(), UmiError> {
        for line in lines {
            self.transport.send(line)?;
        }
        Ok(())
    }

    fn shutdown(self: Box<Self>) -> Result<(), UmiError> {
        let name = self.transport.identity().name().to_string();
        let status = self.transport.terminate()?;
        debug!("{} exited with {}", name, status);
        Ok(())
    }
}

/// Adapter for engines that answer `go` with a single `bestmove` line.
pub struct MoveProtocol {
    transport: EngineTransport,
}

impl MoveProtocol {
    pub fn new(transport: EngineTransport) -> Self {
        Self { transport }
    }
}

impl Protocol for MoveProtocol {
    fn identity(&self) -> &EngineIdentity {
        self.transport.identity()
    }

    fn set_position(&mut self, position: &str) -> Result<(), UmiError> {
        send_position(&mut self.transport, position)
    }

    fn take_turn(&mut self, time_control: &str) -> Result<TurnReport, UmiError> {
        self.transport.send(&format!("go {}", time_control))?;

        let until_best = self.transport.read_until("bestmove")?;

        Ok(split_move_response(until_best))
    }

    fn relay(&mut self, lines: &[String]) -> Result<(), UmiError> {
        for line in lines {
            self.transport.send(line)?;
        }
        Ok(())
    }

    fn shutdown(self: Box<Self>) -> Result<(), UmiError> {
        let name = self.transport.identity().name().to_string();
        let status = self.transport.terminate()?;
        debug!("{} exited with {}", name, status);
        Ok(())
    }
}

fn send_position(transport: &mut EngineTransport, position: &str) -> Result<(), UmiError> {
    if position == "startpos" {
        transport.send("position startpos")
    } else {
        transport.send(&format!("position fen {}", position))
    }
}

/// Split a `play` response into info lines and the turn block.
///
/// `until_turn` ends with the `turn` header, `until_end` with the
/// `endturn` line, as read off the transport.
fn split_turn_response(until_turn: Vec<String>, until_end: Vec<String>) -> TurnReport {
    let mut info = until_turn;
    let header = info.pop().unwrap_or_default();

    let mut block = Vec::with_capacity(until_end.len() + 1);
    block.push(header);
    block.extend(until_end);

    let declared_winner = block.last().and_then(|line| declared_winner_of(line));
    let no_moves = block.len() <= NO_MOVE_BLOCK_LEN;

    TurnReport {
        block,
        info,
        declared_winner,
        no_moves,
    }
}

/// Side named after the `winner` token, if the line carries one.
fn declared_winner_of(line: &str) -> Option<Side> {
    let mut tokens = line.split_whitespace();
    tokens.find(|token| *token == "winner")?;
    tokens.next()?.parse().ok()
}

/// Split a `go` response into info lines and the bare best-move token.
fn split_move_response(until_best: Vec<String>) -> TurnReport {
    let mut info = until_best;
    let bestmove = info.pop().unwrap_or_default();

    let token = bestmove_token(&bestmove);
    let no_moves = token.map_or(true, |t| t == NULL_MOVE);
    let block = token
        .map(|t| vec![t.to_string()])
        .unwrap_or_default();

    TurnReport {
        block,
        info,
        declared_winner: None,
        no_moves,
    }
}

fn bestmove_token(line: &str) -> Option<&str> {
    line.split_whitespace().nth(1)
}
