mod error;
mod identity;
mod protocol;
mod transport;

pub use error::UmiError;
pub use identity::EngineIdentity;
pub use protocol::{
    connect, MoveProtocol, Protocol, ProtocolKind, Side, TurnProtocol, TurnReport,
    NO_MOVE_BLOCK_LEN,
};
pub use transport::EngineTransport;

/// Move token a `go`-driven engine reports when it has no legal moves.
/// Sent in place of a move, it ends the game as a forfeit.
pub const NULL_MOVE: &str = "(none)";
