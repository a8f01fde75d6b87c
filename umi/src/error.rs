use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Faults raised while driving an engine process.
///
/// `Launch` and `Handshake` can only happen before the first game and are
/// fatal to the whole scrimmage. `EngineClosed` and `Io` surface mid-game
/// and are scored as a forfeit by the caller.
#[derive(Debug, Error)]
pub enum UmiError {
    #[error("failed to launch engine {}: {source}", .path.display())]
    Launch { path: PathBuf, source: io::Error },

    #[error("engine {name} exited before acknowledging the umi handshake")]
    Handshake { name: String },

    #[error("engine {name} closed its output stream")]
    EngineClosed { name: String },

    #[error("i/o failure talking to engine {name}: {source}")]
    Io { name: String, source: io::Error },
}
