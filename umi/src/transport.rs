use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

use log::debug;

use crate::{EngineIdentity, UmiError};

const HANDSHAKE_REQUEST: &str = "umi";
const HANDSHAKE_ACK: &str = "umiok";

/// Line-oriented duplex channel to one engine process.
///
/// All calls block. The protocol is strictly request/response, so a single
/// caller drives the transport at a time and no locking is needed. An EOF
/// on the engine's stdout is the crashed-engine signal and surfaces as
/// `UmiError::EngineClosed`.
pub struct EngineTransport {
    identity: EngineIdentity,
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl EngineTransport {
    /// Spawn the engine and complete the `umi`/`umiok` handshake.
    pub fn start(path: impl AsRef<Path>) -> Result<Self, UmiError> {
        let identity = EngineIdentity::new(path.as_ref());

        let mut child = Command::new(identity.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| UmiError::Launch {
                path: identity.path().to_path_buf(),
                source,
            })?;

        let stdin = BufWriter::new(child.stdin.take().expect("child stdin is piped"));
        let stdout = BufReader::new(child.stdout.take().expect("child stdout is piped"));

        let mut transport = Self {
            identity,
            child,
            stdin,
            stdout,
        };

        transport.send(HANDSHAKE_REQUEST)?;
        match transport.read_until(HANDSHAKE_ACK) {
            Ok(_) => Ok(transport),
            Err(UmiError::EngineClosed { name }) => Err(UmiError::Handshake { name }),
            Err(err) => Err(err),
        }
    }

    pub fn identity(&self) -> &EngineIdentity {
        &self.identity
    }

    /// Write one newline-terminated line and flush it through immediately.
    pub fn send(&mut self, line: &str) -> Result<(), UmiError> {
        debug!("> {}: {}", self.identity.name(), line);

        writeln!(self.stdin, "{}", line).map_err(|source| self.io_error(source))?;
        self.stdin.flush().map_err(|source| self.io_error(source))
    }

    /// Read lines until one starts with `prefix`, returning everything read
    /// in order, the matching line included. Blank lines are skipped.
    pub fn read_until(&mut self, prefix: &str) -> Result<Vec<String>, UmiError> {
        let mut lines = Vec::new();

        loop {
            let mut line = String::new();
            let read = self
                .stdout
                .read_line(&mut line)
                .map_err(|source| self.io_error(source))?;

            if read == 0 {
                return Err(UmiError::EngineClosed {
                    name: self.identity.name().to_string(),
                });
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("< {}: {}", self.identity.name(), line);

            let matched = line.starts_with(prefix);
            lines.push(line.to_string());
            if matched {
                return Ok(lines);
            }
        }
    }

    /// Ask the engine to quit, then wait for the process to exit.
    ///
    /// Blocks until the child exits; an engine that ignores `quit` blocks
    /// forever. A closed stdin is tolerated so an already-dead engine can
    /// still be reaped.
    pub fn terminate(mut self) -> Result<ExitStatus, UmiError> {
        if self.send("quit").is_err() {
            debug!("{}: stdin already closed before quit", self.identity.name());
        }

        self.child.wait().map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> UmiError {
        UmiError::Io {
            name: self.identity.name().to_string(),
            source,
        }
    }
}
