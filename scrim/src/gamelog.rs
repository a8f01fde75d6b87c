use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use umi::TurnReport;

use crate::summary::Winner;

/// Append-only record of one game: each turn block verbatim, followed by a
/// bracketed rendering of its info lines, closed with the winner line.
/// Never rewritten.
pub struct GameLog {
    writer: BufWriter<File>,
}

impl GameLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn append_turn(&mut self, report: &TurnReport) -> io::Result<()> {
        for line in &report.block {
            writeln!(self.writer, "{}", line)?;
        }
        if !report.info.is_empty() {
            writeln!(self.writer, "[{}]", report.info.join("; "))?;
        }
        Ok(())
    }

    pub fn finish(mut self, winner: &Winner) -> io::Result<()> {
        writeln!(self.writer, "Winner: {}", winner)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(block: &[&str], info: &[&str]) -> TurnReport {
        TurnReport {
            block: block.iter().map(|s| s.to_string()).collect(),
            info: info.iter().map(|s| s.to_string()).collect(),
            declared_winner: None,
            no_moves: false,
        }
    }

    #[test]
    fn log_holds_blocks_info_and_the_winner() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("games").join("a-vs-b-1.log");

        let mut log = GameLog::create(&path).unwrap();
        log.append_turn(&report(
            &["turn 1", "move sw a1 b2", "endturn"],
            &["info nps 9000"],
        ))
        .unwrap();
        log.append_turn(&report(&["turn 2", "move nw c3 d4", "endturn"], &[]))
            .unwrap();
        log.finish(&Winner::Engine("a".to_string())).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(
            raw,
            "turn 1\nmove sw a1 b2\nendturn\n[info nps 9000]\n\
             turn 2\nmove nw c3 d4\nendturn\nWinner: a\n"
        );
    }

    #[test]
    fn draws_are_recorded_by_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("draw.log");

        let log = GameLog::create(&path).unwrap();
        log.finish(&Winner::Draw).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Winner: draw\n");
    }
}
