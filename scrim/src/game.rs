use std::io;
use std::mem;

use log::{debug, info};
use umi::{Protocol, Side};

use crate::gamelog::GameLog;
use crate::summary::Winner;

/// Turn count past which a game is scored as a draw. A coarse safety valve
/// against games that never end; repetition and material draws are not
/// detected.
pub const MAX_TURNS: u32 = 200;

/// Drives a single game between two seats.
///
/// `yellow` moves first, `blue` answers, and every turn block is relayed to
/// the waiting seat before the next `take_turn` is issued, so neither
/// engine ever sees position updates out of order.
pub struct GameRunner<'a> {
    yellow: &'a mut dyn Protocol,
    blue: &'a mut dyn Protocol,
}

impl<'a> GameRunner<'a> {
    pub fn new(yellow: &'a mut dyn Protocol, blue: &'a mut dyn Protocol) -> Self {
        Self { yellow, blue }
    }

    /// Play one game to completion and return the winner.
    ///
    /// Engine faults resolve the game as a forfeit; only log-file failures
    /// propagate as errors.
    pub fn run(self, time_control: &str, start: &str, mut log: GameLog) -> io::Result<Winner> {
        let yellow_name = self.yellow.identity().name().to_string();
        let blue_name = self.blue.identity().name().to_string();

        // A seat whose streams are already gone forfeits before the first
        // turn, same as a mid-game panic.
        if let Err(err) = self.yellow.set_position(start) {
            info!("{} forfeits at setup: {}", yellow_name, err);
            return Self::finish(log, Winner::Engine(blue_name));
        }
        if let Err(err) = self.blue.set_position(start) {
            info!("{} forfeits at setup: {}", blue_name, err);
            return Self::finish(log, Winner::Engine(yellow_name));
        }

        let (mut mover, mut waiter) = (self.yellow, self.blue);
        let mut turn: u32 = 1;

        let winner = loop {
            let report = match mover.take_turn(time_control) {
                Ok(report) => report,
                Err(err) => {
                    info!("{} forfeits: {}", mover.identity().name(), err);
                    break Winner::Engine(waiter.identity().name().to_string());
                }
            };

            if let Some(side) = report.declared_winner {
                break Winner::Engine(match side {
                    Side::Yellow => yellow_name.clone(),
                    Side::Blue => blue_name.clone(),
                });
            }

            if report.no_moves {
                debug!(
                    "{} has no legal moves on turn {}",
                    mover.identity().name(),
                    turn
                );
                break Winner::Engine(waiter.identity().name().to_string());
            }

            // A failed relay means the waiting engine is dead.
            if let Err(err) = waiter.relay(&report.block) {
                info!("{} forfeits during relay: {}", waiter.identity().name(), err);
                break Winner::Engine(mover.identity().name().to_string());
            }

            log.append_turn(&report)?;

            mem::swap(&mut mover, &mut waiter);
            turn += 1;

            if turn > MAX_TURNS {
                break Winner::Draw;
            }
        };

        Self::finish(log, winner)
    }

    fn finish(log: GameLog, winner: Winner) -> io::Result<Winner> {
        log.finish(&winner)?;
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use umi::{EngineIdentity, TurnReport, UmiError};

    use super::*;

    struct FakeSeat {
        identity: EngineIdentity,
        turns: VecDeque<Result<TurnReport, UmiError>>,
        relayed: Vec<String>,
        positions: Vec<String>,
    }

    impl FakeSeat {
        fn new(name: &str) -> Self {
            Self {
                identity: EngineIdentity::new(name),
                turns: VecDeque::new(),
                relayed: Vec::new(),
                positions: Vec::new(),
            }
        }

        fn closed(&self) -> UmiError {
            UmiError::EngineClosed {
                name: self.identity.name().to_string(),
            }
        }

        fn queue_moves(&mut self, count: usize) {
            for i in 0..count {
                self.turns.push_back(Ok(TurnReport {
                    block: vec![
                        format!("turn {}", i + 1),
                        "move sw a1 b2".to_string(),
                        "endturn".to_string(),
                    ],
                    info: vec![],
                    declared_winner: None,
                    no_moves: false,
                }));
            }
        }
    }

    impl Protocol for FakeSeat {
        fn identity(&self) -> &EngineIdentity {
            &self.identity
        }

        fn set_position(&mut self, position: &str) -> Result<(), UmiError> {
            self.positions.push(position.to_string());
            Ok(())
        }

        fn take_turn(&mut self, _time_control: &str) -> Result<TurnReport, UmiError> {
            match self.turns.pop_front() {
                Some(result) => result,
                None => Err(self.closed()),
            }
        }

        fn relay(&mut self, lines: &[String]) -> Result<(), UmiError> {
            self.relayed.extend(lines.iter().cloned());
            Ok(())
        }

        fn shutdown(self: Box<Self>) -> Result<(), UmiError> {
            Ok(())
        }
    }

    fn temp_log(dir: &tempfile::TempDir, name: &str) -> GameLog {
        GameLog::create(&dir.path().join(name)).unwrap()
    }

    #[test]
    fn panic_on_the_first_turn_forfeits_to_the_opponent() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut yellow = FakeSeat::new("crasher");
        let mut blue = FakeSeat::new("survivor");
        yellow.turns.push_back(Err(yellow.closed()));

        let winner = GameRunner::new(&mut yellow, &mut blue)
            .run("movetime 100", "startpos", temp_log(&dir, "g.log"))
            .unwrap();

        assert_eq!(winner, Winner::Engine("survivor".to_string()));
    }

    #[test]
    fn a_short_block_forfeits_to_the_opponent() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut yellow = FakeSeat::new("stuck");
        let mut blue = FakeSeat::new("opponent");
        yellow.turns.push_back(Ok(TurnReport {
            block: vec!["turn 1".to_string(), "endturn".to_string()],
            info: vec![],
            declared_winner: None,
            no_moves: true,
        }));

        let winner = GameRunner::new(&mut yellow, &mut blue)
            .run("movetime 100", "startpos", temp_log(&dir, "g.log"))
            .unwrap();

        assert_eq!(winner, Winner::Engine("opponent".to_string()));
    }

    #[test]
    fn a_declared_side_maps_to_that_seats_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut yellow = FakeSeat::new("mover");
        let mut blue = FakeSeat::new("defender");
        // The mover reports that blue won, so the win goes to the seat
        // holding blue, not to the engine that produced the block.
        yellow.turns.push_back(Ok(TurnReport {
            block: vec![
                "turn 1".to_string(),
                "move sw a1 b2".to_string(),
                "endturn winner blue".to_string(),
            ],
            info: vec![],
            declared_winner: Some(Side::Blue),
            no_moves: false,
        }));

        let winner = GameRunner::new(&mut yellow, &mut blue)
            .run("movetime 100", "startpos", temp_log(&dir, "g.log"))
            .unwrap();

        assert_eq!(winner, Winner::Engine("defender".to_string()));
    }

    #[test]
    fn blocks_are_relayed_to_the_waiting_seat_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut yellow = FakeSeat::new("first");
        let mut blue = FakeSeat::new("second");
        yellow.queue_moves(2);
        blue.queue_moves(1);

        // first plays, second plays, first plays, second panics.
        let winner = GameRunner::new(&mut yellow, &mut blue)
            .run("movetime 100", "startpos", temp_log(&dir, "g.log"))
            .unwrap();

        assert_eq!(winner, Winner::Engine("first".to_string()));
        assert_eq!(blue.relayed.len(), 6, "two blocks of three lines each");
        assert_eq!(yellow.relayed.len(), 3, "one block of three lines");
        assert_eq!(blue.relayed[0], "turn 1");
        assert_eq!(blue.relayed[3], "turn 2");
    }

    #[test]
    fn both_seats_receive_the_starting_position() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut yellow = FakeSeat::new("a");
        let mut blue = FakeSeat::new("b");
        yellow.turns.push_back(Err(yellow.closed()));

        GameRunner::new(&mut yellow, &mut blue)
            .run("movetime 100", "3|3 0|0 f|I|i 0 1", temp_log(&dir, "g.log"))
            .unwrap();

        assert_eq!(yellow.positions, vec!["3|3 0|0 f|I|i 0 1".to_string()]);
        assert_eq!(blue.positions, vec!["3|3 0|0 f|I|i 0 1".to_string()]);
    }

    #[test]
    fn hitting_the_turn_cap_is_a_draw() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut yellow = FakeSeat::new("a");
        let mut blue = FakeSeat::new("b");
        yellow.queue_moves(MAX_TURNS as usize);
        blue.queue_moves(MAX_TURNS as usize);

        let winner = GameRunner::new(&mut yellow, &mut blue)
            .run("movetime 100", "startpos", temp_log(&dir, "g.log"))
            .unwrap();

        assert_eq!(winner, Winner::Draw);
    }

    #[test]
    fn the_log_ends_with_the_winner_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut yellow = FakeSeat::new("a");
        let mut blue = FakeSeat::new("b");
        yellow.queue_moves(1);

        GameRunner::new(&mut yellow, &mut blue)
            .run("movetime 100", "startpos", temp_log(&dir, "g.log"))
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("g.log")).unwrap();
        assert!(raw.contains("turn 1\n"));
        assert!(raw.ends_with("Winner: a\n"));
    }
}
