use std::error::Error;
use std::fs;

use log::info;
use umi::{connect, Protocol, ProtocolKind};

use crate::config::{ScrimConfig, ScrimPaths};
use crate::game::GameRunner;
use crate::gamelog::GameLog;
use crate::ratings::RatingBook;
use crate::summary::{MatchScore, Winner};

/// Seat A opens on even game indices so first-move advantage evens out
/// across the scrimmage.
pub const fn seat_a_opens(game: u32) -> bool {
    game % 2 == 0
}

/// Runs the configured number of games between one engine pair, tallies
/// the score, applies rating updates, and tears the engines down.
///
/// Both handles live for the whole scrimmage. An engine that dies mid-run
/// is not restarted; every later game it appears in resolves immediately
/// as a forfeit against it.
pub struct ScrimController {
    seat_a: Box<dyn Protocol>,
    seat_b: Box<dyn Protocol>,
    ratings: RatingBook,
    num_games: u32,
    time_control: String,
    start_fen: String,
    rating_updates: bool,
}

impl ScrimController {
    /// Launch both engines and load the rating book. Launch and handshake
    /// failures abort the scrimmage before any game starts.
    pub fn new(config: &ScrimConfig, paths: &ScrimPaths) -> Result<Self, Box<dyn Error>> {
        let kind = ProtocolKind::from(config.settings.protocol);

        let seat_a = connect(kind, &paths.engine_path(&config.yellow.path))?;
        let seat_b = connect(kind, &paths.engine_path(&config.blue.path))?;

        let ratings = RatingBook::load(&paths.ratings_file)?;
        fs::create_dir_all(&paths.match_dir)?;

        info!(
            "Starting scrimmage: {} vs {}",
            seat_a.identity().name(),
            seat_b.identity().name()
        );
        info!(
            "{} rating: {}",
            seat_a.identity().name(),
            ratings.rating(seat_a.identity().name())
        );
        info!(
            "{} rating: {}",
            seat_b.identity().name(),
            ratings.rating(seat_b.identity().name())
        );

        Ok(Self {
            seat_a,
            seat_b,
            ratings,
            num_games: config.settings.num_games,
            time_control: config.settings.time_control.clone(),
            start_fen: config.settings.start_fen.clone(),
            rating_updates: config.settings.rating_updates,
        })
    }

    pub fn run(mut self, paths: &ScrimPaths) -> Result<MatchScore, Box<dyn Error>> {
        let name_a = self.seat_a.identity().name().to_string();
        let name_b = self.seat_b.identity().name().to_string();

        let mut score = MatchScore::new(&name_a, &name_b);

        for game in 0..self.num_games {
            info!("--- Game {} of {} ---", game + 1, self.num_games);

            let log = GameLog::create(&paths.game_log(&name_a, &name_b, game))?;

            let winner = if seat_a_opens(game) {
                GameRunner::new(self.seat_a.as_mut(), self.seat_b.as_mut())
            } else {
                GameRunner::new(self.seat_b.as_mut(), self.seat_a.as_mut())
            }
            .run(&self.time_control, &self.start_fen, log)?;

            info!("Game {} winner: {}", game + 1, winner);
            score.record(&winner);

            if let Winner::Engine(winner_name) = &winner {
                let loser_name = if *winner_name == name_a { &name_b } else { &name_a };

                if self.rating_updates {
                    let (new_winner, new_loser) =
                        self.ratings.record_win(winner_name, loser_name);
                    self.ratings.save(&paths.ratings_file)?;
                    info!(
                        "New ratings: {}: {}, {}: {}",
                        winner_name, new_winner, loser_name, new_loser
                    );
                }
            }
        }

        score.save(&paths.results_file)?;
        info!("{}", score);

        // Reap both engines before surfacing either teardown failure.
        let seat_a_down = self.seat_a.shutdown();
        let seat_b_down = self.seat_b.shutdown();
        seat_a_down?;
        seat_b_down?;

        Ok(score)
    }
}
