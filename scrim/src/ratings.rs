use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Rating assumed for any engine the book has never seen.
pub const DEFAULT_RATING: i32 = 1200;

pub const K_FACTOR: f64 = 32.0;

/// Persistent engine-name to rating map, stored as a flat JSON object and
/// rewritten whole on every update.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingBook {
    ratings: BTreeMap<String, i32>,
}

impl RatingBook {
    /// A missing file is an empty book, not an error.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn rating(&self, name: &str) -> i32 {
        self.ratings.get(name).copied().unwrap_or(DEFAULT_RATING)
    }

    /// Apply one Elo step for a decisive game and return the new ratings.
    ///
    /// A single rounded delta is added to the winner and subtracted from
    /// the loser, so the books stay zero-sum in integers.
    pub fn record_win(&mut self, winner: &str, loser: &str) -> (i32, i32) {
        let winner_rating = self.rating(winner);
        let loser_rating = self.rating(loser);

        let expected_loser =
            1.0 / (1.0 + 10.0_f64.powf((winner_rating - loser_rating) as f64 / 400.0));
        let delta = (K_FACTOR * expected_loser).round() as i32;

        let new_winner = winner_rating + delta;
        let new_loser = loser_rating - delta;

        self.ratings.insert(winner.to_string(), new_winner);
        self.ratings.insert(loser.to_string(), new_loser);

        (new_winner, new_loser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_engines_start_at_the_default() {
        let book = RatingBook::default();
        assert_eq!(book.rating("anything"), DEFAULT_RATING);
    }

    #[test]
    fn equal_priors_move_sixteen_points() {
        let mut book = RatingBook::default();
        let (winner, loser) = book.record_win("a", "b");

        assert_eq!(winner, 1216);
        assert_eq!(loser, 1184);
    }

    #[test]
    fn updates_are_monotonic_and_zero_sum() {
        for (rw, rl) in [
            (1200, 1200),
            (1000, 1400),
            (1400, 1000),
            (800, 2200),
            (2200, 800),
            (1216, 1184),
        ] {
            let mut book = RatingBook::default();
            book.ratings.insert("w".to_string(), rw);
            book.ratings.insert("l".to_string(), rl);

            let (new_w, new_l) = book.record_win("w", "l");

            assert!(new_w >= rw, "winner lost points at {}/{}", rw, rl);
            assert!(new_l <= rl, "loser gained points at {}/{}", rw, rl);
            assert_eq!(new_w + new_l, rw + rl, "rating mass changed at {}/{}", rw, rl);
        }
    }

    #[test]
    fn an_upset_moves_more_than_an_expected_win() {
        let mut book = RatingBook::default();
        book.ratings.insert("underdog".to_string(), 1000);
        book.ratings.insert("favorite".to_string(), 1400);

        let (new_underdog, _) = book.record_win("underdog", "favorite");
        let upset_gain = new_underdog - 1000;

        let mut book = RatingBook::default();
        book.ratings.insert("underdog".to_string(), 1000);
        book.ratings.insert("favorite".to_string(), 1400);

        let (new_favorite, _) = book.record_win("favorite", "underdog");
        let expected_gain = new_favorite - 1400;

        assert!(upset_gain > expected_gain);
    }

    #[test]
    fn book_round_trips_through_the_filesystem() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ratings").join("elo_ratings.json");

        let mut book = RatingBook::default();
        book.record_win("smart", "naive");
        book.save(&path).unwrap();

        let reloaded = RatingBook::load(&path).unwrap();
        assert_eq!(reloaded, book);
    }

    #[test]
    fn loading_a_missing_file_yields_an_empty_book() {
        let dir = tempfile::TempDir::new().unwrap();
        let book = RatingBook::load(&dir.path().join("absent.json")).unwrap();

        assert_eq!(book, RatingBook::default());
    }
}
