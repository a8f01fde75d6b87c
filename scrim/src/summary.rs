use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use ahash::AHashMap;

const DRAW_KEY: &str = "draw";

/// The outcome of one game. The only values ever produced are the two
/// contestants' short names and the draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    Engine(String),
    Draw,
}

impl Winner {
    fn key(&self) -> &str {
        match self {
            Winner::Engine(name) => name,
            Winner::Draw => DRAW_KEY,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Win counts for one scrimmage, finalized into the results artifact.
pub struct MatchScore {
    yellow: String,
    blue: String,
    counts: AHashMap<String, u32>,
}

impl MatchScore {
    pub fn new(yellow: &str, blue: &str) -> Self {
        let mut counts = AHashMap::new();
        counts.insert(yellow.to_string(), 0);
        counts.insert(blue.to_string(), 0);
        counts.insert(DRAW_KEY.to_string(), 0);

        Self {
            yellow: yellow.to_string(),
            blue: blue.to_string(),
            counts,
        }
    }

    pub fn record(&mut self, winner: &Winner) {
        *self.counts.entry(winner.key().to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn draws(&self) -> u32 {
        self.count(DRAW_KEY)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format!("{}\n", self))
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final Score:")?;
        writeln!(f, "{}: {}", self.yellow, self.count(&self.yellow))?;
        writeln!(f, "{}: {}", self.blue, self.count(&self.blue))?;
        write!(f, "Draws: {}", self.draws())
    }
}
