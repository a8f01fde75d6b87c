use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Deserialize;
use umi::ProtocolKind;

/// A match configuration file.
///
/// ```toml
/// [match]
/// name = "smart-vs-naive"
/// num_games = 8
/// time_control = "movetime 1000"
///
/// [yellow]
/// path = "engines/smart"
///
/// [blue]
/// path = "engines/naive"
/// ```
#[derive(Debug, Deserialize)]
pub struct ScrimConfig {
    #[serde(rename = "match")]
    pub settings: MatchSettings,
    pub yellow: EngineSection,
    pub blue: EngineSection,
}

#[derive(Debug, Deserialize)]
pub struct MatchSettings {
    pub name: String,
    pub num_games: u32,
    pub time_control: String,

    #[serde(default = "default_start_fen")]
    pub start_fen: String,

    #[serde(default)]
    pub protocol: ProtocolChoice,

    /// Off for development builds so in-progress engines don't pollute the
    /// rating book.
    #[serde(default = "default_true")]
    pub rating_updates: bool,
}

#[derive(Debug, Deserialize)]
pub struct EngineSection {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolChoice {
    #[default]
    Turn,
    Move,
}

impl From<ProtocolChoice> for ProtocolKind {
    fn from(choice: ProtocolChoice) -> Self {
        match choice {
            ProtocolChoice::Turn => ProtocolKind::Turn,
            ProtocolChoice::Move => ProtocolKind::Move,
        }
    }
}

fn default_start_fen() -> String {
    "startpos".to_string()
}

fn default_true() -> bool {
    true
}

impl ScrimConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;

        Ok(toml::from_str(&raw)?)
    }
}

/// Every path the scrim touches, resolved once at startup.
#[derive(Debug)]
pub struct ScrimPaths {
    pub base_dir: PathBuf,
    pub match_dir: PathBuf,
    pub results_file: PathBuf,
    pub ratings_file: PathBuf,
}

impl ScrimPaths {
    pub fn resolve(base_dir: &Path, match_name: &str) -> Self {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let tagged = format!("{}-{}", match_name, stamp);

        Self {
            base_dir: base_dir.to_path_buf(),
            match_dir: base_dir.join("matches").join(&tagged),
            results_file: base_dir.join("results").join(format!("{}.txt", tagged)),
            ratings_file: base_dir.join("ratings").join("elo_ratings.json"),
        }
    }

    /// Configured engine paths are taken relative to the base directory.
    pub fn engine_path(&self, configured: &Path) -> PathBuf {
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.base_dir.join(configured)
        }
    }

    pub fn game_log(&self, yellow: &str, blue: &str, game: u32) -> PathBuf {
        self.match_dir
            .join(format!("{}-vs-{}-{}.log", yellow, blue, game + 1))
    }
}
