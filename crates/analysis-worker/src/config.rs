//! Worker configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::WorkerError;

/// Parameters of the mistake search. Passed explicitly into the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Fixed engine search depth for every evaluation
    pub depth: u32,

    /// Leading half-moves examined per game
    pub window_half_moves: usize,

    /// Minimum drop (centipawns, analyzed player's perspective) that counts as a mistake
    pub threshold_cp: i32,

    /// Games processed between checkpoints
    pub checkpoint_interval: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: 15,
            window_half_moves: 14,
            threshold_cp: 100,
            checkpoint_interval: 10,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Directory holding every JSON artifact
    pub data_dir: PathBuf,

    /// Explicit Stockfish binary, tried before the well-known locations
    pub stockfish_path: Option<String>,

    pub analysis: AnalysisConfig,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, WorkerError> {
        let defaults = AnalysisConfig::default();

        let analysis = AnalysisConfig {
            depth: parse_var(&var, "ANALYSIS_DEPTH", defaults.depth)?,
            window_half_moves: parse_var(&var, "MOVES_TO_ANALYZE", defaults.window_half_moves)?,
            threshold_cp: parse_var(&var, "MISTAKE_THRESHOLD", defaults.threshold_cp)?,
            checkpoint_interval: parse_var(
                &var,
                "CHECKPOINT_INTERVAL",
                defaults.checkpoint_interval,
            )?,
        };

        if analysis.threshold_cp <= 0 {
            return Err(WorkerError::Config("MISTAKE_THRESHOLD must be positive".into()));
        }
        if analysis.checkpoint_interval == 0 {
            return Err(WorkerError::Config("CHECKPOINT_INTERVAL must be at least 1".into()));
        }

        Ok(Self {
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            stockfish_path: var("STOCKFISH_PATH").filter(|p| !p.trim().is_empty()),
            analysis,
        })
    }

    pub fn games_file(&self) -> PathBuf {
        self.data_dir.join("games.json")
    }

    pub fn progress_file(&self) -> PathBuf {
        self.data_dir.join("analysis_progress.json")
    }

    pub fn mistakes_file(&self) -> PathBuf {
        self.data_dir.join("mistakes.json")
    }

    pub fn statistics_file(&self) -> PathBuf {
        self.data_dir.join("statistics.json")
    }
}

/// Settings for the game-history fetch.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub username: String,
    pub target_game_count: usize,
    pub data_dir: PathBuf,
}

impl FetchConfig {
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, WorkerError> {
        let username = var("CHESS_COM_USERNAME")
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| WorkerError::Config("CHESS_COM_USERNAME not set".into()))?;

        Ok(Self {
            username,
            target_game_count: parse_var(&var, "TARGET_GAME_COUNT", 15)?,
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
        })
    }

    pub fn games_file(&self) -> PathBuf {
        self.data_dir.join("games.json")
    }
}

fn parse_var<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, WorkerError> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| WorkerError::Config(format!("{key} has invalid value {raw:?}"))),
        None => Ok(default),
    }
}
