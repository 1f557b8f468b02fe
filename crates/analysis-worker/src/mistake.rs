//! Detected opening mistakes and their append-only repository.

use std::path::{Path, PathBuf};

use chess_core::{PlayerColor, PlayerInfo, PlayerResult};
use serde::{Deserialize, Serialize};

use crate::error::WorkerError;
use crate::storage;

/// One of the analyzed player's moves that dropped the evaluation by at least the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    pub move_number: u32,
    #[serde(rename = "move")]
    pub move_san: String,
    pub best_move: Option<String>,
    /// SAN moves from the start up to and including the mistake
    pub move_sequence: Vec<String>,
    pub eval_before: i32,
    pub eval_after: i32,
    /// Change from the analyzed player's perspective, always `<= -threshold`
    pub eval_drop: i32,
    #[serde(default)]
    pub opening: String,
    #[serde(default)]
    pub eco: String,
    pub player_color: PlayerColor,
    #[serde(default)]
    pub game_url: String,
    #[serde(default)]
    pub time_class: String,
    #[serde(default)]
    pub time_control: String,
    #[serde(default)]
    pub end_time: i64,
    /// Position after the mistake
    pub fen: String,
    #[serde(default)]
    pub result: PlayerResult,
    #[serde(default)]
    pub white: PlayerInfo,
    #[serde(default)]
    pub black: PlayerInfo,
}

impl Mistake {
    pub fn sequence_key(&self) -> String {
        self.move_sequence.join(" ")
    }
}

/// Read the mistake artifact; a missing file is an empty list.
pub fn load_mistakes(path: &Path) -> Result<Vec<Mistake>, WorkerError> {
    Ok(storage::read_json(path)?.unwrap_or_default())
}

/// Accumulated mistakes for a run, persisted as a full snapshot on every save.
#[derive(Debug, Clone)]
pub struct MistakeRepository {
    path: PathBuf,
    mistakes: Vec<Mistake>,
}

impl MistakeRepository {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mistakes: Vec::new(),
        }
    }

    /// Seed from the previously persisted snapshot.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, WorkerError> {
        let path = path.into();
        let mistakes = load_mistakes(&path)?;
        Ok(Self { path, mistakes })
    }

    pub fn extend(&mut self, found: impl IntoIterator<Item = Mistake>) {
        self.mistakes.extend(found);
    }

    pub fn len(&self) -> usize {
        self.mistakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mistakes.is_empty()
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    pub fn save(&self) -> Result<(), WorkerError> {
        storage::write_json_atomic(&self.path, &self.mistakes)
    }
}
