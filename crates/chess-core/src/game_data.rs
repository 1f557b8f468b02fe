use std::fmt;

use serde::{Deserialize, Serialize};

/// Side the analyzed player had in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    #[default]
    White,
    Black,
}

impl PlayerColor {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }

    /// Whether half-move `ply` (0-based, White moves first) was played by this side.
    pub fn owns_ply(self, ply: usize) -> bool {
        match self {
            PlayerColor::White => ply % 2 == 0,
            PlayerColor::Black => ply % 2 == 1,
        }
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rating: i32,
}

/// One historical game as written by the fetch step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRecord {
    pub url: String,
    pub pgn: String,
    pub time_class: String,
    pub time_control: String,
    pub end_time: i64,
    pub player_color: PlayerColor,
    pub opening: String,
    pub eco: String,
    pub white: PlayerInfo,
    pub black: PlayerInfo,
}

/// Game outcome seen from the analyzed player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerResult {
    Win,
    Draw,
    Loss,
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl PlayerResult {
    /// Map a PGN `Result` tag value ("1-0", "0-1", "1/2-1/2") onto `color`.
    pub fn from_pgn_result(result: &str, color: PlayerColor) -> Self {
        match (result.trim(), color) {
            ("1-0", PlayerColor::White) | ("0-1", PlayerColor::Black) => PlayerResult::Win,
            ("1-0", PlayerColor::Black) | ("0-1", PlayerColor::White) => PlayerResult::Loss,
            ("1/2-1/2", _) => PlayerResult::Draw,
            _ => PlayerResult::Unknown,
        }
    }
}
