//! Chess.com public API client for the game-history fetch.

use std::time::Duration;

use chess_core::{pgn::extract_header, GameRecord, PlayerColor, PlayerInfo};
use reqwest::Client;
use serde_json::Value;

use crate::error::WorkerError;

const API_BASE: &str = "https://api.chess.com/pub/player";
const USER_AGENT: &str = "ChessMistakesAnalyzer/1.0";

/// Time classes worth analyzing
pub const VALID_TIME_CLASSES: &[&str] = &["blitz", "rapid"];

/// Variant rule sets that are never analyzed
pub const EXCLUDED_RULES: &[&str] = &[
    "bullet",
    "chess960",
    "bughouse",
    "crazyhouse",
    "threecheck",
    "kingofthehill",
];

pub struct ChessComClient {
    client: Client,
}

impl ChessComClient {
    pub fn new() -> Result<Self, WorkerError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    async fn get_json(&self, url: &str) -> Result<Value, WorkerError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(WorkerError::ChessCom(format!("{url}: HTTP {}", resp.status())));
        }
        Ok(resp.json().await?)
    }

    /// Monthly archive URLs for `username`, newest first.
    pub async fn fetch_archives(&self, username: &str) -> Result<Vec<String>, WorkerError> {
        let url = format!("{API_BASE}/{username}/games/archives");
        let data = self.get_json(&url).await?;

        let mut archives: Vec<String> = data["archives"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        // URLs end in ".../YYYY/MM", so reverse lexical order is newest first
        archives.sort_by(|a, b| b.cmp(a));
        Ok(archives)
    }

    /// Raw game objects of one monthly archive.
    pub async fn fetch_archive_games(&self, archive_url: &str) -> Result<Vec<Value>, WorkerError> {
        let data = self.get_json(archive_url).await?;
        Ok(data["games"].as_array().cloned().unwrap_or_default())
    }
}

/// "YYYY/MM" label of an archive URL, for progress output.
pub fn archive_label(archive_url: &str) -> String {
    let mut parts = archive_url.trim_end_matches('/').rsplit('/');
    match (parts.next(), parts.next()) {
        (Some(month), Some(year)) => format!("{year}/{month}"),
        _ => archive_url.to_string(),
    }
}

/// Whether a raw Chess.com game should be analyzed.
pub fn filter_game(game: &Value) -> bool {
    let time_class = game.get("time_class").and_then(Value::as_str).unwrap_or("");
    if !VALID_TIME_CLASSES.contains(&time_class) {
        return false;
    }

    let rules = game.get("rules").and_then(Value::as_str).unwrap_or("chess");
    if EXCLUDED_RULES.contains(&rules) {
        return false;
    }

    game.get("pgn").is_some()
}

fn player_info(side: &Value) -> PlayerInfo {
    PlayerInfo {
        username: side
            .get("username")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        rating: side.get("rating").and_then(Value::as_i64).unwrap_or(0) as i32,
    }
}

/// Opening name from an `ECOUrl` header,
/// e.g. `https://www.chess.com/openings/Kings-Pawn-Opening` -> `Kings Pawn Opening`.
pub fn opening_from_eco_url(eco_url: &str) -> String {
    eco_url
        .rsplit("/openings/")
        .next()
        .unwrap_or("")
        .replace('-', " ")
}

/// Build the stored record for a raw game, seen from `username`'s side.
pub fn extract_game_record(game: &Value, username: &str) -> GameRecord {
    let text = |key: &str| -> String {
        game.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };

    let white = player_info(&game["white"]);
    let black = player_info(&game["black"]);

    let player_color = if white.username.eq_ignore_ascii_case(username) {
        PlayerColor::White
    } else {
        PlayerColor::Black
    };

    let pgn = text("pgn");
    let opening = extract_header(&pgn, "ECOUrl")
        .map(|url| opening_from_eco_url(&url))
        .unwrap_or_default();
    let eco = extract_header(&pgn, "ECO").unwrap_or_default();

    GameRecord {
        url: text("url"),
        time_class: text("time_class"),
        time_control: text("time_control"),
        end_time: game.get("end_time").and_then(Value::as_i64).unwrap_or(0),
        player_color,
        opening,
        eco,
        white,
        black,
        pgn,
    }
}
