//! Fetch recent rated Chess.com games for analysis.
//!
//! Walks the player's monthly archives newest first until
//! `TARGET_GAME_COUNT` blitz/rapid games are collected, then writes games.json.
//!
//! Usage:
//!   CHESS_COM_USERNAME=someone cargo run --bin fetch-games

use std::collections::BTreeMap;
use std::time::Duration;

use analysis_worker::chess_com::{archive_label, extract_game_record, filter_game, ChessComClient};
use analysis_worker::config::FetchConfig;
use analysis_worker::storage;
use tracing::{info, warn};

/// Pause between archive requests
const ARCHIVE_DELAY: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = FetchConfig::from_env()?;
    info!(username = %config.username, target = config.target_game_count, "Fetching games");

    let client = ChessComClient::new()?;
    let archives = client.fetch_archives(&config.username).await?;
    info!(count = archives.len(), "Found monthly archives");

    let mut games = Vec::new();

    for archive_url in &archives {
        if games.len() >= config.target_game_count {
            break;
        }

        let label = archive_label(archive_url);
        let raw_games = match client.fetch_archive_games(archive_url).await {
            Ok(raw_games) => raw_games,
            Err(e) => {
                warn!(archive = %label, error = %e, "Failed to fetch archive");
                continue;
            }
        };

        let valid: Vec<_> = raw_games.iter().filter(|g| filter_game(g)).collect();
        for game in &valid {
            if games.len() >= config.target_game_count {
                break;
            }
            games.push(extract_game_record(game, &config.username));
        }

        info!(archive = %label, valid = valid.len(), total = games.len(), "Archive fetched");
        tokio::time::sleep(ARCHIVE_DELAY).await;
    }

    let games_file = config.games_file();
    storage::write_json_atomic(&games_file, &games)?;
    info!(count = games.len(), path = %games_file.display(), "Saved games");

    let mut by_time_class: BTreeMap<&str, usize> = BTreeMap::new();
    for game in &games {
        *by_time_class.entry(game.time_class.as_str()).or_default() += 1;
    }
    for (time_class, count) in by_time_class {
        info!(time_class, count, "Breakdown by time class");
    }

    Ok(())
}
