//! Batch driver: runs the detector over every unprocessed game.
//!
//! Games are analyzed strictly one after another against a single evaluator.
//! Progress and mistakes are checkpointed every `checkpoint_interval`
//! processed games and once more when the run ends, whether it completed or
//! was interrupted.

use std::future::Future;

use chess_core::GameRecord;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::detector::detect_mistakes;
use crate::error::WorkerError;
use crate::evaluation::Evaluator;
use crate::mistake::MistakeRepository;
use crate::progress::ProgressStore;

/// Longest opening name shown in per-game progress lines
const OPENING_LABEL_LEN: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Games analyzed (or found unanalyzable) during this run
    pub processed: usize,
    /// Games already in the progress set when the run started
    pub skipped: usize,
    pub new_mistakes: usize,
    pub total_mistakes: usize,
    pub interrupted: bool,
}

/// A game still waiting for analysis.
#[derive(Debug)]
pub struct PendingGame<'a> {
    pub id: String,
    pub game: &'a GameRecord,
}

/// Identifier under which a game is recorded in the progress set.
pub fn game_id(game: &GameRecord, index: usize) -> String {
    if game.url.is_empty() {
        format!("game_{index}")
    } else {
        game.url.clone()
    }
}

/// Games not yet in `progress`, in input order.
pub fn pending_games<'a>(games: &'a [GameRecord], progress: &ProgressStore) -> Vec<PendingGame<'a>> {
    games
        .iter()
        .enumerate()
        .map(|(index, game)| PendingGame {
            id: game_id(game, index),
            game,
        })
        .filter(|pending| !progress.contains(&pending.id))
        .collect()
}

fn opening_label(opening: &str) -> String {
    if opening.is_empty() {
        return "Unknown".to_string();
    }
    opening.chars().take(OPENING_LABEL_LEN).collect()
}

fn checkpoint(progress: &ProgressStore, mistakes: &MistakeRepository) -> Result<(), WorkerError> {
    // Mistakes first: a crash in between re-analyzes games rather than losing their mistakes
    mistakes.save()?;
    progress.save()?;
    Ok(())
}

/// Analyze every game of `games` that `progress` has not seen yet.
///
/// `shutdown` is raced against each game; once it resolves the game in
/// flight is abandoned (not marked processed) and the run checkpoints and
/// returns with `interrupted` set.
pub async fn run_analysis<E, S>(
    engine: &mut E,
    games: &[GameRecord],
    config: &AnalysisConfig,
    progress: &mut ProgressStore,
    mistakes: &mut MistakeRepository,
    shutdown: S,
) -> Result<RunSummary, WorkerError>
where
    E: Evaluator,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let checkpoint_interval = config.checkpoint_interval.max(1);
    let pending = pending_games(games, progress);
    let total = pending.len();
    let mut summary = RunSummary {
        skipped: games.len() - total,
        ..RunSummary::default()
    };

    info!(
        total_games = games.len(),
        already_processed = summary.skipped,
        to_process = total,
        "Starting analysis"
    );

    for (i, PendingGame { id, game }) in pending.into_iter().enumerate() {
        let opening = opening_label(&game.opening);
        let color = game.player_color;

        let outcome = tokio::select! {
            biased;
            _ = &mut shutdown => None,
            found = detect_mistakes(engine, game, config) => Some(found),
        };

        let Some(found) = outcome else {
            warn!(game = %id, "Interrupted, saving progress");
            summary.interrupted = true;
            break;
        };

        match found {
            Some(found) if !found.is_empty() => {
                info!(
                    "[{}/{}] {} ({}) -> {} mistake(s) found",
                    i + 1,
                    total,
                    opening,
                    color,
                    found.len()
                );
                summary.new_mistakes += found.len();
                mistakes.extend(found);
            }
            Some(_) => info!("[{}/{}] {} ({}) -> OK", i + 1, total, opening, color),
            None => info!("[{}/{}] {} ({}) -> skipped", i + 1, total, opening, color),
        }

        progress.mark(id);
        summary.processed += 1;

        if summary.processed % checkpoint_interval == 0 {
            checkpoint(progress, mistakes)?;
        }
    }

    checkpoint(progress, mistakes)?;
    summary.total_mistakes = mistakes.len();

    info!(
        processed = summary.processed,
        new_mistakes = summary.new_mistakes,
        total_mistakes = summary.total_mistakes,
        interrupted = summary.interrupted,
        "Analysis finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(url: &str) -> GameRecord {
        GameRecord {
            url: url.to_string(),
            ..GameRecord::default()
        }
    }

    #[test]
    fn test_game_id_falls_back_to_index() {
        assert_eq!(game_id(&game(""), 7), "game_7");
        assert_eq!(game_id(&game("https://g/1"), 7), "https://g/1");
    }

    #[test]
    fn test_pending_games_skips_processed() {
        let dir = tempfile::tempdir().unwrap();
        let mut progress = ProgressStore::load(dir.path().join("p.json")).unwrap();
        progress.mark("https://g/1");
        progress.mark("game_2");

        let games = vec![game("https://g/1"), game("https://g/2"), game("")];
        let pending = pending_games(&games, &progress);
        let ids: Vec<&str> = pending.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["https://g/2"]);
    }

    #[test]
    fn test_opening_label_truncates() {
        assert_eq!(opening_label(""), "Unknown");
        let long = "Sicilian Defense: Najdorf Variation, English Attack";
        assert_eq!(opening_label(long).chars().count(), OPENING_LABEL_LEN);
    }
}
