//! Opening Mistake Analyzer
//!
//! Replays every fetched game through Stockfish and records the opening
//! moves that lost the analyzed player at least the configured threshold.
//! Safe to interrupt with Ctrl-C and re-run: finished games are remembered.

use analysis_worker::chess_core::GameRecord;
use analysis_worker::config::WorkerConfig;
use analysis_worker::error::WorkerError;
use analysis_worker::mistake::MistakeRepository;
use analysis_worker::pipeline::{pending_games, run_analysis};
use analysis_worker::progress::ProgressStore;
use analysis_worker::stockfish::{locate_stockfish, StockfishEngine};
use analysis_worker::storage;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    info!(
        data_dir = %config.data_dir.display(),
        depth = config.analysis.depth,
        window = config.analysis.window_half_moves,
        threshold = config.analysis.threshold_cp,
        "Worker config loaded"
    );

    let games_file = config.games_file();
    let games: Vec<GameRecord> = storage::read_json(&games_file)?
        .ok_or_else(|| WorkerError::GamesFileMissing(games_file.clone()))?;
    info!(count = games.len(), "Loaded games");

    let mut progress = ProgressStore::load(config.progress_file())?;

    // A mistakes file without progress belongs to an abandoned run
    let mut mistakes = if progress.is_empty() {
        MistakeRepository::empty(config.mistakes_file())
    } else {
        MistakeRepository::load(config.mistakes_file())?
    };

    info!(
        processed = progress.len(),
        mistakes = mistakes.len(),
        "Resuming from previous progress"
    );

    if pending_games(&games, &progress).is_empty() {
        info!("All games already processed");
        mistakes.save()?;
        return Ok(());
    }

    let stockfish_path = locate_stockfish(config.stockfish_path.as_deref())?;
    info!(path = %stockfish_path.display(), "Using Stockfish");

    let mut engine = StockfishEngine::new(&stockfish_path).await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let result = run_analysis(
        &mut engine,
        &games,
        &config.analysis,
        &mut progress,
        &mut mistakes,
        shutdown,
    )
    .await;

    info!("Shutting down Stockfish");
    engine.quit().await;

    let summary = result?;
    info!(
        total_processed = progress.len(),
        total_mistakes = summary.total_mistakes,
        output = %config.mistakes_file().display(),
        "Analysis complete"
    );

    Ok(())
}
