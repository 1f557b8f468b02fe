//! Summarize accumulated opening mistakes.
//!
//! Reads mistakes.json, writes statistics.json and prints a console report.
//!
//! Usage:
//!   cargo run --bin statistics

use analysis_worker::config::WorkerConfig;
use analysis_worker::error::WorkerError;
use analysis_worker::mistake::Mistake;
use analysis_worker::report::Report;
use analysis_worker::statistics::{save_statistics, summarize};
use analysis_worker::storage;
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    let mistakes_file = config.mistakes_file();
    let mistakes: Vec<Mistake> = storage::read_json(&mistakes_file)?
        .ok_or_else(|| WorkerError::MistakesFileMissing(mistakes_file.clone()))?;

    if mistakes.is_empty() {
        println!("No mistakes found in the data.");
        return Ok(());
    }

    info!(count = mistakes.len(), "Analyzing mistakes");

    let summary = summarize(&mistakes);
    let statistics_file = config.statistics_file();
    save_statistics(&statistics_file, &summary)?;
    info!(path = %statistics_file.display(), "Statistics saved");

    print!("{}", Report(&summary));
    Ok(())
}
