//! Worker error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    EngineNotFound(String),

    #[error("Stockfish error: {0}")]
    Stockfish(String),

    #[error("{} not found. Run fetch-games first.", .0.display())]
    GamesFileMissing(PathBuf),

    #[error("{} not found. Run analysis-worker first.", .0.display())]
    MistakesFileMissing(PathBuf),

    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chess.com error: {0}")]
    ChessCom(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
