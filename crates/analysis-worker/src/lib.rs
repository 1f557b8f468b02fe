//! Opening mistake analysis: Stockfish-driven detection over a batch of
//! Chess.com games, with resumable progress and aggregate statistics.

pub use chess_core;

pub mod chess_com;
pub mod config;
pub mod detector;
pub mod error;
pub mod evaluation;
pub mod mistake;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod statistics;
pub mod stockfish;
pub mod storage;
