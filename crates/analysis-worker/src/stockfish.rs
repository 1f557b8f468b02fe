//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::env;
use std::path::{Path, PathBuf};

use chess_core::pgn;
use shakmaty::Chess;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use crate::error::WorkerError;
use crate::evaluation::{white_cp, Evaluator, PositionEval};

/// Well-known Stockfish locations, tried in order.
pub const STOCKFISH_CANDIDATES: &[&str] = &[
    "stockfish",
    "/usr/local/bin/stockfish",
    "/opt/homebrew/bin/stockfish",
    "/usr/bin/stockfish",
    "C:/Program Files/Stockfish/stockfish.exe",
];

const INSTALL_HINT: &str = "Stockfish not found. Please install it:\n  \
     macOS: brew install stockfish\n  \
     Linux: sudo apt install stockfish\n  \
     Windows: Download from https://stockfishchess.org/download/\n\
     or point STOCKFISH_PATH at the binary.";

/// Raw result of a single search, scores relative to the side to move
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Centipawn score
    pub cp: Option<i32>,
    /// Mate in N moves (positive = side to move mates)
    pub mate: Option<i32>,
    /// Principal variation in UCI notation
    pub pv: Vec<String>,
    /// `bestmove` token, absent for "(none)"
    pub best_move: Option<String>,
}

/// Find the Stockfish binary: `preferred` first, then [`STOCKFISH_CANDIDATES`].
pub fn locate_stockfish(preferred: Option<&str>) -> Result<PathBuf, WorkerError> {
    preferred
        .into_iter()
        .chain(STOCKFISH_CANDIDATES.iter().copied())
        .find_map(resolve_binary)
        .ok_or_else(|| WorkerError::EngineNotFound(INSTALL_HINT.to_string()))
}

fn resolve_binary(candidate: &str) -> Option<PathBuf> {
    let path = Path::new(candidate);
    if path.is_absolute() || path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }

    let search_path = env::var_os("PATH")?;
    env::split_paths(&search_path)
        .flat_map(|dir| [dir.join(candidate), dir.join(format!("{candidate}.exe"))])
        .find(|p| p.is_file())
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &Path) -> Result<Self, WorkerError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WorkerError::Stockfish(format!("Failed to spawn Stockfish: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| WorkerError::Stockfish("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| WorkerError::Stockfish("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        engine.send("setoption name Threads value 1").await?;
        engine.send("setoption name Hash value 128").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), WorkerError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| WorkerError::Stockfish(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| WorkerError::Stockfish(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, WorkerError> {
        let mut line = String::new();
        let bytes = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| WorkerError::Stockfish(format!("Failed to read from Stockfish: {e}")))?;
        if bytes == 0 {
            return Err(WorkerError::Stockfish("Stockfish closed its output".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), WorkerError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Search a position to a fixed depth
    pub async fn search(&mut self, fen: &str, depth: u32) -> Result<SearchResult, WorkerError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut result = SearchResult::default();

        loop {
            let line = self.read_line().await?;

            if line.starts_with("info") && line.contains(" score ") {
                if let Some(cp) = parse_cp(&line) {
                    result.cp = Some(cp);
                    result.mate = None;
                }
                if let Some(mate) = parse_mate(&line) {
                    result.mate = Some(mate);
                    result.cp = None;
                }
                let pv = parse_pv(&line);
                if !pv.is_empty() {
                    result.pv = pv;
                }
            } else if line.starts_with("bestmove") {
                result.best_move = line
                    .split_whitespace()
                    .nth(1)
                    .filter(|mv| *mv != "(none)")
                    .map(str::to_string);
                break;
            }
        }

        Ok(result)
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Evaluator for StockfishEngine {
    async fn evaluate(&mut self, position: &Chess, depth: u32) -> PositionEval {
        let fen = pgn::fen(position);
        match self.search(&fen, depth).await {
            Ok(result) => to_position_eval(position, &result),
            Err(e) => {
                warn!(error = %e, fen = %fen, "Evaluation failed");
                PositionEval::absent()
            }
        }
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Re-project a raw search onto White's perspective with a SAN best move.
pub fn to_position_eval(position: &Chess, result: &SearchResult) -> PositionEval {
    let score = white_cp(result.cp, result.mate, pgn::white_to_move(position));
    let best_move = result
        .pv
        .first()
        .or(result.best_move.as_ref())
        .and_then(|uci| pgn::uci_to_san(position, uci));
    PositionEval { score, best_move }
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    parse_after(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    parse_after(line, "mate")
}

fn parse_after(line: &str, keyword: &str) -> Option<i32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    parts
        .windows(2)
        .find(|pair| pair[0] == keyword)
        .and_then(|pair| pair[1].parse().ok())
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|part| *part != "pv")
        .skip(1)
        .take_while(|part| !part.starts_with("bmc") && *part != "string")
        .map(str::to_string)
        .collect()
}
