#![allow(dead_code)]

use std::collections::HashMap;

use analysis_worker::chess_core::{self, GameRecord, PlayerColor, PlayerInfo};
use analysis_worker::evaluation::{Evaluator, PositionEval};
use shakmaty::Chess;
use tokio::sync::oneshot;

/// 16 legal plies of a Giuoco Piano, long enough for the default window.
pub const ITALIAN_PGN: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[ECO "C54"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. c3 Nf6 5. d4 exd4 6. cxd4 Bb4+ 7. Nc3 Nxe4
8. O-O Bxc3 1-0"#;

/// Scholar's mate, shorter than the default window.
pub const SHORT_PGN: &str = "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0";

/// Evaluator answering from a per-position script instead of an engine.
///
/// Positions are recognized by FEN; anything unscripted evaluates as absent.
#[derive(Default)]
pub struct ScriptedEvaluator {
    script: HashMap<String, PositionEval>,
    pub calls: usize,
    interrupt_after: Option<(usize, oneshot::Sender<()>)>,
    yield_each_call: bool,
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score the position after ply `i` of `pgn` with `scores[i]`; plies past
    /// the end of `scores` repeat the last entry.
    pub fn with_game(mut self, pgn: &str, scores: &[Option<i32>]) -> Self {
        let replayed = chess_core::replay(pgn).expect("scripted game replays");
        for ply in 0..=replayed.len() {
            let score = scores
                .get(ply)
                .or_else(|| scores.last())
                .copied()
                .flatten();
            let eval = PositionEval {
                score,
                best_move: score.map(|_| format!("best{ply}")),
            };
            self.script.insert(replayed.fen_after(ply), eval);
        }
        self
    }

    /// Fire the returned receiver once `calls` evaluations have been served.
    pub fn interrupt_after(mut self, calls: usize) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        self.interrupt_after = Some((calls, tx));
        (self, rx)
    }

    /// Yield to the scheduler after every evaluation, like a real engine
    /// waiting on its pipe.
    pub fn yielding(mut self) -> Self {
        self.yield_each_call = true;
        self
    }
}

impl Evaluator for ScriptedEvaluator {
    async fn evaluate(&mut self, position: &Chess, _depth: u32) -> PositionEval {
        self.calls += 1;
        if self
            .interrupt_after
            .as_ref()
            .is_some_and(|(after, _)| self.calls >= *after)
        {
            if let Some((_, tx)) = self.interrupt_after.take() {
                let _ = tx.send(());
            }
        }
        if self.yield_each_call {
            tokio::task::yield_now().await;
        }
        let fen = chess_core::pgn::fen(position);
        self.script.get(&fen).cloned().unwrap_or_else(PositionEval::absent)
    }
}

pub fn game(url: &str, pgn: &str, color: PlayerColor) -> GameRecord {
    GameRecord {
        url: url.to_string(),
        pgn: pgn.to_string(),
        time_class: "blitz".to_string(),
        time_control: "180".to_string(),
        end_time: 1_700_000_000,
        player_color: color,
        opening: "Italian Game".to_string(),
        eco: "C54".to_string(),
        white: PlayerInfo {
            username: "alice".to_string(),
            rating: 1500,
        },
        black: PlayerInfo {
            username: "bob".to_string(),
            rating: 1480,
        },
    }
}

/// White's second move (2. Nf3) loses 105 cp.
pub fn white_blunder_scores() -> Vec<Option<i32>> {
    vec![Some(20), Some(15), Some(15), Some(-90)]
}
