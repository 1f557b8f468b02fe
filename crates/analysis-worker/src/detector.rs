//! Opening mistake detection
//!
//! Walks the first `window_half_moves` plies of a game, evaluating every
//! position, and flags the analyzed player's moves whose evaluation swing
//! (from that player's perspective) reaches `-threshold_cp`.

use chess_core::{GameRecord, PlayerColor, PlayerResult};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::evaluation::Evaluator;
use crate::mistake::Mistake;

/// Evaluation change caused by a move, from `color`'s perspective.
///
/// Scores are White-relative, so Black's change is the negated difference.
pub fn eval_delta(before: i32, after: i32, color: PlayerColor) -> i32 {
    match color {
        PlayerColor::White => after - before,
        PlayerColor::Black => before - after,
    }
}

/// Analyze one game.
///
/// Returns `None` when the game cannot be replayed or is shorter than the
/// window; such games contribute nothing but still count as processed.
pub async fn detect_mistakes<E: Evaluator>(
    engine: &mut E,
    game: &GameRecord,
    config: &AnalysisConfig,
) -> Option<Vec<Mistake>> {
    let replayed = match chess_core::replay(&game.pgn) {
        Ok(replayed) => replayed,
        Err(e) => {
            debug!(url = %game.url, error = %e, "Skipping unparseable game");
            return None;
        }
    };

    let window = config.window_half_moves;
    if replayed.len() < window {
        debug!(url = %game.url, plies = replayed.len(), window, "Game too short");
        return None;
    }

    let color = game.player_color;
    let depth = config.depth;
    let result = PlayerResult::from_pgn_result(replayed.result().unwrap_or_default(), color);

    let mut previous = engine.evaluate(replayed.position_after(0), depth).await;
    let mut move_sequence: Vec<String> = Vec::with_capacity(window);
    let mut mistakes = Vec::new();

    for ply in 0..window {
        let san = replayed.san(ply);
        move_sequence.push(san.to_string());
        let player_move = color.owns_ply(ply);

        // The pre-move position was the previous post-move position, so its
        // best move is usually already known.
        let best_move = if player_move {
            match &previous.best_move {
                Some(best) => Some(best.clone()),
                None => {
                    engine
                        .evaluate(replayed.position_after(ply), depth)
                        .await
                        .best_move
                }
            }
        } else {
            None
        };

        let current = engine.evaluate(replayed.position_after(ply + 1), depth).await;

        if player_move {
            if let (Some(before), Some(after)) = (previous.score, current.score) {
                let delta = eval_delta(before, after, color);
                if delta <= -config.threshold_cp {
                    debug!(url = %game.url, ply, san, delta, "Mistake found");
                    mistakes.push(Mistake {
                        move_number: (ply / 2 + 1) as u32,
                        move_san: san.to_string(),
                        best_move,
                        move_sequence: move_sequence.clone(),
                        eval_before: before,
                        eval_after: after,
                        eval_drop: delta,
                        opening: game.opening.clone(),
                        eco: game.eco.clone(),
                        player_color: color,
                        game_url: game.url.clone(),
                        time_class: game.time_class.clone(),
                        time_control: game.time_control.clone(),
                        end_time: game.end_time,
                        fen: replayed.fen_after(ply + 1),
                        result,
                        white: game.white.clone(),
                        black: game.black.clone(),
                    });
                }
            }
        }

        previous = current;
    }

    Some(mistakes)
}
