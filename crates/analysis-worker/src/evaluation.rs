//! Engine evaluation types and score normalization

use shakmaty::Chess;

/// Magnitude of a mate score before the distance penalty.
pub const MATE_SCORE: i32 = 10_000;

/// Centipawns subtracted per move of distance to mate.
pub const MATE_STEP: i32 = 100;

/// Engine verdict on one position.
///
/// `score` is in centipawns from White's perspective with mates folded into
/// ±(10000 - 100·N). Both fields are `None` when the engine failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionEval {
    pub score: Option<i32>,
    /// Engine's preferred move in SAN
    pub best_move: Option<String>,
}

impl PositionEval {
    pub fn absent() -> Self {
        Self::default()
    }
}

/// A source of position evaluations at a fixed search depth.
///
/// Failures are reported as [`PositionEval::absent`], never as errors.
#[allow(async_fn_in_trait)]
pub trait Evaluator {
    async fn evaluate(&mut self, position: &Chess, depth: u32) -> PositionEval;
}

/// Fold "mate in N" (negative = the opponent mates) into centipawns.
///
/// Closer mates get larger magnitudes; the sign says who is mating.
pub fn mate_to_cp(mate_in: i32) -> i32 {
    if mate_in > 0 {
        MATE_SCORE - mate_in * MATE_STEP
    } else {
        -MATE_SCORE - mate_in * MATE_STEP
    }
}

/// Convert a UCI score (side-to-move relative) into White-perspective centipawns.
///
/// `mate 0` means the side to move is already mated.
pub fn white_cp(cp: Option<i32>, mate: Option<i32>, white_to_move: bool) -> Option<i32> {
    let side_relative = match (mate, cp) {
        (Some(0), _) => -MATE_SCORE,
        (Some(m), _) => mate_to_cp(m),
        (None, Some(c)) => c,
        (None, None) => return None,
    };
    Some(if white_to_move {
        side_relative
    } else {
        -side_relative
    })
}
