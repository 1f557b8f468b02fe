//! PGN handling: regex-based header/movetext extraction and move replay.

use std::sync::LazyLock;

use regex::Regex;
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Color, EnPassantMode, Move, Position};
use thiserror::Error;

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("valid header regex"));
static HEADER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid header line regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}|;[^\n]*").expect("valid comment regex"));
static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=?[QRBN])?[+#]?|[O0]-[O0]-[O0][+#]?|[O0]-[O0][+#]?")
        .expect("valid move regex")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PgnError {
    #[error("no game found in PGN text")]
    NoGame,

    #[error("game starts from a non-standard position")]
    NonStandardStart,
}

/// A game's mainline, replayed from the standard starting position.
#[derive(Debug, Clone)]
pub struct ReplayedGame {
    sans: Vec<String>,
    /// `positions[n]` is the board after the first `n` half-moves.
    positions: Vec<Chess>,
    result: Option<String>,
}

impl ReplayedGame {
    pub fn len(&self) -> usize {
        self.sans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sans.is_empty()
    }

    /// SAN of half-move `ply` (0-based).
    pub fn san(&self, ply: usize) -> &str {
        &self.sans[ply]
    }

    /// Board after the first `plies` half-moves; `position_after(0)` is the start.
    pub fn position_after(&self, plies: usize) -> &Chess {
        &self.positions[plies]
    }

    pub fn fen_after(&self, plies: usize) -> String {
        fen(self.position_after(plies))
    }

    /// Value of the `Result` tag, if the PGN declared one.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

/// Parse PGN text and replay its mainline.
///
/// Replay stops at the first token that is not a legal move in the current
/// position; the legal prefix is kept.
pub fn replay(pgn: &str) -> Result<ReplayedGame, PgnError> {
    if extract_header(pgn, "SetUp").as_deref() == Some("1") {
        if let Some(start) = extract_header(pgn, "FEN") {
            if start != STANDARD_START_FEN {
                return Err(PgnError::NonStandardStart);
            }
        }
    }

    let tokens = extract_moves(pgn);
    if tokens.is_empty() {
        return Err(PgnError::NoGame);
    }

    let mut pos = Chess::default();
    let mut positions = vec![pos.clone()];
    let mut sans = Vec::with_capacity(tokens.len());

    for token in &tokens {
        let Ok(san_plus) = token.parse::<SanPlus>() else {
            break;
        };
        let Ok(mv) = san_plus.san.to_move(&pos) else {
            break;
        };
        sans.push(move_to_san(&pos, &mv));
        pos.play_unchecked(mv);
        positions.push(pos.clone());
    }

    if sans.is_empty() {
        return Err(PgnError::NoGame);
    }

    Ok(ReplayedGame {
        sans,
        positions,
        result: extract_header(pgn, "Result"),
    })
}

/// Extract SAN move tokens from PGN text (after removing headers, comments, variations).
pub fn extract_moves(pgn: &str) -> Vec<String> {
    let no_headers = HEADER_LINE_RE.replace_all(pgn, "");
    let no_comments = COMMENT_RE.replace_all(&no_headers, " ");
    let mainline = strip_variations(&no_comments);

    MOVE_RE
        .find_iter(&mainline)
        .map(|m| normalize_move(m.as_str()))
        .collect()
}

/// Rewrite zero-castling (`0-0`) and `=`-less promotions (`e8Q`) into standard SAN.
fn normalize_move(token: &str) -> String {
    if token.starts_with('0') {
        return token.replace('0', "O");
    }
    let body = token.trim_end_matches(['+', '#']);
    match body.as_bytes() {
        [.., b'1' | b'8', piece @ (b'Q' | b'R' | b'B' | b'N')] => {
            let square_end = body.len() - 1;
            format!("{}={}{}", &body[..square_end], *piece as char, &token[body.len()..])
        }
        _ => token.to_string(),
    }
}

/// Remove `( ... )` variations, including nested ones.
fn strip_variations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Extract a string value from a PGN header.
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    HEADER_RE
        .captures_iter(pgn)
        .find(|cap| &cap[1] == header_name)
        .map(|cap| cap[2].to_string())
}

/// FEN of a position.
pub fn fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// SAN of a legal move, with `+`/`#` suffix.
pub fn move_to_san(pos: &Chess, mv: &Move) -> String {
    let san = San::from_move(pos, mv.clone());
    let mut after = pos.clone();
    after.play_unchecked(mv.clone());
    let suffix = if after.is_checkmate() {
        "#"
    } else if after.is_check() {
        "+"
    } else {
        ""
    };
    format!("{san}{suffix}")
}

/// Convert a UCI move (e.g. "g1f3") to SAN in the given position.
pub fn uci_to_san(pos: &Chess, uci: &str) -> Option<String> {
    let uci_move: UciMove = uci.parse().ok()?;
    let mv = uci_move.to_move(pos).ok()?;
    Some(move_to_san(pos, &mv))
}

pub fn white_to_move(pos: &Chess) -> bool {
    pos.turn() == Color::White
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "alice"]
[Black "bob"]
[Result "0-1"]
[ECO "C50"]

1. e4 {[%clk 0:09:58]} 1... e5 {[%clk 0:09:57]} 2. Nf3 Nc6 (2... d6 3. d4) 3. Bc4 Bc5 4. O-O Nf6 5. d3 d6 0-1"#;

    #[test]
    fn test_extract_header() {
        assert_eq!(extract_header(SAMPLE, "White").as_deref(), Some("alice"));
        assert_eq!(extract_header(SAMPLE, "Result").as_deref(), Some("0-1"));
        assert_eq!(extract_header(SAMPLE, "ECO").as_deref(), Some("C50"));
        assert_eq!(extract_header(SAMPLE, "Missing"), None);
    }

    #[test]
    fn test_extract_moves_skips_comments_and_variations() {
        let moves = extract_moves(SAMPLE);
        assert_eq!(
            moves,
            vec!["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O", "Nf6", "d3", "d6"]
        );
    }

    #[test]
    fn test_extract_moves_normalizes_notation() {
        let moves = extract_moves("1. e4 e5 2. 0-0 0-0-0+ 3. e8Q b1N+ 4. exd8=Q#");
        assert_eq!(moves, vec!["e4", "e5", "O-O", "O-O-O+", "e8=Q", "b1=N+", "exd8=Q#"]);
    }

    #[test]
    fn test_replay_zero_castling_and_bare_promotion() {
        let game = replay(
            "1. e4 d5 2. exd5 c6 3. dxc6 Nf6 4. cxb7 e6 5. bxa8Q Be7 6. Nf3 0-0 7. Be2 Nc6 8. 0-0 *",
        )
        .unwrap();
        assert_eq!(game.len(), 15);
        assert_eq!(game.san(8), "bxa8=Q");
        assert_eq!(game.san(11), "O-O");
        assert_eq!(game.san(14), "O-O");
    }

    #[test]
    fn test_strip_nested_variations() {
        let text = "1. e4 (1. d4 d5 (1... Nf6 2. c4)) e5";
        assert_eq!(extract_moves(text), vec!["e4", "e5"]);
    }

    #[test]
    fn test_replay_positions() {
        let game = replay(SAMPLE).unwrap();
        assert_eq!(game.len(), 10);
        assert_eq!(game.san(0), "e4");
        assert_eq!(game.san(6), "O-O");
        assert_eq!(game.result(), Some("0-1"));
        assert_eq!(game.fen_after(0), STANDARD_START_FEN);
        assert_eq!(
            game.fen_after(1),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert!(white_to_move(game.position_after(2)));
        assert!(!white_to_move(game.position_after(3)));
    }

    #[test]
    fn test_replay_canonical_check_suffix() {
        let game = replay("1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7 1-0").unwrap();
        assert_eq!(game.san(6), "Qxf7#");
    }

    #[test]
    fn test_replay_stops_at_illegal_move() {
        let game = replay("1. e4 e5 2. Ke3 Nc6").unwrap();
        assert_eq!(game.len(), 2);
    }

    #[test]
    fn test_replay_no_game() {
        assert_eq!(replay("").unwrap_err(), PgnError::NoGame);
        assert_eq!(replay("[White \"a\"]\n\n*").unwrap_err(), PgnError::NoGame);
        assert_eq!(replay("1. Ke3").unwrap_err(), PgnError::NoGame);
    }

    #[test]
    fn test_replay_rejects_custom_start() {
        let pgn = "[SetUp \"1\"]\n[FEN \"8/8/8/8/8/8/8/K6k w - - 0 1\"]\n\n1. Kb2";
        assert_eq!(replay(pgn).unwrap_err(), PgnError::NonStandardStart);
    }

    #[test]
    fn test_uci_to_san() {
        let pos = Chess::default();
        assert_eq!(uci_to_san(&pos, "g1f3").as_deref(), Some("Nf3"));
        assert_eq!(uci_to_san(&pos, "e2e5"), None);
        assert_eq!(uci_to_san(&pos, "garbage"), None);
    }
}
