//! Game records and PGN replay shared by the analysis worker and the server.

pub mod game_data;
pub mod pgn;

pub use game_data::{GameRecord, PlayerColor, PlayerInfo, PlayerResult};
pub use pgn::{replay, PgnError, ReplayedGame};
