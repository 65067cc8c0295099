pub mod attack_tables;
mod error;
mod eval;
mod fen;
mod movegen;
mod position;
mod pst;
mod search;
mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, SquareError, ValidationError};
pub use eval::{evaluate, game_phase, is_mate_score, DRAW, INFINITY, MATE, MATE_THRESHOLD};
pub use movegen::PerftCounts;
pub use position::{NullUndo, Position, UndoInfo, STARTING_FEN};
pub use pst::Score;
pub use search::{InfoCallback, Search, SearchConfig, SearchInfo};
pub use types::{Bitboard, Color, Move, MoveList, Piece, ScoredMove, ScoredMoveList, Square};
