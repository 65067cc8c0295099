//! Ivory is a UCI chess engine library.
//!
//! The engine is built from:
//! - Bitboard board representation with magic sliding attacks
//! - Incrementally maintained Zobrist hashing and PSQT scores
//! - A tapered material/structure/mobility/king-safety evaluator
//! - Iterative-deepening alpha-beta search with PVS, null-move pruning,
//!   late-move reductions, quiescence and killer moves
//! - A cluster-packed, generation-aged transposition table
//!
//! # Quick Start
//!
//! ```
//! use ivory::board::{Position, Search, SearchConfig};
//! use ivory::tt::TranspositionTable;
//! use std::time::Duration;
//!
//! ivory::init();
//!
//! let pos = Position::startpos();
//! let mut tt = TranspositionTable::new(16);
//! let config = SearchConfig {
//!     search_time: Duration::from_millis(100),
//!     max_depth: 4,
//!     ..SearchConfig::default()
//! };
//! let mut search = Search::new(&pos, config, &mut tt);
//! let best = search.find_best_move();
//! assert!(best.is_some());
//! ```
//!
//! # Building Positions
//!
//! ```
//! use ivory::board::Position;
//!
//! ivory::init();
//! let pos = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
//!     .unwrap();
//! assert_eq!(pos.fullmove_number(), 1);
//! ```
//!
//! # Features
//!
//! - `serde` - Enable serialization for `Piece`, `Color`, `Square` and `Move`

// Enable pedantic lints with sensible domain-specific exceptions
#![warn(clippy::pedantic)]
// Bitboard hex literals are clearer without separators (bit patterns visible)
#![allow(clippy::unreadable_literal)]
// Chess engines have intentionally similar names (mg/eg, wp/bp, etc.)
#![allow(clippy::similar_names)]
// Index casts are ubiquitous and safe in chess (board indices, square indices)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
// Module-level documentation is sufficient for this codebase
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod board;
pub mod engine;
pub mod tt;
pub mod uci;
pub mod zobrist;

/// Force one-time initialization of the process-global tables (Zobrist keys
/// and attack tables, including the magic-number search).
///
/// Every entry point that hashes or generates moves ends up touching these
/// lazily anyway; calling `init()` up front moves the cost out of the first
/// search. The binary calls it before entering the UCI loop and the test
/// suites call it at startup.
pub fn init() {
    zobrist::init();
    board::attack_tables::init();
}
