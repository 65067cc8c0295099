//! Draw and terminal-state detection.

use std::time::Duration;

use crate::board::{Position, Search, SearchConfig, DRAW};
use crate::tt::TranspositionTable;

#[test]
fn test_fifty_move_rule() {
    crate::init();
    let pos = Position::from_fen("k7/8/8/8/8/8/8/K7 w - - 100 80").unwrap();
    assert!(pos.is_fifty_move_draw());
    let pos = Position::from_fen("k7/8/8/8/8/8/8/K7 w - - 99 80").unwrap();
    assert!(!pos.is_fifty_move_draw());
}

#[test]
fn test_checkmate_positions() {
    crate::init();
    let mates = [
        "R5k1/5ppp/8/8/8/8/8/7K b - - 0 1",
        // fool's mate
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        // smothered corner
        "6rk/5Npp/8/8/8/8/8/6K1 b - - 0 1",
    ];
    for fen in mates {
        let pos = Position::from_fen(fen).unwrap();
        assert!(pos.is_checkmate(), "{fen}");
        assert!(!pos.is_stalemate(), "{fen}");
    }
}

#[test]
fn test_stalemate_positions() {
    crate::init();
    let stalemates = [
        "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
        "k7/8/1Q6/8/8/8/8/7K b - - 0 1",
    ];
    for fen in stalemates {
        let pos = Position::from_fen(fen).unwrap();
        assert!(pos.is_stalemate(), "{fen}");
        assert!(!pos.is_checkmate(), "{fen}");
    }
}

#[test]
fn test_twofold_repetition_within_search_stack() {
    crate::init();
    let mut tt = TranspositionTable::new(1);
    let pos = Position::startpos();
    let root_hash = pos.hash();
    let mut search = Search::new(&pos, SearchConfig::default(), &mut tt);

    // Simulate the search walking Nf3 Nf6 Ng1 Ng8 back to the root shape
    for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        search.search_stack.push(search.pos.hash());
        search.pos.make_move_uci(uci).unwrap();
    }
    assert_eq!(search.pos.hash(), root_hash);
    assert!(search.is_repetition());
}

#[test]
fn test_repetition_respects_halfmove_clock() {
    crate::init();
    let mut tt = TranspositionTable::new(1);
    let pos = Position::startpos();
    let mut search = Search::new(&pos, SearchConfig::default(), &mut tt);

    // A pawn move resets the clock; the earlier identical hash (there is
    // none, but the stack entry count now exceeds the clock) must not be
    // scanned
    for uci in ["g1f3", "g8f6", "f3g1", "f6g8", "e2e4"] {
        search.search_stack.push(search.pos.hash());
        search.pos.make_move_uci(uci).unwrap();
    }
    assert_eq!(search.pos.halfmove_clock(), 0);
    assert!(!search.is_repetition());
}

#[test]
fn test_threefold_against_game_history() {
    crate::init();
    let mut tt = TranspositionTable::new(1);
    let pos = Position::startpos();
    let hash = pos.hash();

    // The root position occurred twice before the search started
    {
        let mut search = Search::new(&pos, SearchConfig::default(), &mut tt)
            .with_game_history(vec![hash, 1, 2, 3, hash, 4, 5, 6]);
        search.pos.set_halfmove_clock(20);
        assert!(search.is_repetition());
    }

    // Only one prior occurrence is not yet a draw
    {
        let mut search = Search::new(&pos, SearchConfig::default(), &mut tt)
            .with_game_history(vec![1, 2, 3, hash, 4, 5, 6]);
        search.pos.set_halfmove_clock(20);
        assert!(!search.is_repetition());
    }
}

#[test]
fn test_negamax_scores_repetition_as_draw() {
    crate::init();
    let mut tt = TranspositionTable::new(1);
    let pos = Position::startpos();
    let config = SearchConfig {
        search_time: Duration::from_secs(10),
        ..SearchConfig::default()
    };
    let mut search = Search::new(&pos, config, &mut tt);

    // Wind the search stack through a knight shuffle back to the root
    // shape; the node must be scored as an immediate draw without any
    // traversal below it
    for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        search.search_stack.push(search.pos.hash());
        search.pos.make_move_uci(uci).unwrap();
    }
    let score = search.negamax(6, -crate::board::INFINITY, crate::board::INFINITY, 4, false, true);
    assert_eq!(score, DRAW);
    assert_eq!(search.nodes(), 0);
}

#[test]
fn test_negamax_scores_fifty_move_clock_as_draw() {
    crate::init();
    let mut tt = TranspositionTable::new(1);
    let pos = Position::from_fen("k7/7q/8/8/8/8/8/K7 w - - 100 90").unwrap();
    let config = SearchConfig {
        search_time: Duration::from_secs(10),
        ..SearchConfig::default()
    };
    let mut search = Search::new(&pos, config, &mut tt);
    let score = search.negamax(5, -crate::board::INFINITY, crate::board::INFINITY, 1, false, true);
    assert_eq!(score, DRAW);
}
