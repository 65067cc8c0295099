//! Static evaluation.
//!
//! Every term produces a middle-game/end-game `Score` pair, accumulated
//! white-minus-black; the sum is tapered by the remaining-material phase
//! and finally signed for the side to move. The material+PST term reuses
//! the PST accumulator maintained incrementally by `Position`.

use super::attack_tables::{bishop_attacks, queen_attacks, rook_attacks, KING_ATTACKS, KNIGHT_ATTACKS};
use super::position::Position;
use super::pst::{s, Score, MATERIAL, PHASE_WEIGHTS, TOTAL_PHASE};
use super::types::{Bitboard, Color, Piece, Square};

/// Mate score; a score of `MATE - ply` denotes mate in `ply` half-moves.
pub const MATE: i32 = 100_000;
/// Larger than any reachable score; used as the alpha-beta window bound.
pub const INFINITY: i32 = 200_000;
pub const DRAW: i32 = 0;
/// Scores at or beyond this magnitude are mate scores.
pub const MATE_THRESHOLD: i32 = MATE - 200;

/// True if `score` encodes a forced mate for either side.
#[inline]
#[must_use]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}

const BISHOP_PAIR_BONUS: Score = s(30, 40);
const DOUBLED_PAWN_PENALTY: Score = s(-10, -15);
const ISOLATED_PAWN_PENALTY: Score = s(-15, -20);
const PASSED_PAWN_BONUS: [Score; 8] = [
    s(0, 0),
    s(5, 10),
    s(10, 20),
    s(20, 35),
    s(35, 55),
    s(60, 90),
    s(100, 150),
    s(0, 0),
];
const ROOK_OPEN_FILE_BONUS: Score = s(15, 10);
const ROOK_SEMI_OPEN_FILE_BONUS: Score = s(8, 5);

// Mobility: score per attacked square above/below the baseline
const KNIGHT_MOB_WEIGHT: Score = s(4, 4);
const KNIGHT_MOB_BASELINE: i32 = 4;
const BISHOP_MOB_WEIGHT: Score = s(3, 3);
const BISHOP_MOB_BASELINE: i32 = 7;
const ROOK_MOB_WEIGHT: Score = s(2, 2);
const ROOK_MOB_BASELINE: i32 = 7;
const QUEEN_MOB_WEIGHT: Score = s(1, 1);
const QUEEN_MOB_BASELINE: i32 = 14;

// King safety
const SHELTER_PAWN_BONUS: Score = s(15, 0);
const SHELTER_STORM_PENALTY: Score = s(-10, 0);
// Semi-open file near the king (no own pawn, enemy pawn present): shelter
// gap plus an active storm threat. Fully open: shelter gap only.
const KING_SEMI_OPEN_FILE_PENALTY: Score = s(-20, 0);
const KING_OPEN_FILE_PENALTY: Score = s(-10, 0);
// Attacker weights into the king zone, indexed by piece type. Knights are
// weighted highest: they leap past defenses and their checks are hardest
// to see.
const KING_ATTACKER_WEIGHT: [i32; 6] = [0, 7, 5, 4, 4, 0];
const KING_DANGER_DIVIDER: i32 = 8; // penalty = danger^2 / divider, mg only

/// Attack maps built once per `evaluate` call and shared across terms.
#[derive(Default)]
struct EvalState {
    attacked_by: [[Bitboard; 6]; 2],
    pawn_attacks: [Bitboard; 2],
}

fn adjacent_files(file: usize) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    if file > 0 {
        mask |= Bitboard::file(file - 1);
    }
    if file < 7 {
        mask |= Bitboard::file(file + 1);
    }
    mask
}

/// Evaluate the position in centipawns from the side-to-move's point of view.
/// Total function: never fails, never allocates.
#[must_use]
pub fn evaluate(pos: &Position) -> i32 {
    let wp = pos.pieces(Piece::Pawn, Color::White);
    let bp = pos.pieces(Piece::Pawn, Color::Black);

    let mut state = EvalState::default();

    let score = material(pos)
        + pos.psqt()
        + bishop_pair(pos)
        + pawn_structure(wp, bp)
        + passed_pawns(wp, bp)
        + rook_files(pos, wp, bp)
        + mobility(pos, wp, bp, &mut state)
        + king_safety(pos, wp, bp, &state);

    let tapered = score.taper(game_phase(pos));
    match pos.side_to_move() {
        Color::White => tapered,
        Color::Black => -tapered,
    }
}

/// Material balance. The PST half of the classic material+PST term lives in
/// `Position::psqt()`, maintained incrementally.
fn material(pos: &Position) -> Score {
    let mut score = Score::ZERO;
    for piece in Piece::ALL {
        let diff = pos.pieces(piece, Color::White).popcount() as i32
            - pos.pieces(piece, Color::Black).popcount() as i32;
        score += MATERIAL[piece.index()] * diff;
    }
    score
}

/// Remaining-material phase in [0, 24]; 24 = full middlegame.
#[must_use]
pub fn game_phase(pos: &Position) -> i32 {
    let mut phase = 0;
    for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        phase += PHASE_WEIGHTS[piece.index()] * pos.piece_bb(piece).popcount() as i32;
    }
    phase.min(TOTAL_PHASE)
}

fn bishop_pair(pos: &Position) -> Score {
    let mut score = Score::ZERO;
    if pos.pieces(Piece::Bishop, Color::White).popcount() >= 2 {
        score += BISHOP_PAIR_BONUS;
    }
    if pos.pieces(Piece::Bishop, Color::Black).popcount() >= 2 {
        score -= BISHOP_PAIR_BONUS;
    }
    score
}

fn pawn_structure(wp: Bitboard, bp: Bitboard) -> Score {
    let mut score = Score::ZERO;
    for file in 0..8 {
        let file_mask = Bitboard::file(file);
        let w_count = (wp & file_mask).popcount() as i32;
        let b_count = (bp & file_mask).popcount() as i32;

        if w_count > 1 {
            score += DOUBLED_PAWN_PENALTY * (w_count - 1);
        }
        if b_count > 1 {
            score -= DOUBLED_PAWN_PENALTY * (b_count - 1);
        }

        let adjacent = adjacent_files(file);
        if w_count > 0 && (wp & adjacent).is_empty() {
            score += ISOLATED_PAWN_PENALTY * w_count;
        }
        if b_count > 0 && (bp & adjacent).is_empty() {
            score -= ISOLATED_PAWN_PENALTY * b_count;
        }
    }
    score
}

fn passed_pawns(wp: Bitboard, bp: Bitboard) -> Score {
    let mut score = Score::ZERO;

    for sq in wp {
        let span = Bitboard::file(sq.file()) | adjacent_files(sq.file());
        let mut ahead = span;
        for rank in 0..=sq.rank() {
            ahead &= !Bitboard::rank(rank);
        }
        if (bp & ahead).is_empty() {
            score += PASSED_PAWN_BONUS[sq.rank()];
        }
    }

    for sq in bp {
        let span = Bitboard::file(sq.file()) | adjacent_files(sq.file());
        let mut ahead = span;
        for rank in sq.rank()..8 {
            ahead &= !Bitboard::rank(rank);
        }
        if (wp & ahead).is_empty() {
            score -= PASSED_PAWN_BONUS[7 - sq.rank()];
        }
    }

    score
}

fn rook_files(pos: &Position, wp: Bitboard, bp: Bitboard) -> Score {
    let mut score = Score::ZERO;

    for sq in pos.pieces(Piece::Rook, Color::White) {
        let file_mask = Bitboard::file(sq.file());
        if (wp & file_mask).is_empty() {
            score += if (bp & file_mask).is_empty() {
                ROOK_OPEN_FILE_BONUS
            } else {
                ROOK_SEMI_OPEN_FILE_BONUS
            };
        }
    }

    for sq in pos.pieces(Piece::Rook, Color::Black) {
        let file_mask = Bitboard::file(sq.file());
        if (bp & file_mask).is_empty() {
            score -= if (wp & file_mask).is_empty() {
                ROOK_OPEN_FILE_BONUS
            } else {
                ROOK_SEMI_OPEN_FILE_BONUS
            };
        }
    }

    score
}

/// Piece mobility in the mobility area (not our pieces, not squares covered
/// by enemy pawns). Populates the per-color attack maps used by king safety.
fn mobility(pos: &Position, wp: Bitboard, bp: Bitboard, state: &mut EvalState) -> Score {
    let mut score = Score::ZERO;
    let occupied = pos.occupied();

    state.pawn_attacks[Color::White.index()] = wp.shift_north_east() | wp.shift_north_west();
    state.pawn_attacks[Color::Black.index()] = bp.shift_south_east() | bp.shift_south_west();

    // Seed king and pawn attacks into the map
    for color in Color::BOTH {
        let ci = color.index();
        if let Some(king_sq) = pos.king_square(color) {
            state.attacked_by[ci][Piece::King.index()] = KING_ATTACKS[king_sq.index()];
        }
        state.attacked_by[ci][Piece::Pawn.index()] = state.pawn_attacks[ci];
    }

    let mob_area = [
        !(pos.color_bb(Color::White) | state.pawn_attacks[Color::Black.index()]),
        !(pos.color_bb(Color::Black) | state.pawn_attacks[Color::White.index()]),
    ];

    for color in Color::BOTH {
        let ci = color.index();
        let sign = if color == Color::White { 1 } else { -1 };

        for sq in pos.pieces(Piece::Knight, color) {
            let attacks = KNIGHT_ATTACKS[sq.index()];
            state.attacked_by[ci][Piece::Knight.index()] |= attacks;
            let mob = (attacks & mob_area[ci]).popcount() as i32;
            score += KNIGHT_MOB_WEIGHT * ((mob - KNIGHT_MOB_BASELINE) * sign);
        }

        for sq in pos.pieces(Piece::Bishop, color) {
            let attacks = bishop_attacks(sq, occupied);
            state.attacked_by[ci][Piece::Bishop.index()] |= attacks;
            let mob = (attacks & mob_area[ci]).popcount() as i32;
            score += BISHOP_MOB_WEIGHT * ((mob - BISHOP_MOB_BASELINE) * sign);
        }

        for sq in pos.pieces(Piece::Rook, color) {
            let attacks = rook_attacks(sq, occupied);
            state.attacked_by[ci][Piece::Rook.index()] |= attacks;
            let mob = (attacks & mob_area[ci]).popcount() as i32;
            score += ROOK_MOB_WEIGHT * ((mob - ROOK_MOB_BASELINE) * sign);
        }

        for sq in pos.pieces(Piece::Queen, color) {
            let attacks = queen_attacks(sq, occupied);
            state.attacked_by[ci][Piece::Queen.index()] |= attacks;
            let mob = (attacks & mob_area[ci]).popcount() as i32;
            score += QUEEN_MOB_WEIGHT * ((mob - QUEEN_MOB_BASELINE) * sign);
        }
    }

    score
}

/// 3x3 king zone: the king square plus its king-attack neighborhood.
fn king_zone(king_sq: Square) -> Bitboard {
    KING_ATTACKS[king_sq.index()] | Bitboard::from_square(king_sq)
}

fn king_safety(pos: &Position, wp: Bitboard, bp: Bitboard, state: &EvalState) -> Score {
    let mut score = Score::ZERO;

    for color in Color::BOTH {
        let ci = color.index();
        let them = color.opponent().index();
        let Some(king_sq) = pos.king_square(color) else {
            continue;
        };
        let k_file = king_sq.file();
        let k_rank = king_sq.rank();
        let zone = king_zone(king_sq);

        let (own_pawns, enemy_pawns) = if color == Color::White {
            (wp, bp)
        } else {
            (bp, wp)
        };

        // Two ranks in front of the king
        let mut ahead_ranks = Bitboard::EMPTY;
        if color == Color::White {
            for rank in (k_rank + 1)..=(k_rank + 2).min(7) {
                ahead_ranks |= Bitboard::rank(rank);
            }
        } else {
            for rank in k_rank.saturating_sub(2)..k_rank {
                ahead_ranks |= Bitboard::rank(rank);
            }
        }

        let mut shelter = 0;
        let mut storm = 0;
        let mut files_term = Score::ZERO;

        for file in k_file.saturating_sub(1)..=(k_file + 1).min(7) {
            let file_mask = Bitboard::file(file);

            shelter += (own_pawns & file_mask & ahead_ranks).popcount() as i32;
            storm += (enemy_pawns & file_mask & ahead_ranks).popcount() as i32;

            if (own_pawns & file_mask).is_empty() {
                files_term += if (enemy_pawns & file_mask).is_empty() {
                    KING_OPEN_FILE_PENALTY
                } else {
                    KING_SEMI_OPEN_FILE_PENALTY
                };
            }
        }

        let shelter_term = SHELTER_PAWN_BONUS * shelter + SHELTER_STORM_PENALTY * storm;

        // Attacker danger in the zone; quadratic penalty, middle-game only
        let mut danger = 0;
        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            danger += KING_ATTACKER_WEIGHT[piece.index()]
                * (state.attacked_by[them][piece.index()] & zone).popcount() as i32;
        }
        let danger_term = s(-(danger * danger) / KING_DANGER_DIVIDER, 0);

        let total = shelter_term + files_term + danger_term;
        if color == Color::White {
            score += total;
        } else {
            score -= total;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_balanced() {
        let pos = Position::startpos();
        assert_eq!(evaluate(&pos), 0);
    }

    #[test]
    fn test_evaluation_is_symmetric() {
        // The same position from the other side's view negates the score
        let pos =
            Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
                .unwrap();
        let mut flipped = pos.clone();
        let _ = flipped.make_null_move();
        assert_eq!(evaluate(&pos), -evaluate(&flipped));
    }

    #[test]
    fn test_extra_queen_wins_eval() {
        let pos = Position::from_fen("k7/8/8/8/8/8/8/KQ6 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 500);
        // And from Black's point of view it is bad
        let pos = Position::from_fen("k7/8/8/8/8/8/8/KQ6 b - - 0 1").unwrap();
        assert!(evaluate(&pos) < -500);
    }

    #[test]
    fn test_game_phase_bounds() {
        assert_eq!(game_phase(&Position::startpos()), TOTAL_PHASE);
        let bare = Position::from_fen("k7/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert_eq!(game_phase(&bare), 0);
        // Promotions can push raw phase above 24; it must clamp
        let queens = Position::from_fen("kqqqqqqq/8/8/8/8/8/8/KQQQQQQQ w - - 0 1").unwrap();
        assert_eq!(game_phase(&queens), TOTAL_PHASE);
    }

    #[test]
    fn test_bishop_pair_term() {
        let pair = Position::from_fen("k7/8/8/8/8/8/8/KBB5 w - - 0 1").unwrap();
        let single = Position::from_fen("k7/8/8/8/8/8/8/KB6 w - - 0 1").unwrap();
        let with_pair = evaluate(&pair);
        let without = evaluate(&single);
        // Pair is worth more than a second bishop's material alone
        let bishop_alone = MATERIAL[Piece::Bishop.index()].taper(game_phase(&pair));
        assert!(with_pair - without > bishop_alone - 50);
    }

    #[test]
    fn test_doubled_pawns_penalized() {
        let doubled = Position::from_fen("k7/8/8/8/8/4P3/4P3/K7 w - - 0 1").unwrap();
        let healthy = Position::from_fen("k7/8/8/8/8/8/3PP3/K7 w - - 0 1").unwrap();
        assert!(evaluate(&healthy) > evaluate(&doubled));
    }

    #[test]
    fn test_passed_pawn_rank_scaling() {
        // The same passed pawn is worth more the further it has advanced
        let far = Position::from_fen("k7/8/4P3/8/8/8/8/K7 w - - 0 1").unwrap();
        let near = Position::from_fen("k7/8/8/8/8/4P3/8/K7 w - - 0 1").unwrap();
        assert!(evaluate(&far) > evaluate(&near));
    }

    #[test]
    fn test_pawn_blocks_passer() {
        // An enemy pawn directly ahead stops the passer bonus
        let passed = Position::from_fen("k7/8/8/4P3/8/8/8/K7 w - - 0 1").unwrap();
        let blocked = Position::from_fen("k7/4p3/8/4P3/8/8/8/K7 w - - 0 1").unwrap();
        assert!(evaluate(&passed) - evaluate(&blocked) > 20);
    }

    #[test]
    fn test_rook_open_file_bonus() {
        let open = Position::from_fen("k7/8/8/8/8/8/4P3/R6K w - - 0 1").unwrap();
        let closed = Position::from_fen("k7/8/8/8/8/8/P7/R6K w - - 0 1").unwrap();
        assert!(evaluate(&open) > evaluate(&closed));
    }

    #[test]
    fn test_mate_score_classification() {
        assert!(is_mate_score(MATE - 5));
        assert!(is_mate_score(-(MATE - 5)));
        assert!(!is_mate_score(900));
        assert!(!is_mate_score(MATE_THRESHOLD - 1));
    }
}
