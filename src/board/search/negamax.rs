//! Negamax with alpha-beta, principal-variation search, null-move pruning
//! and late-move reductions.

use crate::tt::{score_from_tt, score_to_tt, Bound};

use super::super::eval::{evaluate, DRAW, INFINITY, MATE};
use super::super::types::{Move, MAX_PLY};
use super::{move_order, Search, LMR_TABLE};

/// Null-move pruning applies from this depth on
const NULL_MOVE_MIN_DEPTH: i32 = 3;
/// Depth reduction for the null-move verification search
const NULL_MOVE_REDUCTION: i32 = 2;

impl Search<'_> {
    /// Alpha-beta search to `depth` plies, negamax form. `in_check` is the
    /// side-to-move check state at this node; `null_ok` gates null-move
    /// pruning so two null moves never follow each other.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn negamax(
        &mut self,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        ply: i32,
        in_check: bool,
        null_ok: bool,
    ) -> i32 {
        if self.nodes & 1023 == 0 {
            self.check_time();
        }
        if self.stopped {
            return 0;
        }

        // Game-theoretic draws come before anything else
        if self.pos.is_fifty_move_draw() || self.is_repetition() {
            return DRAW;
        }

        if depth <= 0 {
            return self.quiescence(alpha, beta, ply);
        }
        if ply as usize >= MAX_PLY {
            return evaluate(&self.pos);
        }

        let is_pv = beta - alpha > 1;

        // Transposition table: cutoffs only at non-PV nodes with enough
        // depth, but the stored move always helps ordering
        let mut tt_move = Move::null();
        if let Some(probe) = self.tt.probe(self.pos.hash()) {
            tt_move = probe.best_move;
            if !is_pv && probe.depth >= depth {
                let score = score_from_tt(probe.score, ply);
                match probe.bound {
                    Bound::Exact => return score,
                    Bound::Lower if score >= beta => return score,
                    Bound::Upper if score <= alpha => return score,
                    _ => {}
                }
            }
        }

        // Null-move pruning: hand the opponent a free move; if the reduced
        // search still fails high, this node is good enough to cut
        if null_ok && !is_pv && !in_check && depth >= NULL_MOVE_MIN_DEPTH {
            self.search_stack.push(self.pos.hash());
            let undo = self.pos.make_null_move();
            let score = -self.negamax(
                depth - 1 - NULL_MOVE_REDUCTION,
                -beta,
                -beta + 1,
                ply + 1,
                false,
                false,
            );
            self.pos.unmake_null_move(undo);
            self.search_stack.pop();

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
        }

        let mut moves = self.pos.legal_moves();
        if moves.is_empty() {
            return if in_check { -(MATE - ply) } else { DRAW };
        }

        let killers = self.killers.get(ply as usize);
        move_order::sort_full(&mut moves, &self.pos, tt_move, &killers);

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = Move::null();

        for (i, &m) in moves.as_slice().iter().enumerate() {
            self.search_stack.push(self.pos.hash());
            let undo = self.pos.make_move(m);
            self.nodes += 1;
            let gives_check = self.pos.is_in_check(self.pos.side_to_move());

            let score = if i == 0 {
                -self.negamax(depth - 1, -beta, -alpha, ply + 1, gives_check, true)
            } else {
                // Late quiet moves get a reduced zero-window probe first
                let mut reduction = 0;
                if depth >= 3
                    && i >= 2
                    && !in_check
                    && !gives_check
                    && !m.is_capture()
                    && !m.is_promotion()
                {
                    reduction = LMR_TABLE[depth.min(63) as usize][i.min(63)];
                    reduction = reduction.min(depth - 2);
                }

                let mut zw = -self.negamax(
                    depth - 1 - reduction,
                    -alpha - 1,
                    -alpha,
                    ply + 1,
                    gives_check,
                    true,
                );
                if reduction > 0 && zw > alpha {
                    zw = -self.negamax(depth - 1, -alpha - 1, -alpha, ply + 1, gives_check, true);
                }
                if zw > alpha && zw < beta {
                    zw = -self.negamax(depth - 1, -beta, -alpha, ply + 1, gives_check, true);
                }
                zw
            };

            self.pos.unmake_move(m, undo);
            self.search_stack.pop();

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if m.is_quiet() {
                    self.killers.update(ply as usize, m);
                }
                break;
            }
        }

        let bound = if alpha >= beta {
            Bound::Lower
        } else if best_score > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(
            self.pos.hash(),
            score_to_tt(best_score, ply),
            depth,
            bound,
            best_move,
        );

        best_score
    }

    /// Repetition test for the current position.
    ///
    /// Walks the search stack newest-first, at most `halfmove_clock`
    /// entries: any match is an immediate draw (two-fold within the
    /// search). If the clock reaches further back than the search stack,
    /// the remainder is looked up in the pre-search game history, where two
    /// matches make a three-fold counting the current position. A pawn move
    /// or capture resets the clock, so nothing past it is ever scanned.
    pub(crate) fn is_repetition(&self) -> bool {
        let current = self.pos.hash();
        let clock = self.pos.halfmove_clock() as usize;

        let mut scanned = 0usize;
        for &hash in self.search_stack.iter().rev() {
            if scanned >= clock {
                return false;
            }
            scanned += 1;
            if hash == current {
                return true;
            }
        }

        let remainder = clock - scanned;
        let mut matches = 0;
        for &hash in self.game_history.iter().rev().take(remainder) {
            if hash == current {
                matches += 1;
                if matches >= 2 {
                    return true;
                }
            }
        }
        false
    }
}
