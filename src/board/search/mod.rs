//! Search: iterative deepening alpha-beta with principal-variation search,
//! null-move pruning, late-move reductions, quiescence and killer moves.
//!
//! One `Search` drives one position with one transposition table. The only
//! cross-thread cooperation is the optional atomic stop flag, sampled every
//! 1024 nodes; everything else is single-threaded by design.

pub(crate) mod move_order;
mod negamax;
mod quiescence;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use crate::tt::{score_to_tt, Bound, TranspositionTable};

use super::eval::{INFINITY, MATE};
use super::position::Position;
use super::types::{Move, MAX_PLY};

/// Search limits and the external stop channel.
#[derive(Clone)]
pub struct SearchConfig {
    /// Wall-clock budget for this search
    pub search_time: Duration,
    /// Maximum iterative-deepening depth
    pub max_depth: i32,
    /// External stop signal (UCI "stop"), sampled every 1024 nodes
    pub stop: Option<Arc<AtomicBool>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            search_time: Duration::from_millis(1000),
            max_depth: 64,
            stop: None,
        }
    }
}

/// Emitted once per completed root depth.
#[derive(Clone, Debug)]
pub struct SearchInfo {
    pub depth: i32,
    /// Side-to-move-relative score in centipawns (mate-distance encoded)
    pub score: i32,
    pub nodes: u64,
    pub time_ms: u64,
    pub pv: Vec<Move>,
}

/// Info callback, invoked synchronously from the search. Must not re-enter
/// the search.
pub type InfoCallback<'a> = Box<dyn FnMut(&SearchInfo) + 'a>;

/// Two quiet moves per ply that caused a beta cutoff.
pub(crate) struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    fn new() -> Self {
        KillerTable {
            slots: [[Move::null(); 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub(crate) fn get(&self, ply: usize) -> [Move; 2] {
        if ply < MAX_PLY {
            self.slots[ply]
        } else {
            [Move::null(); 2]
        }
    }

    pub(crate) fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        if self.slots[ply][0] != mv {
            self.slots[ply][1] = self.slots[ply][0];
            self.slots[ply][0] = mv;
        }
    }

    fn reset(&mut self) {
        self.slots = [[Move::null(); 2]; MAX_PLY];
    }
}

/// Late-move reduction table: `lmr[depth][move_index] = floor(ln(d)·ln(m)/2)`.
pub(crate) static LMR_TABLE: Lazy<[[i32; 64]; 64]> = Lazy::new(|| {
    let mut table = [[0i32; 64]; 64];
    for (depth, row) in table.iter_mut().enumerate().skip(1) {
        for (index, cell) in row.iter_mut().enumerate().skip(1) {
            *cell = ((depth as f64).ln() * (index as f64).ln() / 2.0).floor() as i32;
        }
    }
    table
});

/// One search over one position. Borrows the transposition table for its
/// lifetime; the position is copied so the caller's board is untouched by
/// the traversal.
pub struct Search<'a> {
    pub(crate) pos: Position,
    pub(crate) config: SearchConfig,
    pub(crate) tt: &'a mut TranspositionTable,
    info_callback: Option<InfoCallback<'a>>,
    /// Hashes of positions played before this search (for three-fold)
    pub(crate) game_history: Vec<u64>,
    /// Hashes pushed on the way down the tree (index = ply)
    pub(crate) search_stack: Vec<u64>,
    pub(crate) killers: KillerTable,
    pub(crate) start_time: Instant,
    pub(crate) stopped: bool,
    pub(crate) nodes: u64,
}

impl<'a> Search<'a> {
    #[must_use]
    pub fn new(pos: &Position, config: SearchConfig, tt: &'a mut TranspositionTable) -> Self {
        Search {
            pos: pos.clone(),
            config,
            tt,
            info_callback: None,
            game_history: Vec::new(),
            search_stack: Vec::with_capacity(MAX_PLY),
            killers: KillerTable::new(),
            start_time: Instant::now(),
            stopped: false,
            nodes: 0,
        }
    }

    /// Provide the hashes of the game played so far, newest last. Needed
    /// for three-fold repetition detection across the search boundary.
    #[must_use]
    pub fn with_game_history(mut self, history: Vec<u64>) -> Self {
        self.game_history = history;
        self
    }

    /// Attach a per-depth info callback.
    #[must_use]
    pub fn with_info_callback(mut self, callback: InfoCallback<'a>) -> Self {
        self.info_callback = Some(callback);
        self
    }

    #[must_use]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Iterative deepening driver. Returns the best move, or `None` when
    /// the root has no legal moves.
    pub fn find_best_move(&mut self) -> Option<Move> {
        self.start_time = Instant::now();
        self.stopped = false;
        self.nodes = 0;
        self.search_stack.clear();
        self.killers.reset();
        self.tt.new_search();

        let mut best: Option<Move> = None;
        let mut best_score = -INFINITY;

        for depth in 1..=self.config.max_depth {
            let mut moves = self.pos.legal_moves();
            if moves.is_empty() {
                break;
            }

            // Root ordering: TT hint first, captures by MVV-LVA after
            let tt_move = self
                .tt
                .probe(self.pos.hash())
                .map_or(Move::null(), |probe| probe.best_move);
            move_order::sort_with_tt(&mut moves, &self.pos, tt_move);

            let mut alpha = -INFINITY;
            let beta = INFINITY;
            let mut depth_best = Move::null();
            let mut depth_score = -INFINITY;
            let mut completed = 0usize;

            for (i, &m) in moves.as_slice().iter().enumerate() {
                self.search_stack.push(self.pos.hash());
                let undo = self.pos.make_move(m);
                self.nodes += 1;
                let gives_check = self.pos.is_in_check(self.pos.side_to_move());

                let score = if i == 0 {
                    -self.negamax(depth - 1, -beta, -alpha, 1, gives_check, true)
                } else {
                    let zw = -self.negamax(depth - 1, -alpha - 1, -alpha, 1, gives_check, true);
                    if zw > alpha && zw < beta {
                        -self.negamax(depth - 1, -beta, -alpha, 1, gives_check, true)
                    } else {
                        zw
                    }
                };

                self.pos.unmake_move(m, undo);
                self.search_stack.pop();

                if self.stopped {
                    break;
                }
                completed += 1;

                if score > depth_score {
                    depth_score = score;
                    depth_best = m;
                }
                if score > alpha {
                    alpha = score;
                }
            }

            if self.stopped {
                // Keep the partial iteration's best only if at least one
                // root move finished with a trustworthy score
                if completed > 0 && !depth_best.is_null() {
                    best = Some(depth_best);
                    best_score = depth_score;
                }
                break;
            }

            best = Some(depth_best);
            best_score = depth_score;

            self.tt.store(
                self.pos.hash(),
                score_to_tt(best_score, 0),
                depth,
                Bound::Exact,
                depth_best,
            );

            if self.info_callback.is_some() {
                let pv = self.extract_pv(depth as usize);
                let info = SearchInfo {
                    depth,
                    score: best_score,
                    nodes: self.nodes,
                    time_ms: self.start_time.elapsed().as_millis() as u64,
                    pv,
                };
                if let Some(callback) = self.info_callback.as_mut() {
                    callback(&info);
                }
            }

            // A forced mate this close cannot be improved within the depth
            // budget; stop early
            if best_score >= MATE - self.config.max_depth {
                break;
            }
        }

        best
    }

    /// Walk TT best-moves from the root to recover the principal variation.
    /// Stops on a null move, a missing entry, an illegal move or a cycle.
    pub(crate) fn extract_pv(&mut self, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut pos = self.pos.clone();
        let mut seen: Vec<u64> = Vec::with_capacity(max_len);

        while pv.len() < max_len {
            let hash = pos.hash();
            if seen.contains(&hash) {
                break;
            }
            seen.push(hash);

            let Some(probe) = self.tt.probe(hash) else { break };
            let mv = probe.best_move;
            if mv.is_null() || !pos.is_legal_move(mv) {
                break;
            }
            pv.push(mv);
            let _ = pos.make_move(mv);
        }
        pv
    }

    /// Called every 1024 nodes: raise the stop flag on an external signal
    /// or an exhausted time budget.
    pub(crate) fn check_time(&mut self) {
        if let Some(stop) = &self.config.stop {
            if stop.load(std::sync::atomic::Ordering::Relaxed) {
                self.stopped = true;
                return;
            }
        }
        if self.start_time.elapsed() >= self.config.search_time {
            self.stopped = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Square;

    #[test]
    fn test_lmr_table_shape() {
        assert_eq!(LMR_TABLE[0][5], 0);
        assert_eq!(LMR_TABLE[5][0], 0);
        assert_eq!(LMR_TABLE[1][1], 0);
        // ln(20) * ln(20) / 2 ~ 4.48
        assert_eq!(LMR_TABLE[20][20], 4);
        // reductions grow with both depth and index
        assert!(LMR_TABLE[63][63] >= LMR_TABLE[10][10]);
    }

    #[test]
    fn test_killer_table_shift() {
        let mut killers = KillerTable::new();
        let a = Move::quiet(Square::new(0, 0), Square::new(0, 1));
        let b = Move::quiet(Square::new(1, 0), Square::new(1, 1));
        killers.update(3, a);
        assert_eq!(killers.get(3), [a, Move::null()]);
        // storing the same move again does not shift it into both slots
        killers.update(3, a);
        assert_eq!(killers.get(3), [a, Move::null()]);
        killers.update(3, b);
        assert_eq!(killers.get(3), [b, a]);
    }
}
