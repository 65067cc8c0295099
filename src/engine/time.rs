//! Time allocation for clock-driven games.

use std::time::Duration;

/// Never move faster than this, even in extreme time trouble
const MIN_SEARCH: Duration = Duration::from_millis(50);
/// Fraction of the remaining clock budgeted per move
const MOVES_HORIZON: u32 = 30;
/// Never spend more than this fraction of the remaining clock on one move
const PANIC_DIVISOR: u32 = 3;

/// Compute the time budget for the next move from the remaining clock and
/// the per-move increment: `remaining/30 + increment`, clamped above by
/// `remaining/3` and below by 50 ms.
#[must_use]
pub fn allocate(remaining: Duration, increment: Duration) -> Duration {
    let base = remaining / MOVES_HORIZON + increment;
    let cap = remaining / PANIC_DIVISOR;
    base.min(cap).max(MIN_SEARCH)
}
