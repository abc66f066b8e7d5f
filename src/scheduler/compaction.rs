//! Gap compaction.
//!
//! Pulls single-period sessions left into empty cells on the same day so
//! free periods collect at the end of each day. Multi-period, locked and
//! elective entries never move, and nothing moves past one.

use rand::Rng;
use tracing::debug;

use super::context::SectionContext;
use crate::models::{Grid, Slot, DAYS, PERIODS};

/// Compacts every day of `grid`. Returns the number of moves made.
pub(crate) fn compact<R: Rng + ?Sized>(grid: &mut Grid, ctx: &SectionContext<'_, R>) -> usize {
    let mut moves = 0;
    for day in 0..DAYS {
        for period in 0..PERIODS {
            let target = Slot::new(day, period);
            if !grid.is_free(target) {
                continue;
            }
            if let Some(from) = find_mover(grid, target, ctx) {
                if grid.shift(from, target) {
                    moves += 1;
                }
            }
        }
    }
    if moves > 0 {
        debug!(event = "compacted", section = ctx.section, moves);
    }
    moves
}

/// First later entry on the same day that may move into `target`.
fn find_mover<R: Rng + ?Sized>(
    grid: &Grid,
    target: Slot,
    ctx: &SectionContext<'_, R>,
) -> Option<Slot> {
    for period in target.period + 1..PERIODS {
        let from = Slot::new(target.day, period);
        let Some(entry) = grid.get(from) else {
            continue;
        };
        if entry.duration > 1 {
            return None;
        }
        if !entry.is_movable() {
            continue;
        }
        if ctx.state.reservation.is_teacher_busy(target, &entry.teacher) {
            continue;
        }
        return Some(from);
    }
    None
}
