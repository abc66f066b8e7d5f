//! Theory placement engine.
//!
//! Fills free cells with single periods drawn from two pools (weekday
//! and Saturday) holding one entry per remaining period of each subject.
//!
//! # Selection
//!
//! For each free cell, day by day:
//! 1. Candidates are pool subjects whose teacher is free in the slot and
//!    that are not already on this day.
//! 2. A subject may repeat on a day only when its remaining pool entries
//!    outnumber the later days that still have a free cell, or the whole
//!    pool outnumbers the free cells left on those days; otherwise the
//!    cell stays empty for a later subject or for compaction.
//! 3. The first candidate with zero slot conflicts wins, else the one
//!    with the fewest. Pools are shuffled once per section, so ties break
//!    randomly.

use rand::seq::SliceRandom;
use rand::Rng;

use super::context::SectionContext;
use super::demand::SessionDemand;
use crate::models::{Grid, PlacedEntry, Slot, DAYS, PERIODS, SATURDAY};

/// Fills every free cell it can with single theory periods.
pub(crate) fn place_theory<R: Rng + ?Sized>(
    grid: &mut Grid,
    demands: &mut [SessionDemand],
    ctx: &mut SectionContext<'_, R>,
) {
    let mut weekday_pool = expand_pool(demands, false);
    let mut saturday_pool = expand_pool(demands, true);
    weekday_pool.shuffle(&mut *ctx.rng);
    saturday_pool.shuffle(&mut *ctx.rng);

    for day in 0..DAYS {
        let (pool, horizon) = if day == SATURDAY {
            (&mut saturday_pool, Horizon::default())
        } else {
            (&mut weekday_pool, Horizon::after(grid, day))
        };

        for period in 0..PERIODS {
            let slot = Slot::new(day, period);
            if pool.is_empty() || !grid.is_free(slot) {
                continue;
            }
            let Some(pos) = choose(grid, demands, pool, slot, horizon, ctx) else {
                continue;
            };
            let idx = pool.remove(pos);
            let demand = &mut demands[idx];
            let entry = PlacedEntry::single(&demand.code, &demand.teacher)
                .elective(demand.is_elective());
            if grid.place(slot, entry) {
                demand.consume(slot.is_saturday(), 1);
                if demand.is_elective() {
                    ctx.note_elective(&demand.code, slot, 1);
                }
            }
        }
    }
}

/// Room left in the pool's later days.
#[derive(Debug, Clone, Copy, Default)]
struct Horizon {
    /// Later days with at least one free cell.
    days: usize,
    /// Free cells over those days.
    cells: usize,
}

impl Horizon {
    /// Room on the weekdays after `day`.
    fn after(grid: &Grid, day: usize) -> Self {
        (day + 1..SATURDAY).fold(Self::default(), |acc, d| {
            let free = (0..PERIODS)
                .filter(|&p| grid.is_free(Slot::new(d, p)))
                .count();
            Self {
                days: acc.days + usize::from(free > 0),
                cells: acc.cells + free,
            }
        })
    }
}

/// One pool entry (a demand index) per remaining period.
fn expand_pool(demands: &[SessionDemand], saturday: bool) -> Vec<usize> {
    demands
        .iter()
        .enumerate()
        .flat_map(|(idx, d)| std::iter::repeat(idx).take(d.remaining_for(saturday) as usize))
        .collect()
}

/// Picks a pool position for `slot`.
fn choose<R: Rng + ?Sized>(
    grid: &Grid,
    demands: &[SessionDemand],
    pool: &[usize],
    slot: Slot,
    horizon: Horizon,
    ctx: &SectionContext<'_, R>,
) -> Option<usize> {
    let available: Vec<usize> = (0..pool.len())
        .filter(|&pos| {
            !ctx
                .state
                .reservation
                .is_teacher_busy(slot, &demands[pool[pos]].teacher)
        })
        .collect();

    let fresh: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&pos| !grid.has_code_on_day(slot.day, &demands[pool[pos]].code))
        .collect();

    let candidates = if fresh.is_empty() {
        // Repeat only what cannot fit on the remaining days
        let overflow = pool.len() > horizon.cells;
        available
            .into_iter()
            .filter(|&pos| {
                let idx = pool[pos];
                overflow || pool.iter().filter(|&&i| i == idx).count() > horizon.days
            })
            .collect()
    } else {
        fresh
    };

    let mut best: Option<(usize, usize)> = None;
    for pos in candidates {
        let score = slot_conflicts(grid, &demands[pool[pos]], slot, ctx.peers);
        if score == 0 {
            return Some(pos);
        }
        if best.map_or(true, |(_, s)| score < s) {
            best = Some((pos, score));
        }
    }
    best.map(|(pos, _)| pos)
}

/// Rows that already hold `demand` at the same period: other days of this
/// grid plus the same slot in sections generated earlier. Shared electives
/// are meant to coincide across sections, so only this grid counts for them.
fn slot_conflicts(grid: &Grid, demand: &SessionDemand, slot: Slot, peers: &[Grid]) -> usize {
    let same_period = (0..DAYS)
        .filter(|&d| d != slot.day)
        .filter(|&d| {
            grid.get(Slot::new(d, slot.period))
                .is_some_and(|e| e.code == demand.code)
        })
        .count();
    if demand.is_elective() {
        return same_period;
    }
    let cross_section = peers
        .iter()
        .filter(|peer| peer.get(slot).is_some_and(|e| e.code == demand.code))
        .count();
    same_period + cross_section
}
