//! Block (lab) placement engine.
//!
//! Places contiguous multi-period blocks for labs, integrated subjects
//! and practical electives before theory periods fill the rest.
//!
//! # Algorithm
//!
//! Per block subject, while two or more weekday periods remain and the
//! attempt budget lasts:
//! 1. Block length is 4, 3 or 2 depending on what remains.
//! 2. Days are tried in the section's rotation (its light day last).
//!    Pass 0 skips days that already hold a block or on which the same
//!    lab ran in an earlier section; pass 1 drops both restrictions.
//! 3. Starts at session openings (periods 0 and 4) are tried before any
//!    other start that does not cross lunch.
//! 4. A run is rejected if a cell is taken, the lab-room capacity is
//!    exhausted in any of its slots, or the teacher is busy elsewhere.
//! 5. A failed search retries with a shorter block.
//!
//! One Saturday block follows when two or more Saturday periods remain.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::context::SectionContext;
use super::demand::SessionDemand;
use crate::models::{block_starts, Grid, PlacedEntry, Slot, SATURDAY};

/// Longest block carved out of `remaining` periods.
pub(crate) fn block_duration(remaining: u32) -> usize {
    match remaining {
        r if r >= 4 => 4,
        3 => 3,
        _ => 2,
    }
}

/// Weekday search order for a section.
///
/// The section letter picks one "light" weekday (A→Monday, B→Tuesday, ...)
/// which goes last, so different sections keep different days free.
pub(crate) fn weekday_order(section: &str) -> Vec<usize> {
    let offset = section
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map_or(0, |c| (c.to_ascii_uppercase() as u8 - b'A') as usize);
    let light = offset % SATURDAY;
    (0..SATURDAY)
        .filter(|&d| d != light)
        .chain(std::iter::once(light))
        .collect()
}

/// Places blocks for every block subject.
pub(crate) fn place_blocks<R: Rng + ?Sized>(
    grid: &mut Grid,
    demands: &mut [SessionDemand],
    ctx: &mut SectionContext<'_, R>,
) {
    let day_order = weekday_order(ctx.section);
    for demand in demands.iter_mut().filter(|d| d.is_block) {
        place_weekday_blocks(grid, demand, &day_order, ctx);
        if ctx.config.saturday_blocks {
            place_saturday_block(grid, demand, ctx);
        }
        if demand.remaining_weekly >= 2 {
            debug!(
                event = "block_remainder",
                section = ctx.section,
                subject = %demand.code,
                remaining = demand.remaining_weekly,
                "block periods left for theory placement"
            );
        }
    }
}

fn place_weekday_blocks<R: Rng + ?Sized>(
    grid: &mut Grid,
    demand: &mut SessionDemand,
    day_order: &[usize],
    ctx: &mut SectionContext<'_, R>,
) {
    let max_blocks = if demand.kind.is_integrated() {
        ctx.config.integrated_max_blocks
    } else {
        None
    };
    let mut blocks = (0..SATURDAY)
        .filter(|&d| {
            grid.day(d)
                .is_some_and(|row| row.iter().flatten().any(|e| e.code == demand.code && e.is_lab))
        })
        .count() as u32;
    let mut longest = 4;
    let mut attempts = 0;

    while demand.remaining_weekly >= 2
        && attempts < ctx.config.block_attempt_budget
        && max_blocks.map_or(true, |max| blocks < max)
    {
        attempts += 1;
        let duration = block_duration(demand.remaining_weekly).min(longest);
        match find_weekday_run(grid, demand, duration, day_order, ctx) {
            Some(slot) => {
                commit(grid, demand, slot, duration, ctx);
                blocks += 1;
            }
            None if duration > 2 => longest = duration - 1,
            None => break,
        }
    }
}

fn find_weekday_run<R: Rng + ?Sized>(
    grid: &Grid,
    demand: &SessionDemand,
    duration: usize,
    day_order: &[usize],
    ctx: &mut SectionContext<'_, R>,
) -> Option<Slot> {
    for relaxed in [false, true] {
        for &day in day_order {
            if grid.has_code_on_day(day, &demand.code) {
                continue;
            }
            if !relaxed
                && (grid.has_block_on_day(day)
                    || ctx.state.reservation.lab_used_on_day(day, &demand.code))
            {
                continue;
            }
            if let Some(start) = find_start(grid, demand, day, duration, ctx) {
                if relaxed {
                    debug!(
                        event = "block_relaxed",
                        section = ctx.section,
                        subject = %demand.code,
                        day,
                        "second block on a day"
                    );
                }
                return Some(Slot::new(day, start));
            }
        }
    }
    None
}

fn place_saturday_block<R: Rng + ?Sized>(
    grid: &mut Grid,
    demand: &mut SessionDemand,
    ctx: &mut SectionContext<'_, R>,
) {
    if demand.remaining_saturday < 2
        || grid.has_block_on_day(SATURDAY)
        || grid.has_code_on_day(SATURDAY, &demand.code)
    {
        return;
    }
    for duration in (2..=block_duration(demand.remaining_saturday)).rev() {
        if let Some(start) = find_start(grid, demand, SATURDAY, duration, ctx) {
            commit(grid, demand, Slot::new(SATURDAY, start), duration, ctx);
            return;
        }
    }
}

/// First usable start on `day`, session openings first, shuffled
/// within each group.
fn find_start<R: Rng + ?Sized>(
    grid: &Grid,
    demand: &SessionDemand,
    day: usize,
    duration: usize,
    ctx: &mut SectionContext<'_, R>,
) -> Option<usize> {
    let (mut preferred, mut fallback) = block_starts(duration);
    preferred.shuffle(&mut *ctx.rng);
    fallback.shuffle(&mut *ctx.rng);
    preferred
        .into_iter()
        .chain(fallback)
        .find(|&start| run_available(grid, demand, Slot::new(day, start), duration, ctx))
}

fn run_available<R: Rng + ?Sized>(
    grid: &Grid,
    demand: &SessionDemand,
    slot: Slot,
    duration: usize,
    ctx: &SectionContext<'_, R>,
) -> bool {
    grid.is_run_free(slot.day, slot.period, duration)
        && (0..duration)
            .all(|k| ctx.state.reservation.labs_running(slot.offset(k)) < ctx.config.lab_capacity)
        && !ctx.teacher_busy(slot, duration, &demand.teacher)
}

fn commit<R: Rng + ?Sized>(
    grid: &mut Grid,
    demand: &mut SessionDemand,
    slot: Slot,
    duration: usize,
    ctx: &mut SectionContext<'_, R>,
) {
    let elective = demand.is_elective();
    let placed = grid.place_run(slot.day, slot.period, duration, |is_start| {
        PlacedEntry::cell(&demand.code, &demand.teacher, duration, is_start).elective(elective)
    });
    if !placed {
        return;
    }
    demand.consume(slot.is_saturday(), duration as u32);
    for k in 0..duration {
        let cell = slot.offset(k);
        if let Some(entry) = grid.get(cell) {
            ctx.state.reservation.reserve(&ctx.owner, cell, entry);
        }
    }
    if elective {
        ctx.note_elective(&demand.code, slot, duration);
    }
    debug!(
        event = "block_placed",
        section = ctx.section,
        subject = %demand.code,
        day = slot.day,
        start = slot.period,
        duration,
    );
}
