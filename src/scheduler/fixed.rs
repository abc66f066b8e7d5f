//! Fixed-constraint applier.
//!
//! Seeds a section's grid with locked slots before any engine runs.
//! Locked cells are write-once: every later engine only writes free
//! cells, so nothing can overwrite them.

use rand::Rng;

use super::context::SectionContext;
use super::demand::SessionDemand;
use crate::models::{Diagnostic, Grid, LockedSlot, PlacedEntry, Slot};

/// Writes every applicable lock into the grid.
///
/// A lock that runs off the grid, crosses the lunch break, overlaps an
/// earlier lock, or asks for more periods than the subject still needs
/// is rejected with a `LockConflict` diagnostic; the rest still apply.
/// A lock whose teacher is already booked elsewhere at that time is kept
/// but also reported as a `LockConflict`.
pub(crate) fn apply_locks<R: Rng + ?Sized>(
    grid: &mut Grid,
    demands: &mut [SessionDemand],
    ctx: &mut SectionContext<'_, R>,
) {
    let section = ctx.section;
    for demand in demands.iter_mut() {
        let locks = std::mem::take(&mut demand.locks);
        for lock in &locks {
            if let Err(reason) = check_lock(grid, demand, lock) {
                ctx.report(Diagnostic::lock_conflict(
                    section,
                    &demand.code,
                    format!(
                        "lock at day {} period {} (x{}) rejected: {reason}",
                        lock.day, lock.period, lock.duration
                    ),
                ));
                continue;
            }

            let slot = Slot::new(lock.day, lock.period);
            let (code, teacher, elective) =
                (demand.code.clone(), demand.teacher.clone(), demand.is_elective());
            let placed = grid.place_run(lock.day, lock.period, lock.duration, |is_start| {
                PlacedEntry::cell(&code, &teacher, lock.duration, is_start)
                    .locked()
                    .elective(elective)
            });
            if !placed {
                continue;
            }
            demand.consume(slot.is_saturday(), lock.duration as u32);
            if elective {
                ctx.note_elective(&code, slot, lock.duration);
            }

            let reservation = &ctx.state.reservation;
            let booked = (0..lock.duration).any(|k| {
                let at = slot.offset(k);
                if elective {
                    reservation.is_teacher_busy_for_elective(at, &teacher, &code, &ctx.owner)
                } else {
                    reservation.is_teacher_busy(at, &teacher)
                }
            });
            if booked {
                ctx.report(Diagnostic::lock_conflict(
                    section,
                    &code,
                    format!(
                        "lock at day {} period {} (x{}) kept but teacher {teacher} is already booked",
                        lock.day, lock.period, lock.duration
                    ),
                ));
            }
        }
        demand.locks = locks;
    }
}

fn check_lock(grid: &Grid, demand: &SessionDemand, lock: &LockedSlot) -> Result<(), String> {
    if !lock.is_well_formed() {
        return Err("crosses the lunch break or runs off the grid".to_string());
    }
    if !grid.is_run_free(lock.day, lock.period, lock.duration) {
        return Err("overlaps another locked slot".to_string());
    }
    let remaining = demand.remaining_for(Slot::new(lock.day, lock.period).is_saturday());
    if lock.duration as u32 > remaining {
        return Err(format!(
            "needs {} periods but only {remaining} remain",
            lock.duration
        ));
    }
    Ok(())
}
