//! Elective synchronizer.
//!
//! Students of several sections attend a shared elective together, so
//! once the first section has placed it, every later section replays the
//! same slots instead of searching.

use rand::Rng;

use super::context::SectionContext;
use super::demand::SessionDemand;
use crate::models::{Diagnostic, Grid, PlacedEntry};

/// Replays recorded elective placements into the grid.
///
/// A recorded slot already taken in this section, or one where the
/// teacher is booked for anything but this same elective, is a
/// `SyncConflict`; the periods it would have covered stay on the demand
/// and fall through to the normal engines.
pub(crate) fn replay_electives<R: Rng + ?Sized>(
    grid: &mut Grid,
    demands: &mut [SessionDemand],
    ctx: &mut SectionContext<'_, R>,
) {
    let section = ctx.section;
    for demand in demands.iter_mut().filter(|d| d.is_elective()) {
        let Some(placements) = ctx.state.electives.get(&demand.code).map(<[_]>::to_vec) else {
            continue;
        };
        let (code, teacher) = (demand.code.clone(), demand.teacher.clone());

        for placement in placements {
            let saturday = placement.slot.is_saturday();
            let periods = placement.duration as u32;
            if demand.remaining_for(saturday) < periods {
                continue;
            }
            let teacher_booked = (0..placement.duration).any(|k| {
                ctx.state.reservation.is_teacher_busy_for_elective(
                    placement.slot.offset(k),
                    &teacher,
                    &code,
                    &ctx.owner,
                )
            });
            if teacher_booked {
                ctx.report(Diagnostic::sync_conflict(
                    section,
                    &code,
                    format!(
                        "teacher {} is booked at synchronized slot day {} period {}",
                        teacher, placement.slot.day, placement.slot.period
                    ),
                ));
                continue;
            }
            let placed = grid.place_run(
                placement.slot.day,
                placement.slot.period,
                placement.duration,
                |is_start| {
                    PlacedEntry::cell(&code, &teacher, placement.duration, is_start)
                        .elective(true)
                        .synced()
                },
            );
            if placed {
                demand.consume(saturday, periods);
            } else {
                ctx.report(Diagnostic::sync_conflict(
                    section,
                    &code,
                    format!(
                        "synchronized slot day {} period {} is occupied",
                        placement.slot.day, placement.slot.period
                    ),
                ));
            }
        }
    }
}
