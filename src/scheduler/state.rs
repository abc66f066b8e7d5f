//! Run-scoped accumulators shared by the sections of one generation.
//!
//! `GlobalReservation` records which teachers and labs are busy in each
//! slot; `ElectiveSyncMap` records where each shared elective landed.
//! Both are threaded by reference through the section loop and dropped
//! when the run ends.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{split_teachers, teacher_key, Grid, PlacedEntry, Slot, DAYS, PERIODS};

/// One teacher booking: which section holds the teacher and for what.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TeacherBooking {
    /// Owner label (`semester/section`).
    pub owner: String,
    /// Subject code of the booked cell.
    pub code: String,
    /// Whether the cell is a shared elective.
    pub is_elective: bool,
}

impl TeacherBooking {
    /// Whether this booking is the same shared elective taught in another
    /// section of `owner`'s semester.
    fn is_joint_elective(&self, owner: &str, code: &str) -> bool {
        self.is_elective && self.code == code && semester_of(&self.owner) == semester_of(owner)
    }
}

fn semester_of(owner: &str) -> &str {
    owner.split_once('/').map_or(owner, |(semester, _)| semester)
}

/// Occupancy of one slot across all sections seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotReservation {
    /// Bookings per normalized teacher name.
    pub teachers: BTreeMap<String, BTreeSet<TeacherBooking>>,
    /// Owners (sections) with a lab running in this slot.
    pub labs: BTreeSet<String>,
    /// Owners (sections) with a lab starting in this slot.
    pub lab_starts: BTreeSet<String>,
}

/// Teacher and lab occupancy accumulated during one run.
///
/// Keyed by owner label so re-reserving the same section's entries is
/// idempotent: an engine may mark a block as soon as it is placed and the
/// orchestrator may fold the finished grid afterwards.
#[derive(Debug, Clone, Default)]
pub struct GlobalReservation {
    slots: [[SlotReservation; PERIODS]; DAYS],
    lab_days: BTreeSet<(usize, String)>,
}

impl GlobalReservation {
    /// Creates an empty reservation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a reservation from grids generated earlier, e.g. the other
    /// semesters, so their teachers stay unavailable.
    pub fn from_grids<'a>(grids: impl IntoIterator<Item = (&'a str, &'a Grid)>) -> Self {
        let mut reservation = Self::new();
        for (owner, grid) in grids {
            reservation.absorb(owner, grid);
        }
        reservation
    }

    /// Reservation state of one slot.
    pub fn slot(&self, slot: Slot) -> Option<&SlotReservation> {
        if !slot.is_valid() {
            return None;
        }
        Some(&self.slots[slot.day][slot.period])
    }

    /// Whether any teacher named in `teacher` is busy at `slot`.
    ///
    /// Placeholder and blank names are never busy.
    pub fn is_teacher_busy(&self, slot: Slot, teacher: &str) -> bool {
        let Some(res) = self.slot(slot) else {
            return false;
        };
        split_teachers(teacher)
            .filter_map(teacher_key)
            .any(|key| res.teachers.contains_key(&key))
    }

    /// Whether `teacher` is busy at `slot` for a replay of elective `code`
    /// by `owner`.
    ///
    /// Bookings of the same elective by other sections of the same
    /// semester are joint classes and do not count.
    pub fn is_teacher_busy_for_elective(
        &self,
        slot: Slot,
        teacher: &str,
        code: &str,
        owner: &str,
    ) -> bool {
        let Some(res) = self.slot(slot) else {
            return false;
        };
        split_teachers(teacher).filter_map(teacher_key).any(|key| {
            res.teachers.get(&key).is_some_and(|bookings| {
                bookings
                    .iter()
                    .any(|b| b.owner != owner && !b.is_joint_elective(owner, code))
            })
        })
    }

    /// Number of labs running at `slot` across sections.
    pub fn labs_running(&self, slot: Slot) -> usize {
        self.slot(slot).map_or(0, |r| r.labs.len())
    }

    /// Whether a lab starts at `slot` in any section.
    pub fn lab_started(&self, slot: Slot) -> bool {
        self.slot(slot).is_some_and(|r| !r.lab_starts.is_empty())
    }

    /// Whether lab `code` already ran on `day` in an earlier section.
    pub fn lab_used_on_day(&self, day: usize, code: &str) -> bool {
        self.lab_days.contains(&(day, code.to_string()))
    }

    /// Marks one placed cell as busy for `owner`.
    pub fn reserve(&mut self, owner: &str, slot: Slot, entry: &PlacedEntry) {
        if !slot.is_valid() {
            return;
        }
        let res = &mut self.slots[slot.day][slot.period];
        for key in entry.teachers().filter_map(teacher_key) {
            res.teachers.entry(key).or_default().insert(TeacherBooking {
                owner: owner.to_string(),
                code: entry.code.clone(),
                is_elective: entry.is_elective,
            });
        }
        if entry.is_lab {
            res.labs.insert(owner.to_string());
            if entry.is_start {
                res.lab_starts.insert(owner.to_string());
            }
            self.lab_days.insert((slot.day, entry.code.clone()));
        }
    }

    /// Folds a finished grid into the reservation.
    pub fn absorb(&mut self, owner: &str, grid: &Grid) {
        for (slot, entry) in grid.iter() {
            self.reserve(owner, slot, entry);
        }
    }
}

/// One recorded elective placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedPlacement {
    /// First slot of the placement.
    pub slot: Slot,
    /// Consecutive periods.
    pub duration: usize,
}

/// Where each shared elective landed in the first section that placed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveSyncMap {
    placements: BTreeMap<String, Vec<SyncedPlacement>>,
}

impl ElectiveSyncMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded placements for an elective code.
    pub fn get(&self, code: &str) -> Option<&[SyncedPlacement]> {
        self.placements.get(code).map(Vec::as_slice)
    }

    /// Whether `code` has been recorded.
    pub fn contains(&self, code: &str) -> bool {
        self.placements.contains_key(code)
    }

    /// Records a placement. Repeated slots are ignored.
    pub fn record(&mut self, code: &str, slot: Slot, duration: usize) {
        let list = self.placements.entry(code.to_string()).or_default();
        if !list.iter().any(|p| p.slot == slot) {
            list.push(SyncedPlacement { slot, duration });
        }
    }

    /// Recorded elective codes.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.placements.keys().map(String::as_str)
    }

    /// Number of recorded electives.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// The accumulator pair threaded through one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationState {
    /// Teacher/lab occupancy of sections generated so far.
    pub reservation: GlobalReservation,
    /// Elective placements chosen so far.
    pub electives: ElectiveSyncMap,
}

impl GenerationState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing reservation (e.g., other semesters).
    pub fn with_reservation(reservation: GlobalReservation) -> Self {
        Self {
            reservation,
            electives: ElectiveSyncMap::new(),
        }
    }
}
