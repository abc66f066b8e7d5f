//! Weekly grid model.
//!
//! A grid is one section's week: six teaching days (Saturday last) by
//! seven periods. Periods 0-3 are the morning session and 4-6 the
//! afternoon; the lunch break sits between period 3 and period 4 and no
//! multi-period entry may span it.

use serde::{Deserialize, Serialize};

/// Teaching days per week (Monday..Saturday).
pub const DAYS: usize = 6;
/// Periods per day.
pub const PERIODS: usize = 7;
/// Day index of Saturday.
pub const SATURDAY: usize = 5;
/// Last period before the lunch break.
pub const LUNCH_AFTER: usize = 3;
/// Day labels, indexed by day.
pub const DAY_NAMES: [&str; DAYS] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// A (day, period) position in the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    /// Day index, 0 = Monday, 5 = Saturday.
    pub day: usize,
    /// Period index within the day.
    pub period: usize,
}

impl Slot {
    /// Creates a slot.
    pub fn new(day: usize, period: usize) -> Self {
        Self { day, period }
    }

    /// Whether the slot lies inside the 6x7 grid.
    pub fn is_valid(&self) -> bool {
        self.day < DAYS && self.period < PERIODS
    }

    /// Whether the slot falls on Saturday.
    pub fn is_saturday(&self) -> bool {
        self.day == SATURDAY
    }

    /// The slot `offset` periods later on the same day.
    pub fn offset(&self, offset: usize) -> Self {
        Self::new(self.day, self.period + offset)
    }
}

/// Whether a run of `duration` periods starting at `start` stays on the
/// grid and on one side of the lunch break.
pub fn fits_session(start: usize, duration: usize) -> bool {
    if duration == 0 || start + duration > PERIODS {
        return false;
    }
    start + duration <= LUNCH_AFTER + 1 || start > LUNCH_AFTER
}

/// Valid start periods for a block of `duration`.
///
/// Returns `(preferred, fallback)`: session openings (periods 0 and 4)
/// first, any other non-crossing start afterwards.
pub fn block_starts(duration: usize) -> (Vec<usize>, Vec<usize>) {
    (0..PERIODS)
        .filter(|&start| fits_session(start, duration))
        .partition(|&start| start == 0 || start == LUNCH_AFTER + 1)
}

/// Contents of one occupied grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedEntry {
    /// Subject code (combined code for a merged elective group).
    pub code: String,
    /// Teacher name; `/`-separated for a merged elective group.
    pub teacher: String,
    /// True only at the first period of the entry.
    pub is_start: bool,
    /// Number of consecutive periods the entry spans.
    pub duration: usize,
    /// True for any entry spanning two or more periods.
    pub is_lab: bool,
    /// Came from a fixed constraint; never overwritten.
    pub is_locked: bool,
    /// Belongs to an elective subject.
    #[serde(default)]
    pub is_elective: bool,
    /// Replayed from an earlier section's elective choice.
    #[serde(default)]
    pub is_synced: bool,
}

impl PlacedEntry {
    /// A single-period session.
    pub fn single(code: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self::cell(code, teacher, 1, true)
    }

    /// One cell of a run of `duration` periods.
    pub fn cell(
        code: impl Into<String>,
        teacher: impl Into<String>,
        duration: usize,
        is_start: bool,
    ) -> Self {
        Self {
            code: code.into(),
            teacher: teacher.into(),
            is_start,
            duration,
            is_lab: duration > 1,
            is_locked: false,
            is_elective: false,
            is_synced: false,
        }
    }

    /// Marks the entry as a fixed constraint.
    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    /// Marks the entry as an elective session.
    pub fn elective(mut self, is_elective: bool) -> Self {
        self.is_elective = is_elective;
        self
    }

    /// Marks the entry as replayed from the elective sync map.
    pub fn synced(mut self) -> Self {
        self.is_synced = true;
        self
    }

    /// Individual teacher names behind this entry.
    pub fn teachers(&self) -> impl Iterator<Item = &str> {
        split_teachers(&self.teacher)
    }

    /// Whether compaction may move this entry.
    pub fn is_movable(&self) -> bool {
        self.duration == 1 && !self.is_locked && !self.is_elective
    }
}

/// Splits a possibly combined (`A/B`) teacher string.
pub fn split_teachers(teacher: &str) -> impl Iterator<Item = &str> {
    teacher.split('/').map(str::trim).filter(|t| !t.is_empty())
}

/// One section's weekly timetable: a fixed 6x7 matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Option<PlacedEntry>; PERIODS]; DAYS],
}

impl Grid {
    /// Creates an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry at a slot, if occupied. Off-grid slots read as empty.
    pub fn get(&self, slot: Slot) -> Option<&PlacedEntry> {
        if !slot.is_valid() {
            return None;
        }
        self.cells[slot.day][slot.period].as_ref()
    }

    /// Whether a slot is on the grid and unoccupied.
    pub fn is_free(&self, slot: Slot) -> bool {
        slot.is_valid() && self.cells[slot.day][slot.period].is_none()
    }

    /// Whether `duration` periods from `start` are all free on `day`.
    pub fn is_run_free(&self, day: usize, start: usize, duration: usize) -> bool {
        (0..duration).all(|k| self.is_free(Slot::new(day, start + k)))
    }

    /// One day's row. `None` for a day off the grid.
    pub fn day(&self, day: usize) -> Option<&[Option<PlacedEntry>; PERIODS]> {
        self.cells.get(day)
    }

    /// Writes an entry into a free slot.
    ///
    /// Returns `false` (and writes nothing) when the slot is occupied
    /// or off the grid; cells are write-once.
    pub fn place(&mut self, slot: Slot, entry: PlacedEntry) -> bool {
        if !self.is_free(slot) {
            return false;
        }
        self.cells[slot.day][slot.period] = Some(entry);
        true
    }

    /// Writes a run of `duration` cells built by `make(is_start)`.
    ///
    /// All-or-nothing: returns `false` without writing if any cell is
    /// taken or the run would cross the lunch break.
    pub fn place_run(
        &mut self,
        day: usize,
        start: usize,
        duration: usize,
        make: impl Fn(bool) -> PlacedEntry,
    ) -> bool {
        if day >= DAYS || !fits_session(start, duration) || !self.is_run_free(day, start, duration)
        {
            return false;
        }
        for k in 0..duration {
            self.cells[day][start + k] = Some(make(k == 0));
        }
        true
    }

    /// Moves a movable entry from `from` to a free `to` on the same day.
    pub(crate) fn shift(&mut self, from: Slot, to: Slot) -> bool {
        if from.day != to.day || !self.is_free(to) {
            return false;
        }
        match self.cells[from.day][from.period].take() {
            Some(entry) => {
                self.cells[to.day][to.period] = Some(entry);
                true
            }
            None => false,
        }
    }

    /// Whether `code` appears anywhere on `day`.
    pub fn has_code_on_day(&self, day: usize, code: &str) -> bool {
        self.day(day)
            .is_some_and(|row| row.iter().flatten().any(|e| e.code == code))
    }

    /// Whether any multi-period entry sits on `day`.
    pub fn has_block_on_day(&self, day: usize) -> bool {
        self.day(day)
            .is_some_and(|row| row.iter().flatten().any(|e| e.is_lab))
    }

    /// Iterates occupied cells in (day, period) order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &PlacedEntry)> {
        self.cells.iter().enumerate().flat_map(|(d, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(p, cell)| cell.as_ref().map(|e| (Slot::new(d, p), e)))
        })
    }

    /// Number of occupied cells.
    pub fn filled_count(&self) -> usize {
        self.iter().count()
    }

    /// Free slots in (day, period) order.
    pub fn free_slots(&self) -> Vec<Slot> {
        (0..DAYS)
            .flat_map(|d| (0..PERIODS).map(move |p| Slot::new(d, p)))
            .filter(|&s| self.is_free(s))
            .collect()
    }

    /// Periods placed for `code`, split into (weekday, saturday).
    pub fn periods_of(&self, code: &str) -> (u32, u32) {
        self.iter()
            .filter(|(_, e)| e.code == code)
            .fold((0, 0), |(wk, sat), (slot, _)| {
                if slot.is_saturday() {
                    (wk, sat + 1)
                } else {
                    (wk + 1, sat)
                }
            })
    }

    /// Start slots of multi-period entries.
    pub fn block_starts(&self) -> impl Iterator<Item = (Slot, &PlacedEntry)> {
        self.iter().filter(|(_, e)| e.is_lab && e.is_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_session() {
        assert!(fits_session(0, 4));
        assert!(fits_session(4, 3));
        assert!(fits_session(2, 2));
        assert!(!fits_session(3, 2)); // 3 -> 4 crosses lunch
        assert!(!fits_session(1, 4));
        assert!(!fits_session(5, 3)); // off the grid
        assert!(!fits_session(0, 0));
    }

    #[test]
    fn test_block_starts() {
        assert_eq!(block_starts(2), (vec![0, 4], vec![1, 2, 5]));
        assert_eq!(block_starts(3), (vec![0, 4], vec![1]));
        assert_eq!(block_starts(4), (vec![0], vec![]));
    }

    #[test]
    fn test_place_is_write_once() {
        let mut grid = Grid::new();
        assert!(grid.place(Slot::new(0, 0), PlacedEntry::single("MA101", "T1")));
        assert!(!grid.place(Slot::new(0, 0), PlacedEntry::single("PH101", "T2")));
        assert_eq!(grid.get(Slot::new(0, 0)).unwrap().code, "MA101");
        assert!(!grid.place(Slot::new(6, 0), PlacedEntry::single("X", "T")));
    }

    #[test]
    fn test_place_run() {
        let mut grid = Grid::new();
        assert!(grid.place_run(1, 4, 3, |s| PlacedEntry::cell("CS101L", "T1", 3, s)));
        assert!(grid.get(Slot::new(1, 4)).unwrap().is_start);
        assert!(!grid.get(Slot::new(1, 5)).unwrap().is_start);
        assert!(grid.get(Slot::new(1, 6)).unwrap().is_lab);
        assert!(grid.has_block_on_day(1));

        // Crossing lunch or overlapping is refused without partial writes
        assert!(!grid.place_run(2, 2, 3, |s| PlacedEntry::cell("X", "T", 3, s)));
        assert!(grid.get(Slot::new(2, 2)).is_none());
        assert!(!grid.place_run(1, 3, 2, |s| PlacedEntry::cell("X", "T", 2, s)));
        assert!(grid.get(Slot::new(1, 3)).is_none());
    }

    #[test]
    fn test_periods_of_and_counts() {
        let mut grid = Grid::new();
        grid.place(Slot::new(0, 0), PlacedEntry::single("MA101", "T1"));
        grid.place(Slot::new(2, 1), PlacedEntry::single("MA101", "T1"));
        grid.place(Slot::new(SATURDAY, 1), PlacedEntry::single("MA101", "T1"));
        assert_eq!(grid.periods_of("MA101"), (2, 1));
        assert_eq!(grid.filled_count(), 3);
        assert_eq!(grid.free_slots().len(), DAYS * PERIODS - 3);
        assert!(grid.has_code_on_day(2, "MA101"));
        assert!(!grid.has_code_on_day(1, "MA101"));
    }

    #[test]
    fn test_off_grid_day_reads_empty() {
        let mut grid = Grid::new();
        grid.place(Slot::new(0, 0), PlacedEntry::single("MA101", "T1"));
        assert!(grid.day(0).is_some_and(|row| row[0].is_some()));
        assert!(grid.day(DAYS).is_none());
        assert!(!grid.has_code_on_day(DAYS, "MA101"));
        assert!(!grid.has_block_on_day(DAYS + 3));
    }

    #[test]
    fn test_split_teachers() {
        let e = PlacedEntry::single("EC2014 / ME2011", "Dr. A/ Dr. B");
        assert_eq!(e.teachers().collect::<Vec<_>>(), vec!["Dr. A", "Dr. B"]);
    }

    #[test]
    fn test_grid_serializes_fixed_shape() {
        let grid = Grid::new();
        let json = serde_json::to_value(&grid).unwrap();
        let rows = json["cells"].as_array().unwrap();
        assert_eq!(rows.len(), DAYS);
        assert!(rows.iter().all(|r| r.as_array().unwrap().len() == PERIODS));
    }
}
