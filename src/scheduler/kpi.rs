//! Timetable quality metrics (KPIs).
//!
//! Computes summary indicators from a generated semester.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Filled periods | Occupied cells over all sections |
//! | Free periods | Empty cells over all sections |
//! | Fill rate | filled / (sections x 42) |
//! | Lab blocks | Multi-period entries (counted once per block) |
//! | Teacher load | Distinct slots each teacher is busy in |
//! | Total shortfall | Periods left unscheduled |

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::semester::SemesterTimetable;
use crate::models::{teacher_key, Slot, DAYS, PERIODS};

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// Number of section grids.
    pub sections: usize,
    /// Occupied cells.
    pub filled_periods: usize,
    /// Empty cells.
    pub free_periods: usize,
    /// Fraction of cells occupied (0.0..1.0).
    pub fill_rate: f64,
    /// Multi-period blocks placed.
    pub lab_blocks: usize,
    /// Weekly periods per teacher, keyed by normalized name.
    pub teacher_load: BTreeMap<String, usize>,
    /// Periods left unscheduled across sections.
    pub total_shortfall: u32,
}

impl TimetableKpi {
    /// Computes KPIs from a generated semester.
    pub fn calculate(timetable: &SemesterTimetable) -> Self {
        let sections = timetable.sections.len();
        let capacity = sections * DAYS * PERIODS;

        let mut filled = 0;
        let mut lab_blocks = 0;
        let mut busy: BTreeMap<String, BTreeSet<Slot>> = BTreeMap::new();

        for grid in timetable.sections.values() {
            for (slot, entry) in grid.iter() {
                filled += 1;
                if entry.is_lab && entry.is_start {
                    lab_blocks += 1;
                }
                // A joint elective is one period of work, whichever section it is in
                for key in entry.teachers().filter_map(teacher_key) {
                    busy.entry(key).or_default().insert(slot);
                }
            }
        }

        let fill_rate = if capacity == 0 {
            0.0
        } else {
            filled as f64 / capacity as f64
        };

        Self {
            sections,
            filled_periods: filled,
            free_periods: capacity - filled,
            fill_rate,
            lab_blocks,
            teacher_load: busy.into_iter().map(|(k, slots)| (k, slots.len())).collect(),
            total_shortfall: timetable.total_shortfall(),
        }
    }

    /// Heaviest teacher load, if any teacher is scheduled.
    pub fn max_teacher_load(&self) -> Option<(&str, usize)> {
        self.teacher_load
            .iter()
            .max_by_key(|(_, load)| **load)
            .map(|(name, &load)| (name.as_str(), load))
    }

    /// Whether every requested period was placed.
    pub fn is_complete(&self) -> bool {
        self.total_shortfall == 0
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_shortfall: u32, max_teacher_load: usize) -> bool {
        self.total_shortfall <= max_shortfall
            && self
                .max_teacher_load()
                .map_or(true, |(_, load)| load <= max_teacher_load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnostic, Grid, PlacedEntry};

    fn timetable(sections: Vec<(&str, Grid)>, diagnostics: Vec<Diagnostic>) -> SemesterTimetable {
        SemesterTimetable {
            semester: "II".to_string(),
            sections: sections
                .into_iter()
                .map(|(s, g)| (s.to_string(), g))
                .collect(),
            diagnostics,
        }
    }

    #[test]
    fn test_kpi_basic() {
        let mut a = Grid::new();
        a.place_run(0, 0, 4, |s| PlacedEntry::cell("CS101L", "Dr. L", 4, s));
        a.place(Slot::new(0, 4), PlacedEntry::single("MA101", "Dr. M"));
        let mut b = Grid::new();
        b.place(Slot::new(1, 0), PlacedEntry::single("MA101", "dr. m"));

        let kpi = TimetableKpi::calculate(&timetable(vec![("A", a), ("B", b)], Vec::new()));
        assert_eq!(kpi.sections, 2);
        assert_eq!(kpi.filled_periods, 6);
        assert_eq!(kpi.free_periods, 84 - 6);
        assert!((kpi.fill_rate - 6.0 / 84.0).abs() < 1e-10);
        assert_eq!(kpi.lab_blocks, 1);
        assert_eq!(kpi.teacher_load["DR. L"], 4);
        assert_eq!(kpi.teacher_load["DR. M"], 2);
        assert_eq!(kpi.max_teacher_load(), Some(("DR. L", 4)));
        assert!(kpi.is_complete());
    }

    #[test]
    fn test_kpi_joint_elective_counted_once() {
        let mut a = Grid::new();
        a.place(Slot::new(2, 2), PlacedEntry::single("EC2014 / ME2011", "Dr. E/Dr. R").elective(true));
        let mut b = Grid::new();
        b.place(
            Slot::new(2, 2),
            PlacedEntry::single("EC2014 / ME2011", "Dr. E/Dr. R").elective(true).synced(),
        );

        let kpi = TimetableKpi::calculate(&timetable(vec![("A", a), ("B", b)], Vec::new()));
        assert_eq!(kpi.teacher_load["DR. E"], 1);
        assert_eq!(kpi.teacher_load["DR. R"], 1);
    }

    #[test]
    fn test_kpi_placeholder_and_shortfall() {
        let mut a = Grid::new();
        a.place(Slot::new(0, 0), PlacedEntry::single("MA101", "TBA"));
        let diagnostics = vec![Diagnostic::shortfall("A", "MA101", 2, "2 periods unscheduled")];

        let kpi = TimetableKpi::calculate(&timetable(vec![("A", a)], diagnostics));
        assert!(kpi.teacher_load.is_empty());
        assert_eq!(kpi.max_teacher_load(), None);
        assert_eq!(kpi.total_shortfall, 2);
        assert!(!kpi.is_complete());
        assert!(kpi.meets_thresholds(2, 10));
        assert!(!kpi.meets_thresholds(1, 10));
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = TimetableKpi::calculate(&timetable(Vec::new(), Vec::new()));
        assert_eq!(kpi.filled_periods, 0);
        assert_eq!(kpi.free_periods, 0);
        assert!((kpi.fill_rate - 0.0).abs() < 1e-10);
    }
}
