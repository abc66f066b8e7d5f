//! Semester orchestration.
//!
//! Generates every section of a semester in a fixed order, threading one
//! [`GenerationState`] through the loop so later sections see the
//! teachers, labs and elective slots claimed by earlier ones. There is no
//! cross-section retry: a later section that cannot use a reserved slot
//! looks elsewhere or reports a shortfall.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::section::{SectionRequest, SectionScheduler};
use super::state::GenerationState;
use crate::config::GeneratorConfig;
use crate::models::{teacher_key, Assignment, Diagnostic, Grid, PlacedEntry, Slot, Subject};
use crate::validation::validate_input;

/// Section label used for diagnostics that concern the whole semester.
pub const ALL_SECTIONS: &str = "*";

/// Section generated when a semester has no assignments at all.
pub const DEFAULT_SECTION: &str = "A";

/// Generated timetable of one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterTimetable {
    /// Semester identifier.
    pub semester: String,
    /// Grid per section.
    pub sections: BTreeMap<String, Grid>,
    /// Soft failures from every section, in generation order.
    pub diagnostics: Vec<Diagnostic>,
}

/// One cell of a teacher's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSession {
    /// Section the session belongs to.
    pub section: String,
    /// Grid position.
    pub slot: Slot,
    /// Cell contents.
    pub entry: PlacedEntry,
}

impl SemesterTimetable {
    /// Grid of one section.
    pub fn grid(&self, section: &str) -> Option<&Grid> {
        self.sections.get(section)
    }

    /// Every cell taught by `teacher` across sections, ordered by section
    /// then slot. Names match case-insensitively and combined teacher
    /// strings match each named teacher.
    pub fn sessions_for_teacher(&self, teacher: &str) -> Vec<TeacherSession> {
        let Some(key) = teacher_key(teacher) else {
            return Vec::new();
        };
        self.sections
            .iter()
            .flat_map(|(section, grid)| {
                grid.iter().map(move |(slot, entry)| (section, slot, entry))
            })
            .filter(|(_, _, entry)| {
                entry
                    .teachers()
                    .filter_map(teacher_key)
                    .any(|k| k == key)
            })
            .map(|(section, slot, entry)| TeacherSession {
                section: section.clone(),
                slot,
                entry: entry.clone(),
            })
            .collect()
    }

    /// Total periods left unscheduled across all sections.
    pub fn total_shortfall(&self) -> u32 {
        self.diagnostics.iter().map(|d| d.shortfall).sum()
    }
}

/// Generates whole semesters.
///
/// # Example
///
/// ```
/// use u_timetable::config::GeneratorConfig;
/// use u_timetable::models::{Assignment, Subject};
/// use u_timetable::scheduler::SemesterScheduler;
///
/// let subjects = vec![
///     Subject::lecture("MA101", "Maths").with_weekly(3),
///     Subject::lab("CS101L", "Programming Lab").with_weekly(4),
/// ];
/// let assignments = vec![
///     Assignment::new("II", "A", "MA101", "Dr. M"),
///     Assignment::new("II", "A", "CS101L", "Dr. L"),
/// ];
///
/// let scheduler = SemesterScheduler::new(GeneratorConfig::new().with_random_seed(42));
/// let timetable = scheduler.generate("II", &subjects, &assignments);
/// let grid = timetable.grid("A").unwrap();
/// assert_eq!(grid.periods_of("CS101L"), (4, 0));
/// assert_eq!(timetable.total_shortfall(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SemesterScheduler {
    config: GeneratorConfig,
}

impl SemesterScheduler {
    /// Creates a scheduler.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The scheduler's configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates every section of `semester` with a fresh state and the
    /// configured random source.
    pub fn generate(
        &self,
        semester: &str,
        subjects: &[Subject],
        assignments: &[Assignment],
    ) -> SemesterTimetable {
        let mut state = GenerationState::new();
        let mut rng = self.config.rng();
        self.generate_with(semester, subjects, assignments, &mut state, &mut rng)
    }

    /// Generates every section of `semester` against an existing state.
    ///
    /// `state` may already hold reservations from other semesters; it is
    /// updated with every section generated here.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        semester: &str,
        subjects: &[Subject],
        assignments: &[Assignment],
        state: &mut GenerationState,
        rng: &mut R,
    ) -> SemesterTimetable {
        let assignments: Vec<Assignment> = assignments
            .iter()
            .filter(|a| a.semester == semester)
            .cloned()
            .collect();
        let sections = section_ids(&assignments);

        info!(
            event = "semester_start",
            semester,
            sections = sections.len(),
            subjects = subjects.len(),
            seed = ?self.config.random_seed,
        );

        let mut diagnostics = Vec::new();
        if let Err(errors) = validate_input(subjects, &assignments) {
            for error in errors {
                warn!(event = "invalid_input", semester, kind = ?error.kind, message = %error.message);
                diagnostics.push(Diagnostic::input_error(ALL_SECTIONS, error.message));
            }
        }

        let scheduler = SectionScheduler::new(&self.config);
        let mut grids: BTreeMap<String, Grid> = BTreeMap::new();
        let mut peers: Vec<Grid> = Vec::with_capacity(sections.len());

        for section in &sections {
            let request = SectionRequest::new(semester, section, subjects, &assignments);
            let outcome = scheduler.schedule(&request, state, &peers, rng);
            diagnostics.extend(outcome.diagnostics);
            peers.push(outcome.grid.clone());
            grids.insert(outcome.section, outcome.grid);
        }

        let timetable = SemesterTimetable {
            semester: semester.to_string(),
            sections: grids,
            diagnostics,
        };
        info!(
            event = "semester_done",
            semester,
            sections = timetable.sections.len(),
            shortfall = timetable.total_shortfall(),
            diagnostics = timetable.diagnostics.len(),
        );
        timetable
    }
}

/// Sections named by a semester's assignments, sorted. Falls back to
/// [`DEFAULT_SECTION`] when there are none.
fn section_ids(assignments: &[Assignment]) -> Vec<String> {
    let ids: BTreeSet<&str> = assignments
        .iter()
        .map(|a| a.section.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if ids.is_empty() {
        return vec![DEFAULT_SECTION.to_string()];
    }
    ids.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiagnosticKind, LockedSlot, PERIODS, SATURDAY};
    use crate::scheduler::GlobalReservation;
    use crate::validation::validate_timetable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ELECTIVE: &str = "EC2014 / ME2011";

    fn subjects() -> Vec<Subject> {
        vec![
            Subject::lecture("MA101", "Maths").with_weekly(3),
            Subject::lecture("PH101", "Physics").with_weekly(3).with_saturday(1),
            Subject::lecture("CS101", "Programming").with_weekly(4),
            Subject::lecture("CS102", "Data Structures").with_weekly(4),
            Subject::lab("CS101L", "Programming Lab").with_weekly(4),
            Subject::elective("EC2014", "Embedded Systems")
                .with_weekly(3)
                .with_elective_group("PE-I"),
            Subject::elective("ME2011", "Robotics")
                .with_weekly(3)
                .with_elective_group("PE-I"),
            Subject::lecture("HS2221", "Ethics")
                .with_weekly(2)
                .with_locked_slot(LockedSlot::new(0, 2, 1)),
        ]
    }

    fn assignments() -> Vec<Assignment> {
        let rows = [
            ("A", "MA101", "Dr. M"),
            ("A", "PH101", "Dr. P"),
            ("A", "CS101", "Dr. X"),
            ("A", "CS102", "Dr. Z"),
            ("A", "CS101L", "Dr. L"),
            ("A", "EC2014", "Dr. E"),
            ("A", "ME2011", "Dr. R"),
            ("A", "HS2221", "Dr. H"),
            ("B", "MA101", "Dr. M"),
            ("B", "PH101", "Dr. Q"),
            ("B", "CS101", "Dr. Y"),
            ("B", "CS102", "Dr. X"),
            ("B", "CS101L", "Dr. L"),
            ("B", "EC2014", "Dr. E"),
            ("B", "ME2011", "Dr. R"),
            ("B", "HS2221", "Dr. K"),
        ];
        rows.iter()
            .map(|(section, code, teacher)| Assignment::new("II", *section, *code, *teacher))
            .collect()
    }

    fn generate(seed: u64) -> SemesterTimetable {
        SemesterScheduler::new(GeneratorConfig::new().with_random_seed(seed)).generate(
            "II",
            &subjects(),
            &assignments(),
        )
    }

    #[test]
    fn test_sections_from_assignments() {
        let timetable = generate(1);
        let sections: Vec<&str> = timetable.sections.keys().map(String::as_str).collect();
        assert_eq!(sections, vec!["A", "B"]);
    }

    #[test]
    fn test_grids_are_valid() {
        for seed in 0..10 {
            let timetable = generate(seed);
            assert_eq!(validate_timetable(&timetable), Ok(()));
        }
    }

    #[test]
    fn test_no_teacher_double_booking() {
        for seed in 0..10 {
            let timetable = generate(seed);
            let a = timetable.grid("A").unwrap();
            let b = timetable.grid("B").unwrap();
            for (slot, entry) in a.iter().filter(|(_, e)| !e.is_elective) {
                if let Some(other) = b.get(slot).filter(|e| !e.is_elective) {
                    assert!(
                        teacher_key(&entry.teacher) != teacher_key(&other.teacher),
                        "seed {seed}: {} in both sections at {slot:?}",
                        entry.teacher
                    );
                }
            }
        }
    }

    #[test]
    fn test_shared_teacher_avoids_earlier_section() {
        for seed in 0..10 {
            let timetable = generate(seed);
            let sessions = timetable.sessions_for_teacher("dr. x");
            let in_a: BTreeSet<Slot> = sessions
                .iter()
                .filter(|s| s.section == "A")
                .map(|s| s.slot)
                .collect();
            let in_b: BTreeSet<Slot> = sessions
                .iter()
                .filter(|s| s.section == "B")
                .map(|s| s.slot)
                .collect();
            assert_eq!(in_a.len(), 4);
            assert_eq!(in_b.len(), 4);
            assert!(in_a.is_disjoint(&in_b));
            assert!(sessions
                .iter()
                .all(|s| (s.section == "A") == (s.entry.code == "CS101")));
        }
    }

    #[test]
    fn test_locked_slot_preserved() {
        for seed in 0..10 {
            let timetable = generate(seed);
            for (section, teacher) in [("A", "Dr. H"), ("B", "Dr. K")] {
                let cell = timetable.grid(section).unwrap().get(Slot::new(0, 2)).unwrap();
                assert_eq!(cell.code, "HS2221");
                assert_eq!(cell.teacher, teacher);
                assert_eq!(cell.duration, 1);
                assert!(cell.is_locked);
            }
        }
    }

    #[test]
    fn test_elective_slots_identical_across_sections() {
        for seed in 0..10 {
            let timetable = generate(seed);
            let slots = |section: &str| -> BTreeSet<Slot> {
                timetable
                    .grid(section)
                    .unwrap()
                    .iter()
                    .filter(|(_, e)| e.code == ELECTIVE)
                    .map(|(slot, _)| slot)
                    .collect()
            };
            let a = slots("A");
            assert_eq!(a.len(), 3);
            assert_eq!(a, slots("B"));
            let b = timetable.grid("B").unwrap();
            assert!(b.iter().filter(|(_, e)| e.code == ELECTIVE).all(|(_, e)| e.is_synced));
        }
    }

    #[test]
    fn test_placed_never_exceeds_requested() {
        let requested: BTreeMap<&str, (u32, u32)> = [
            ("MA101", (3, 0)),
            ("PH101", (3, 1)),
            ("CS101", (4, 0)),
            ("CS102", (4, 0)),
            ("CS101L", (4, 0)),
            (ELECTIVE, (3, 0)),
            ("HS2221", (2, 0)),
        ]
        .into_iter()
        .collect();

        for seed in 0..10 {
            let timetable = generate(seed);
            for (section, grid) in &timetable.sections {
                for (code, &(wk, sat)) in &requested {
                    let (placed_wk, placed_sat) = grid.periods_of(code);
                    assert!(placed_wk <= wk && placed_sat <= sat);
                    let missing: u32 = timetable
                        .diagnostics
                        .iter()
                        .filter(|d| {
                            d.kind == DiagnosticKind::PlacementShortfall
                                && d.section == *section
                                && d.subject_code.as_deref() == Some(*code)
                        })
                        .map(|d| d.shortfall)
                        .sum();
                    assert_eq!(placed_wk + placed_sat + missing, wk + sat);
                }
            }
        }
    }

    #[test]
    fn test_lab_is_one_block() {
        for seed in 0..10 {
            let timetable = generate(seed);
            for grid in timetable.sections.values() {
                let cells: Vec<Slot> = grid
                    .iter()
                    .filter(|(_, e)| e.code == "CS101L")
                    .map(|(slot, _)| slot)
                    .collect();
                assert_eq!(cells.len(), 4);
                let day = cells[0].day;
                assert!(day < SATURDAY);
                assert!(cells.iter().all(|s| s.day == day));
                assert_eq!(
                    cells.iter().map(|s| s.period).collect::<Vec<_>>(),
                    vec![0, 1, 2, 3]
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_timetable() {
        assert_eq!(generate(99), generate(99));
    }

    #[test]
    fn test_invalid_input_reported_and_generation_continues() {
        let mut subjects = subjects();
        subjects.push(Subject::lecture("MA101", "Maths duplicate"));
        let timetable = SemesterScheduler::new(GeneratorConfig::new().with_random_seed(3))
            .generate("II", &subjects, &assignments());

        let input_errors: Vec<_> = timetable
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::InputError)
            .collect();
        assert_eq!(input_errors.len(), 1);
        assert_eq!(input_errors[0].section, ALL_SECTIONS);
        assert_eq!(timetable.sections.len(), 2);
    }

    #[test]
    fn test_semester_without_assignments() {
        let timetable = generate_empty();
        let sections: Vec<&str> = timetable.sections.keys().map(String::as_str).collect();
        assert_eq!(sections, vec![DEFAULT_SECTION]);
        assert_eq!(timetable.grid(DEFAULT_SECTION), Some(&Grid::new()));
        assert_eq!(timetable.diagnostics.len(), 1);
        assert_eq!(timetable.diagnostics[0].kind, DiagnosticKind::InputError);
    }

    fn generate_empty() -> SemesterTimetable {
        SemesterScheduler::default().generate("IV", &subjects(), &assignments())
    }

    #[test]
    fn test_reservation_from_other_semester() {
        // Semester I already has Dr. M every Monday-Friday morning
        let mut other = Grid::new();
        for day in 0..SATURDAY {
            other.place(Slot::new(day, 0), PlacedEntry::single("MA001", "Dr. M"));
        }
        let mut state =
            GenerationState::with_reservation(GlobalReservation::from_grids([("I/A", &other)]));
        let mut rng = StdRng::seed_from_u64(5);
        let scheduler = SemesterScheduler::new(GeneratorConfig::new());
        let timetable =
            scheduler.generate_with("II", &subjects(), &assignments(), &mut state, &mut rng);

        for session in timetable.sessions_for_teacher("Dr. M") {
            assert_ne!(session.slot.period, 0);
        }
        assert!(state.electives.contains(ELECTIVE));
    }

    #[test]
    fn test_replayed_elective_respects_other_semester() {
        // Semester I holds Dr. F in every weekday slot
        let mut other = Grid::new();
        for day in 0..SATURDAY {
            for period in 0..PERIODS {
                other.place(Slot::new(day, period), PlacedEntry::single("MA001", "Dr. F"));
            }
        }
        let mut assignments = assignments();
        for a in assignments.iter_mut() {
            if a.section == "B" && a.subject_code == "ME2011" {
                a.teacher_name = "Dr. F".to_string();
            }
        }

        for seed in 0..5 {
            let mut state = GenerationState::with_reservation(GlobalReservation::from_grids([(
                "I/A", &other,
            )]));
            let mut rng = StdRng::seed_from_u64(seed);
            let timetable = SemesterScheduler::new(GeneratorConfig::new()).generate_with(
                "II",
                &subjects(),
                &assignments,
                &mut state,
                &mut rng,
            );

            assert!(timetable
                .sessions_for_teacher("Dr. F")
                .iter()
                .all(|s| s.slot.day == SATURDAY));
            let conflicts = timetable
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::SyncConflict && d.section == "B")
                .count();
            assert_eq!(conflicts, 3);
            assert_eq!(validate_timetable(&timetable), Ok(()));
        }
    }

    #[test]
    fn test_sessions_for_placeholder_teacher_empty() {
        let timetable = generate(4);
        assert!(timetable.sessions_for_teacher("TBA").is_empty());
        assert!(timetable.sessions_for_teacher("  ").is_empty());
    }
}
