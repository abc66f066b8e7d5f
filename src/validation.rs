//! Integrity checks for timetable inputs and outputs.
//!
//! [`validate_input`] runs before generation and detects:
//! - Duplicate subject codes
//! - Assignments naming unknown subjects
//! - Duplicate (semester, section, subject) assignments
//! - Locked slots that run off the grid or cross the lunch break
//!
//! [`validate_timetable`] runs on a finished semester and checks that
//! every block is well formed, no block crosses lunch, and no teacher
//! sits in two sections at once (shared electives excepted).

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::models::{
    fits_session, teacher_key, Assignment, Grid, PlacedEntry, Slot, Subject, DAYS, PERIODS,
};
use crate::scheduler::SemesterTimetable;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Two subjects share the same code.
    DuplicateCode,
    /// An assignment references a subject that doesn't exist.
    UnknownSubject,
    /// A subject is assigned twice in the same section.
    DuplicateAssignment,
    /// A locked slot runs off the grid, has no length, or crosses lunch.
    InvalidLock,
    /// A multi-period entry is broken (missing start or continuation).
    InvalidBlock,
    /// A block spans the lunch break.
    LunchCrossing,
    /// A teacher is in two sections in the same slot.
    TeacherClash,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates generator input.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(subjects: &[Subject], assignments: &[Assignment]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut codes = BTreeSet::new();
    for subject in subjects {
        if !codes.insert(subject.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCode,
                format!("Duplicate subject code: {}", subject.code),
            ));
        }
        for lock in &subject.locked_slots {
            if !lock.is_well_formed() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidLock,
                    format!(
                        "Subject '{}' has an invalid lock at day {} period {} (x{})",
                        subject.code, lock.day, lock.period, lock.duration
                    ),
                ));
            }
        }
    }

    let mut seen = BTreeSet::new();
    for a in assignments {
        if !codes.contains(a.subject_code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSubject,
                format!(
                    "Assignment for section {} references unknown subject '{}'",
                    a.section, a.subject_code
                ),
            ));
        }
        let key = (
            a.semester.as_str(),
            a.section.as_str(),
            a.subject_code.as_str(),
        );
        if !seen.insert(key) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateAssignment,
                format!(
                    "Subject '{}' is assigned twice in section {}",
                    a.subject_code, a.section
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a generated semester.
///
/// Checks:
/// 1. Every multi-period entry has one start followed by its continuation
///    cells on the same day
/// 2. No block crosses the lunch break
/// 3. No teacher appears in two sections at the same slot, except when
///    both cells are the same elective (a joint class)
pub fn validate_timetable(timetable: &SemesterTimetable) -> ValidationResult {
    let mut errors = Vec::new();

    for (section, grid) in &timetable.sections {
        check_blocks(section, grid, &mut errors);
    }

    let mut busy: BTreeMap<(Slot, String), Vec<(&str, &PlacedEntry)>> = BTreeMap::new();
    for (section, grid) in &timetable.sections {
        for (slot, entry) in grid.iter() {
            for key in entry.teachers().filter_map(teacher_key) {
                let seen = busy.entry((slot, key.clone())).or_default();
                let clash = seen.iter().find(|(other, prev)| {
                    *other != section.as_str()
                        && !(prev.is_elective && entry.is_elective && prev.code == entry.code)
                });
                if let Some((other, _)) = clash {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::TeacherClash,
                        format!(
                            "Teacher '{key}' is in sections {other} and {section} at day {} period {}",
                            slot.day, slot.period
                        ),
                    ));
                }
                seen.push((section.as_str(), entry));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_blocks(section: &str, grid: &Grid, errors: &mut Vec<ValidationError>) {
    for day in 0..DAYS {
        let mut period = 0;
        while period < PERIODS {
            let Some(entry) = grid.get(Slot::new(day, period)) else {
                period += 1;
                continue;
            };
            if !entry.is_start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidBlock,
                    format!(
                        "Section {section}: '{}' at day {day} period {period} has no start",
                        entry.code
                    ),
                ));
                period += 1;
                continue;
            }
            if entry.duration > 1 && !fits_session(period, entry.duration) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::LunchCrossing,
                    format!(
                        "Section {section}: block '{}' at day {day} period {period} (x{}) crosses lunch",
                        entry.code, entry.duration
                    ),
                ));
            }
            let intact = (1..entry.duration).all(|k| {
                grid.get(Slot::new(day, period + k)).is_some_and(|next| {
                    !next.is_start && next.code == entry.code && next.duration == entry.duration
                })
            });
            if !intact {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidBlock,
                    format!(
                        "Section {section}: block '{}' at day {day} period {period} is incomplete",
                        entry.code
                    ),
                ));
            }
            period += entry.duration.max(1);
        }
    }
}
