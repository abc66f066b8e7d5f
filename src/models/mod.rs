//! Timetabling domain models.
//!
//! Inputs (`Subject`, `Assignment`, `LockedSlot`) describe what a section
//! must be taught; outputs (`Grid`, `PlacedEntry`, `Diagnostic`) describe
//! what the generator produced.
//!
//! # Domain Mappings
//!
//! | u-timetable | Scheduling term |
//! |-------------|-----------------|
//! | Subject | Task (demand in periods) |
//! | Assignment | Resource binding (teacher) |
//! | Slot | Time bucket |
//! | Grid | Schedule of one section |

mod assignment;
mod diagnostic;
mod grid;
mod subject;

pub use assignment::{teacher_key, Assignment, UNASSIGNED_TEACHER};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use grid::{
    block_starts, fits_session, split_teachers, Grid, PlacedEntry, Slot, DAYS, DAY_NAMES,
    LUNCH_AFTER, PERIODS, SATURDAY,
};
pub use subject::{LockedSlot, Subject, SubjectKind};
