//! Weekly class-timetable generation.
//!
//! Builds a conflict-free 6-day x 7-period grid for every section of a
//! semester from subjects, their weekly and Saturday period counts, and
//! teacher assignments.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Subject`, `Assignment`, `LockedSlot`,
//!   `Slot`, `PlacedEntry`, `Grid`, `Diagnostic`
//! - **`scheduler`**: Placement engines, section/semester orchestration,
//!   reservation state and KPIs
//! - **`validation`**: Input and output integrity checks
//! - **`config`**: Generator settings loaded from TOML
//!
//! # Guarantees
//!
//! - Blocks never span the lunch break between periods 3 and 4.
//! - A teacher never appears in two sections at the same slot.
//! - Locked slots survive generation unchanged.
//! - A shared elective occupies the same slots in every section.
//! - Anything that cannot be placed is reported as a [`models::Diagnostic`];
//!   generation never aborts.
//!
//! # Example
//!
//! ```
//! use u_timetable::config::GeneratorConfig;
//! use u_timetable::models::{Assignment, LockedSlot, Slot, Subject};
//! use u_timetable::scheduler::{SemesterScheduler, TimetableKpi};
//! use u_timetable::validation::validate_timetable;
//!
//! let subjects = vec![
//!     Subject::lecture("HS2221", "Ethics")
//!         .with_weekly(2)
//!         .with_locked_slot(LockedSlot::new(0, 2, 1)),
//!     Subject::lecture("CS101", "Programming").with_weekly(4),
//! ];
//! let assignments = vec![
//!     Assignment::new("II", "A", "HS2221", "Dr. H"),
//!     Assignment::new("II", "A", "CS101", "Dr. X"),
//!     Assignment::new("II", "B", "HS2221", "Dr. K"),
//!     Assignment::new("II", "B", "CS101", "Dr. X"),
//! ];
//!
//! let scheduler = SemesterScheduler::new(GeneratorConfig::new().with_random_seed(1));
//! let timetable = scheduler.generate("II", &subjects, &assignments);
//!
//! assert!(validate_timetable(&timetable).is_ok());
//! let locked = timetable.grid("B").unwrap().get(Slot::new(0, 2)).unwrap();
//! assert!(locked.is_locked);
//! assert_eq!(TimetableKpi::calculate(&timetable).teacher_load["DR. X"], 8);
//! ```

pub mod config;
pub mod models;
pub mod scheduler;
pub mod validation;
