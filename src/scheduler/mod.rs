//! Timetable generation engines and KPI evaluation.
//!
//! # Pipeline
//!
//! [`SemesterScheduler`] loops over a semester's sections in sorted order.
//! Each section runs through [`SectionPhase`]s:
//!
//! 1. **Seeding**: locked slots are written verbatim.
//! 2. **Syncing**: shared electives replay the slots an earlier section chose.
//! 3. **BlockPlacement**: labs and integrated subjects get contiguous blocks
//!    that never cross the lunch break.
//! 4. **TheoryPlacement**: single periods fill free cells, spread over days.
//! 5. **Compaction**: single periods slide left to close gaps.
//!
//! The finished grid is folded into the run's [`GlobalReservation`] so
//! later sections never double-book a teacher.
//!
//! # Randomness
//!
//! Ties are broken with an injected random source. The same seed and the
//! same input always produce the same timetable.
//!
//! # KPI
//!
//! [`TimetableKpi`] summarizes fill rate, lab blocks, teacher load and
//! shortfall.

mod block;
mod compaction;
mod context;
mod demand;
mod fixed;
mod kpi;
mod section;
mod semester;
mod state;
mod sync;
mod theory;

pub use demand::{build_demands, SessionDemand};
pub use kpi::TimetableKpi;
pub use section::{SectionOutcome, SectionPhase, SectionRequest, SectionScheduler};
pub use semester::{
    SemesterScheduler, SemesterTimetable, TeacherSession, ALL_SECTIONS, DEFAULT_SECTION,
};
pub use state::{
    ElectiveSyncMap, GenerationState, GlobalReservation, SlotReservation, SyncedPlacement,
    TeacherBooking,
};
