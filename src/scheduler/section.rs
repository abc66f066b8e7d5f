//! Per-section orchestration.
//!
//! Drives one section through its placement phases:
//!
//! ```text
//! Seeding -> Syncing -> BlockPlacement -> TheoryPlacement -> Compaction -> Done
//! ```
//!
//! Transitions are strictly sequential. When the section reaches `Done`
//! its grid is folded into the run's reservation before the caller moves
//! on to the next section.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::block::place_blocks;
use super::compaction::compact;
use super::context::SectionContext;
use super::demand::{build_demands, SessionDemand};
use super::fixed::apply_locks;
use super::state::GenerationState;
use super::sync::replay_electives;
use super::theory::place_theory;
use crate::config::GeneratorConfig;
use crate::models::{Assignment, Diagnostic, Grid, Subject};

/// Placement phase of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionPhase {
    /// Locked slots are written.
    Seeding,
    /// Shared electives replay earlier sections' slots.
    Syncing,
    /// Contiguous blocks are placed.
    BlockPlacement,
    /// Single periods fill the remaining cells.
    TheoryPlacement,
    /// Gaps are pulled out of each day.
    Compaction,
    /// Grid finished.
    Done,
}

impl SectionPhase {
    /// The phase that follows this one. `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Seeding => Self::Syncing,
            Self::Syncing => Self::BlockPlacement,
            Self::BlockPlacement => Self::TheoryPlacement,
            Self::TheoryPlacement => Self::Compaction,
            Self::Compaction | Self::Done => Self::Done,
        }
    }

    /// Whether this is the terminal phase.
    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

/// Input for one section.
#[derive(Debug, Clone, Copy)]
pub struct SectionRequest<'a> {
    /// Semester identifier.
    pub semester: &'a str,
    /// Section identifier.
    pub section: &'a str,
    /// Subjects offered in the semester, in input order.
    pub subjects: &'a [Subject],
    /// Teacher assignments; only those for this semester and section apply.
    pub assignments: &'a [Assignment],
}

impl<'a> SectionRequest<'a> {
    /// Creates a request.
    pub fn new(
        semester: &'a str,
        section: &'a str,
        subjects: &'a [Subject],
        assignments: &'a [Assignment],
    ) -> Self {
        Self {
            semester,
            section,
            subjects,
            assignments,
        }
    }
}

/// Result of scheduling one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutcome {
    /// Section identifier.
    pub section: String,
    /// Finished grid.
    pub grid: Grid,
    /// Soft failures recorded while scheduling.
    pub diagnostics: Vec<Diagnostic>,
}

/// Schedules one section at a time against a shared [`GenerationState`].
///
/// # Example
///
/// ```
/// use u_timetable::config::GeneratorConfig;
/// use u_timetable::models::{Assignment, Subject};
/// use u_timetable::scheduler::{GenerationState, SectionRequest, SectionScheduler};
///
/// let subjects = vec![Subject::lecture("MA101", "Maths").with_weekly(3)];
/// let assignments = vec![Assignment::new("II", "A", "MA101", "Dr. M")];
///
/// let config = GeneratorConfig::new().with_random_seed(7);
/// let mut state = GenerationState::new();
/// let mut rng = config.rng();
/// let outcome = SectionScheduler::new(&config).schedule(
///     &SectionRequest::new("II", "A", &subjects, &assignments),
///     &mut state,
///     &[],
///     &mut rng,
/// );
/// assert_eq!(outcome.grid.periods_of("MA101"), (3, 0));
/// assert!(outcome.diagnostics.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SectionScheduler<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> SectionScheduler<'c> {
    /// Creates a section scheduler.
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self { config }
    }

    /// Runs every phase for one section.
    ///
    /// `peers` are the finished grids of earlier sections of the same
    /// semester. The finished grid is folded into `state.reservation`
    /// before returning.
    pub fn schedule<R: Rng + ?Sized>(
        &self,
        request: &SectionRequest<'_>,
        state: &mut GenerationState,
        peers: &[Grid],
        rng: &mut R,
    ) -> SectionOutcome {
        let section = request.section;
        let assignments: Vec<Assignment> = request
            .assignments
            .iter()
            .filter(|a| a.semester == request.semester && a.section == section)
            .cloned()
            .collect();

        if assignments.is_empty() {
            let diagnostic = Diagnostic::input_error(
                section,
                format!(
                    "no teacher assignments for section {section} of semester {}",
                    request.semester
                ),
            );
            let mut ctx =
                SectionContext::new(request.semester, section, self.config, state, peers, rng);
            ctx.report(diagnostic);
            return SectionOutcome {
                section: section.to_string(),
                grid: Grid::new(),
                diagnostics: ctx.diagnostics,
            };
        }

        let mut demands = build_demands(section, request.subjects, &assignments);
        let recording: BTreeSet<String> = demands
            .iter()
            .filter(|d| d.is_elective() && !state.electives.contains(&d.code))
            .map(|d| d.code.clone())
            .collect();

        info!(
            event = "section_start",
            semester = request.semester,
            section,
            subjects = demands.len(),
        );

        let mut grid = Grid::new();
        let mut ctx =
            SectionContext::new(request.semester, section, self.config, state, peers, rng);
        ctx.recording = recording;

        let mut phase = SectionPhase::Seeding;
        while !phase.is_done() {
            debug!(event = "phase", section, phase = ?phase);
            match phase {
                SectionPhase::Seeding => apply_locks(&mut grid, &mut demands, &mut ctx),
                SectionPhase::Syncing => replay_electives(&mut grid, &mut demands, &mut ctx),
                SectionPhase::BlockPlacement => place_blocks(&mut grid, &mut demands, &mut ctx),
                SectionPhase::TheoryPlacement => place_theory(&mut grid, &mut demands, &mut ctx),
                SectionPhase::Compaction => {
                    compact(&mut grid, &ctx);
                }
                SectionPhase::Done => {}
            }
            phase = phase.next();
        }

        report_shortfalls(&demands, &mut ctx);
        let SectionContext {
            owner, diagnostics, ..
        } = ctx;
        state.reservation.absorb(&owner, &grid);

        info!(
            event = "section_done",
            semester = request.semester,
            section,
            filled = grid.filled_count(),
            diagnostics = diagnostics.len(),
        );

        SectionOutcome {
            section: section.to_string(),
            grid,
            diagnostics,
        }
    }
}

fn report_shortfalls<R: Rng + ?Sized>(demands: &[SessionDemand], ctx: &mut SectionContext<'_, R>) {
    for demand in demands {
        let missing = demand.shortfall();
        if missing == 0 {
            continue;
        }
        let section = ctx.section;
        ctx.report(Diagnostic::shortfall(
            section,
            &demand.code,
            missing,
            format!(
                "{} of {} weekday and {} of {} Saturday periods unscheduled",
                demand.remaining_weekly,
                demand.requested_weekly,
                demand.remaining_saturday,
                demand.requested_saturday
            ),
        ));
    }
}
