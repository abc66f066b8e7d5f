//! Working context for one section's placement pipeline.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::warn;

use super::state::GenerationState;
use crate::config::GeneratorConfig;
use crate::models::{Diagnostic, Grid, Slot};

/// Everything an engine needs besides the grid and the demands.
pub(crate) struct SectionContext<'a, R: Rng + ?Sized> {
    /// Section being generated.
    pub section: &'a str,
    /// Reservation owner label (`semester/section`).
    pub owner: String,
    pub config: &'a GeneratorConfig,
    pub state: &'a mut GenerationState,
    /// Finished grids of earlier sections in this semester.
    pub peers: &'a [Grid],
    pub rng: &'a mut R,
    /// Electives whose placements this section records for the others.
    pub recording: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a, R: Rng + ?Sized> SectionContext<'a, R> {
    pub fn new(
        semester: &str,
        section: &'a str,
        config: &'a GeneratorConfig,
        state: &'a mut GenerationState,
        peers: &'a [Grid],
        rng: &'a mut R,
    ) -> Self {
        Self {
            section,
            owner: format!("{semester}/{section}"),
            config,
            state,
            peers,
            rng,
            recording: BTreeSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Records a soft failure.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!(
            event = "soft_failure",
            kind = ?diagnostic.kind,
            section = %diagnostic.section,
            subject = diagnostic.subject_code.as_deref().unwrap_or("-"),
            shortfall = diagnostic.shortfall,
            message = %diagnostic.message,
        );
        self.diagnostics.push(diagnostic);
    }

    /// Records an elective placement if this section is the first to
    /// place that elective.
    pub fn note_elective(&mut self, code: &str, slot: Slot, duration: usize) {
        if self.recording.contains(code) {
            self.state.electives.record(code, slot, duration);
        }
    }

    /// Whether `teacher` is busy anywhere in `duration` periods from `slot`.
    pub fn teacher_busy(&self, slot: Slot, duration: usize, teacher: &str) -> bool {
        (0..duration).any(|k| self.state.reservation.is_teacher_busy(slot.offset(k), teacher))
    }
}
