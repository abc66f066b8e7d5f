//! Soft-failure diagnostics.
//!
//! Generation never aborts on a constraint it cannot satisfy. Each such
//! case becomes a [`Diagnostic`] returned next to the grid, so one
//! section's shortfall never blocks another section.

use serde::{Deserialize, Serialize};

/// A recorded soft failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Failure category.
    pub kind: DiagnosticKind,
    /// Section being generated when the failure occurred.
    pub section: String,
    /// Subject involved, if any.
    pub subject_code: Option<String>,
    /// Periods left unscheduled because of this failure.
    pub shortfall: u32,
    /// Human-readable description.
    pub message: String,
}

/// Classification of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Unusable input for a section (e.g., no assignments).
    InputError,
    /// A locked slot was rejected.
    LockConflict,
    /// Required periods could not all be placed.
    PlacementShortfall,
    /// An elective's synchronized slot was already taken.
    SyncConflict,
}

impl Diagnostic {
    fn new(
        kind: DiagnosticKind,
        section: impl Into<String>,
        subject_code: Option<String>,
        shortfall: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            section: section.into(),
            subject_code,
            shortfall,
            message: message.into(),
        }
    }

    /// Creates an input error.
    pub fn input_error(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::InputError, section, None, 0, message)
    }

    /// Creates a rejected-lock diagnostic.
    pub fn lock_conflict(
        section: impl Into<String>,
        subject_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            DiagnosticKind::LockConflict,
            section,
            Some(subject_code.into()),
            0,
            message,
        )
    }

    /// Creates a shortfall diagnostic.
    pub fn shortfall(
        section: impl Into<String>,
        subject_code: impl Into<String>,
        shortfall: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            DiagnosticKind::PlacementShortfall,
            section,
            Some(subject_code.into()),
            shortfall,
            message,
        )
    }

    /// Creates a sync-conflict diagnostic.
    pub fn sync_conflict(
        section: impl Into<String>,
        subject_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            DiagnosticKind::SyncConflict,
            section,
            Some(subject_code.into()),
            0,
            message,
        )
    }
}
