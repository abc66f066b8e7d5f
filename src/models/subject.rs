//! Subject model.
//!
//! A subject states how many periods a section needs per week and how
//! they must be shaped: single theory periods, contiguous lab blocks, or
//! elective slots shared across sections.

use serde::{Deserialize, Serialize};

use super::grid::{fits_session, DAYS};

/// Subject classification.
///
/// Set at data-entry time. Importers that only have free-text labels
/// can use [`SubjectKind::infer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    /// Plain theory subject, single periods.
    Lecture,
    /// Laboratory, contiguous blocks.
    Lab,
    /// Theory part of an integrated course.
    IntegratedTheory,
    /// Lab part of an integrated course.
    IntegratedLab,
    /// Elective shared by several sections.
    Elective,
}

impl SubjectKind {
    /// Whether the kind is one of the integrated variants.
    pub fn is_integrated(&self) -> bool {
        matches!(self, Self::IntegratedTheory | Self::IntegratedLab)
    }

    /// Infers a kind from free-text type and name labels.
    ///
    /// Returns the kind and whether an elective has a practical
    /// (lab/project) component. Intended for one-time imports only.
    pub fn infer(type_label: &str, name: &str) -> (Self, bool) {
        let label = type_label.to_uppercase();
        let name = name.to_uppercase();

        if label.contains("ELECTIVE") || name.contains("ELECTIVE") {
            let practical = name.contains("LAB") || name.contains("PROJECT");
            return (Self::Elective, practical);
        }
        if label.contains("INTEGRATED") || name.contains("INTEGRATED") {
            let kind = if label.contains("LAB") || name.contains("LAB") {
                Self::IntegratedLab
            } else {
                Self::IntegratedTheory
            };
            return (kind, false);
        }
        if label.contains("THEORY") || label == "LECTURE" {
            return (Self::Lecture, false);
        }
        let practical = ["LAB", "PRACTICAL", "GRAPHICS"]
            .iter()
            .any(|k| label.contains(k) || name.contains(k));
        if practical {
            (Self::Lab, false)
        } else {
            (Self::Lecture, false)
        }
    }
}

/// A pre-assigned hard constraint for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedSlot {
    /// Day index (5 = Saturday).
    pub day: usize,
    /// First period.
    pub period: usize,
    /// Consecutive periods covered.
    pub duration: usize,
    /// Section the lock applies to. `None` = every section.
    #[serde(default)]
    pub section: Option<String>,
}

impl LockedSlot {
    /// A lock applying to every section.
    pub fn new(day: usize, period: usize, duration: usize) -> Self {
        Self {
            day,
            period,
            duration,
            section: None,
        }
    }

    /// Restricts the lock to one section.
    pub fn for_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Whether the lock stays on the grid and off the lunch boundary.
    pub fn is_well_formed(&self) -> bool {
        self.day < DAYS && fits_session(self.period, self.duration)
    }
}

/// A subject taught in a semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Code, unique within the semester.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Classification.
    pub kind: SubjectKind,
    /// Monday-Friday periods required per week.
    pub weekly_periods: u32,
    /// Saturday periods required per week.
    pub saturday_periods: u32,
    /// Elective with a lab or project component (placed as blocks).
    #[serde(default)]
    pub practical: bool,
    /// Elective pool this subject belongs to.
    #[serde(default)]
    pub elective_group: Option<String>,
    /// Pre-assigned slots.
    #[serde(default)]
    pub locked_slots: Vec<LockedSlot>,
}

impl Subject {
    /// Creates a subject with no required periods.
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: SubjectKind) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind,
            weekly_periods: 0,
            saturday_periods: 0,
            practical: false,
            elective_group: None,
            locked_slots: Vec::new(),
        }
    }

    /// Creates a lecture subject.
    pub fn lecture(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(code, name, SubjectKind::Lecture)
    }

    /// Creates a lab subject.
    pub fn lab(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(code, name, SubjectKind::Lab)
    }

    /// Creates an elective subject.
    pub fn elective(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(code, name, SubjectKind::Elective)
    }

    /// Builds a subject from free-text labels via [`SubjectKind::infer`].
    pub fn from_labels(
        code: impl Into<String>,
        name: impl Into<String>,
        type_label: &str,
    ) -> Self {
        let name = name.into();
        let (kind, practical) = SubjectKind::infer(type_label, &name);
        let mut subject = Self::new(code, name, kind);
        subject.practical = practical;
        subject
    }

    /// Sets the weekday period requirement.
    pub fn with_weekly(mut self, periods: u32) -> Self {
        self.weekly_periods = periods;
        self
    }

    /// Sets the Saturday period requirement.
    pub fn with_saturday(mut self, periods: u32) -> Self {
        self.saturday_periods = periods;
        self
    }

    /// Marks an elective as having a lab/project component.
    pub fn with_practical(mut self) -> Self {
        self.practical = true;
        self
    }

    /// Places the subject in an elective pool.
    pub fn with_elective_group(mut self, group: impl Into<String>) -> Self {
        self.elective_group = Some(group.into());
        self
    }

    /// Adds a locked slot.
    pub fn with_locked_slot(mut self, lock: LockedSlot) -> Self {
        self.locked_slots.push(lock);
        self
    }

    /// Whether the subject is placed as contiguous blocks.
    pub fn is_block(&self) -> bool {
        match self.kind {
            SubjectKind::Lecture => false,
            SubjectKind::Lab | SubjectKind::IntegratedTheory | SubjectKind::IntegratedLab => true,
            SubjectKind::Elective => self.practical,
        }
    }

    /// Whether the subject is an elective.
    pub fn is_elective(&self) -> bool {
        self.kind == SubjectKind::Elective
    }

    /// Locks that apply to `section`.
    ///
    /// Section-specific locks win; when none exist for the section the
    /// all-sections locks apply.
    pub fn locks_for(&self, section: &str) -> Vec<&LockedSlot> {
        let specific: Vec<&LockedSlot> = self
            .locked_slots
            .iter()
            .filter(|l| l.section.as_deref() == Some(section))
            .collect();
        if !specific.is_empty() {
            return specific;
        }
        self.locked_slots
            .iter()
            .filter(|l| l.section.is_none())
            .collect()
    }
}
