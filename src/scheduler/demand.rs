//! Per-section session demand.
//!
//! Turns caller-owned subjects and assignments into the mutable working
//! set the engines consume: one `SessionDemand` per subject (or merged
//! elective group) with its teacher and remaining period counters.

use std::collections::BTreeMap;

use crate::models::{Assignment, LockedSlot, Subject, SubjectKind, UNASSIGNED_TEACHER};

/// Remaining work for one subject in one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDemand {
    /// Subject code (combined for a merged elective group).
    pub code: String,
    /// Subject name.
    pub name: String,
    /// Classification.
    pub kind: SubjectKind,
    /// Placed as contiguous blocks.
    pub is_block: bool,
    /// Teacher for this section (`/`-joined for a merged group).
    pub teacher: String,
    /// Weekday periods requested.
    pub requested_weekly: u32,
    /// Saturday periods requested.
    pub requested_saturday: u32,
    /// Weekday periods still to place.
    pub remaining_weekly: u32,
    /// Saturday periods still to place.
    pub remaining_saturday: u32,
    /// Locks applying to this section.
    pub locks: Vec<LockedSlot>,
}

impl SessionDemand {
    /// Builds the demand for `subject` taught by `teacher`.
    pub fn new(subject: &Subject, section: &str, teacher: impl Into<String>) -> Self {
        Self {
            code: subject.code.clone(),
            name: subject.name.clone(),
            kind: subject.kind,
            is_block: subject.is_block(),
            teacher: teacher.into(),
            requested_weekly: subject.weekly_periods,
            requested_saturday: subject.saturday_periods,
            remaining_weekly: subject.weekly_periods,
            remaining_saturday: subject.saturday_periods,
            locks: subject.locks_for(section).into_iter().cloned().collect(),
        }
    }

    /// Whether the demand is an elective.
    pub fn is_elective(&self) -> bool {
        self.kind == SubjectKind::Elective
    }

    /// Remaining periods on the counter that covers `day`.
    pub fn remaining_for(&self, saturday: bool) -> u32 {
        if saturday {
            self.remaining_saturday
        } else {
            self.remaining_weekly
        }
    }

    /// Consumes `periods` from the counter that covers the day.
    pub fn consume(&mut self, saturday: bool, periods: u32) {
        let counter = if saturday {
            &mut self.remaining_saturday
        } else {
            &mut self.remaining_weekly
        };
        *counter = counter.saturating_sub(periods);
    }

    /// Periods still unscheduled.
    pub fn shortfall(&self) -> u32 {
        self.remaining_weekly + self.remaining_saturday
    }
}

/// Builds the section's demand list.
///
/// Subjects keep their input order. Each takes the teacher assigned for
/// this section (`TBA` when none). Electives sharing an elective group
/// are merged into one combined demand at the position of the first
/// member.
pub fn build_demands(
    section: &str,
    subjects: &[Subject],
    assignments: &[Assignment],
) -> Vec<SessionDemand> {
    let teachers: BTreeMap<&str, &str> = assignments
        .iter()
        .filter(|a| a.section == section)
        .map(|a| (a.subject_code.as_str(), a.teacher_name.as_str()))
        .collect();

    let mut group_members: BTreeMap<&str, Vec<SessionDemand>> = BTreeMap::new();
    let mut order: Vec<Slotted<'_>> = Vec::new();

    for subject in subjects {
        let teacher = teachers
            .get(subject.code.as_str())
            .copied()
            .unwrap_or(UNASSIGNED_TEACHER);
        let demand = SessionDemand::new(subject, section, teacher);

        match subject.elective_group.as_deref() {
            Some(group) if subject.is_elective() => {
                let members = group_members.entry(group).or_default();
                if members.is_empty() {
                    order.push(Slotted::Group(group));
                }
                members.push(demand);
            }
            _ => order.push(Slotted::Single(demand)),
        }
    }

    order
        .into_iter()
        .filter_map(|item| match item {
            Slotted::Single(demand) => Some(demand),
            Slotted::Group(group) => group_members.remove(group).and_then(merge_group),
        })
        .collect()
}

enum Slotted<'a> {
    Single(SessionDemand),
    Group(&'a str),
}

/// Merges an elective group into one combined demand.
fn merge_group(members: Vec<SessionDemand>) -> Option<SessionDemand> {
    let mut iter = members.into_iter();
    let mut merged = iter.next()?;
    for member in iter {
        merged.code = format!("{} / {}", merged.code, member.code);
        merged.name = format!("{} / {}", merged.name, member.name);
        merged.teacher = format!("{}/{}", merged.teacher, member.teacher);
        merged.is_block |= member.is_block;
        merged.requested_weekly = merged.requested_weekly.max(member.requested_weekly);
        merged.requested_saturday = merged.requested_saturday.max(member.requested_saturday);
    }
    merged.kind = SubjectKind::Elective;
    merged.remaining_weekly = merged.requested_weekly;
    merged.remaining_saturday = merged.requested_saturday;
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(section: &str, code: &str, teacher: &str) -> Assignment {
        Assignment::new("II", section, code, teacher)
    }

    #[test]
    fn test_teacher_per_section() {
        let subjects = vec![Subject::lecture("CS101", "Programming").with_weekly(3)];
        let assignments = vec![assign("A", "CS101", "Dr. X"), assign("B", "CS101", "Dr. Y")];

        let a = build_demands("A", &subjects, &assignments);
        let b = build_demands("B", &subjects, &assignments);
        assert_eq!(a[0].teacher, "Dr. X");
        assert_eq!(b[0].teacher, "Dr. Y");
        assert_eq!(a[0].remaining_weekly, 3);
    }

    #[test]
    fn test_unassigned_subject_gets_placeholder() {
        let subjects = vec![Subject::lecture("MA101", "Maths").with_weekly(3)];
        let demands = build_demands("A", &subjects, &[]);
        assert_eq!(demands[0].teacher, UNASSIGNED_TEACHER);
    }

    #[test]
    fn test_elective_group_merge() {
        let subjects = vec![
            Subject::lecture("MA101", "Maths").with_weekly(3),
            Subject::elective("EC2014", "Embedded Systems")
                .with_weekly(3)
                .with_elective_group("PE-I"),
            Subject::lecture("PH101", "Physics").with_weekly(2),
            Subject::elective("ME2011", "Robotics")
                .with_weekly(2)
                .with_saturday(1)
                .with_elective_group("PE-I"),
        ];
        let assignments = vec![
            assign("A", "EC2014", "Dr. A"),
            assign("A", "ME2011", "Dr. B"),
        ];

        let demands = build_demands("A", &subjects, &assignments);
        let codes: Vec<&str> = demands.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["MA101", "EC2014 / ME2011", "PH101"]);

        let merged = &demands[1];
        assert_eq!(merged.teacher, "Dr. A/Dr. B");
        assert_eq!(merged.remaining_weekly, 3);
        assert_eq!(merged.remaining_saturday, 1);
        assert!(merged.is_elective());
    }

    #[test]
    fn test_single_member_group_unchanged() {
        let subjects = vec![Subject::elective("EC2014", "Embedded")
            .with_weekly(3)
            .with_elective_group("PE-I")];
        let demands = build_demands("A", &subjects, &[]);
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].code, "EC2014");
    }

    #[test]
    fn test_consume_saturates() {
        let subject = Subject::lab("CS101L", "Lab").with_weekly(3).with_saturday(2);
        let mut d = SessionDemand::new(&subject, "A", "T");
        d.consume(false, 2);
        d.consume(true, 5);
        assert_eq!(d.remaining_for(false), 1);
        assert_eq!(d.remaining_for(true), 0);
        assert_eq!(d.shortfall(), 1);
    }
}
