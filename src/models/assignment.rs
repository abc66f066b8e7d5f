//! Teacher assignment model.

use serde::{Deserialize, Serialize};

/// Placeholder teacher for subjects with no assignment in a section.
///
/// Never counts as busy in the global reservation.
pub const UNASSIGNED_TEACHER: &str = "TBA";

/// Binds a subject to a teacher for one section of one semester.
///
/// A subject may have a different teacher in every section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Semester identifier (e.g., "II").
    pub semester: String,
    /// Section identifier (e.g., "A").
    pub section: String,
    /// Subject code.
    pub subject_code: String,
    /// Teacher name.
    pub teacher_name: String,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(
        semester: impl Into<String>,
        section: impl Into<String>,
        subject_code: impl Into<String>,
        teacher_name: impl Into<String>,
    ) -> Self {
        Self {
            semester: semester.into(),
            section: section.into(),
            subject_code: subject_code.into(),
            teacher_name: teacher_name.into(),
        }
    }
}

/// Normalized reservation key for a teacher name.
///
/// Case-insensitive; `None` for blank names and the placeholder teacher.
pub fn teacher_key(name: &str) -> Option<String> {
    let key = name.trim().to_uppercase();
    if key.is_empty() || key == UNASSIGNED_TEACHER {
        None
    } else {
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_key() {
        assert_eq!(teacher_key("Dr. X"), Some("DR. X".to_string()));
        assert_eq!(teacher_key(" dr. x "), Some("DR. X".to_string()));
        assert_eq!(teacher_key("TBA"), None);
        assert_eq!(teacher_key("tba"), None);
        assert_eq!(teacher_key("  "), None);
    }
}
