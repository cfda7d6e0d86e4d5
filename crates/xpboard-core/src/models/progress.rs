//! Project progress records

use serde::{Deserialize, Serialize};

use super::transaction::RelatedObject;

/// Pass/fail classification of a grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeOutcome {
    Passed,
    Failed,
}

/// One project/grade outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub id: i64,

    /// 0 = failed, >= 1 = passed, null while in progress
    #[serde(default)]
    pub grade: Option<f64>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default, rename = "object")]
    pub related_object: Option<RelatedObject>,
}

impl ProgressRecord {
    /// Pass/fail outcome; `None` for null, negative or fractional (0 < g < 1) grades
    pub fn outcome(&self) -> Option<GradeOutcome> {
        match self.grade {
            Some(g) if g >= 1.0 => Some(GradeOutcome::Passed),
            Some(g) if g == 0.0 => Some(GradeOutcome::Failed),
            _ => None,
        }
    }

    /// Name of the related object, if any
    pub fn object_name(&self) -> Option<&str> {
        self.related_object
            .as_ref()
            .map(|o| o.name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// Skills declared by the related object
    pub fn skills(&self) -> Vec<String> {
        self.related_object
            .as_ref()
            .map(RelatedObject::skills)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_grade(grade: Option<f64>) -> ProgressRecord {
        ProgressRecord {
            id: 1,
            grade,
            created_at: None,
            updated_at: None,
            path: None,
            related_object: None,
        }
    }

    #[test]
    fn test_grade_outcome() {
        assert_eq!(with_grade(Some(1.0)).outcome(), Some(GradeOutcome::Passed));
        assert_eq!(with_grade(Some(2.4)).outcome(), Some(GradeOutcome::Passed));
        assert_eq!(with_grade(Some(0.0)).outcome(), Some(GradeOutcome::Failed));
        assert_eq!(with_grade(Some(0.5)).outcome(), None);
        assert_eq!(with_grade(Some(-1.0)).outcome(), None);
        assert_eq!(with_grade(None).outcome(), None);
    }

    #[test]
    fn test_deserialize_with_null_grade() {
        let json = r#"{"id": 3, "grade": null, "createdAt": "2024-01-01T00:00:00Z",
            "object": {"name": "ascii-art", "type": "project", "attrs": {}}}"#;
        let record: ProgressRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.outcome(), None);
        assert_eq!(record.object_name(), Some("ascii-art"));
    }
}
