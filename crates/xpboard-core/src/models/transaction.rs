//! Transaction records (XP, audits, skills)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static SKILL_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^skill_(.+)$").expect("skill type pattern is a valid regex")
});

/// Object a transaction or progress record points at (project, exercise, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedObject {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Free-form attributes, may contain a `skills` list
    #[serde(default)]
    pub attrs: Option<Value>,
}

impl RelatedObject {
    /// Skill names listed under `attrs.skills` (non-string entries ignored)
    pub fn skills(&self) -> Vec<String> {
        self.attrs
            .as_ref()
            .and_then(|attrs| attrs.get("skills"))
            .and_then(Value::as_array)
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A single platform transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: i64,

    /// "xp", "audit", "up", "down", "skill_<name>", ...
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, deserialize_with = "super::deserialize_lenient_i64")]
    pub amount: i64,

    /// Raw timestamp as sent by the platform
    #[serde(default)]
    pub created_at: String,

    /// Slash-delimited hierarchical path, e.g. "/bahrain/bh-module/go-reloaded"
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default, rename = "object")]
    pub related_object: Option<RelatedObject>,
}

impl Transaction {
    pub fn is_xp(&self) -> bool {
        self.kind == "xp"
    }

    pub fn is_audit(&self) -> bool {
        self.kind == "audit"
    }

    /// Skill name for `skill_<name>` transactions
    pub fn skill_name(&self) -> Option<&str> {
        SKILL_TYPE
            .captures(&self.kind)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Number of slash-separated segments, leading empty segment included (0 when absent)
    pub fn path_depth(&self) -> usize {
        self.path
            .as_deref()
            .map(|p| p.split('/').count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: &str) -> Transaction {
        Transaction {
            id: 1,
            kind: kind.to_string(),
            amount: 10,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            path: None,
            related_object: None,
        }
    }

    #[test]
    fn test_skill_name_extraction() {
        assert_eq!(tx("skill_go").skill_name(), Some("go"));
        assert_eq!(tx("skill_back-end").skill_name(), Some("back-end"));
        assert_eq!(tx("skill_sys_admin").skill_name(), Some("sys_admin"));
        assert_eq!(tx("skill_").skill_name(), None);
        assert_eq!(tx("xp").skill_name(), None);
        assert_eq!(tx("myskill_go").skill_name(), None);
    }

    #[test]
    fn test_deserialize_graphql_shape() {
        let json = r#"{
            "id": 42,
            "type": "xp",
            "amount": 12500.0,
            "createdAt": "2024-03-01T10:00:00.123+00:00",
            "path": "/bahrain/bh-module/go-reloaded",
            "object": {"id": 7, "name": "go-reloaded", "type": "project"}
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(tx.is_xp());
        assert_eq!(tx.amount, 12500);
        assert_eq!(tx.path_depth(), 4);
        assert_eq!(tx.related_object.unwrap().kind.as_deref(), Some("project"));
    }

    #[test]
    fn test_related_object_skills() {
        let obj = RelatedObject {
            attrs: Some(serde_json::json!({"skills": ["go", 3, "algo"]})),
            ..Default::default()
        };
        assert_eq!(obj.skills(), vec!["go".to_string(), "algo".to_string()]);
        assert!(RelatedObject::default().skills().is_empty());
    }
}
