//! User profile record

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authenticated user's profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub login: String,

    /// Free-form attributes (email, firstName, lastName, ...)
    #[serde(default)]
    pub attrs: Value,

    /// Audit points given
    #[serde(default, deserialize_with = "super::deserialize_lenient_i64")]
    pub total_up: i64,

    /// Audit points received
    #[serde(default, deserialize_with = "super::deserialize_lenient_i64")]
    pub total_down: i64,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl UserProfile {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Best available human name: first + last, then the display-name variants, then login
    pub fn display_name(&self) -> String {
        let first = self.attr("firstName");
        let last = self.attr("lastName");
        match (first, last) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(f), None) => f.to_string(),
            (None, Some(l)) => l.to_string(),
            (None, None) => self
                .attr("displayName")
                .or_else(|| self.attr("name"))
                .unwrap_or(&self.login)
                .to_string(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.attr("email")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let mut user = UserProfile {
            login: "jdoe".to_string(),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "jdoe");

        user.attrs = serde_json::json!({"displayName": "Johnny"});
        assert_eq!(user.display_name(), "Johnny");

        user.attrs = serde_json::json!({"firstName": "John", "lastName": "Doe", "email": "j@d.io"});
        assert_eq!(user.display_name(), "John Doe");
        assert_eq!(user.email(), Some("j@d.io"));
    }

    #[test]
    fn test_lenient_totals() {
        let json = r#"{"id": 1, "login": "a", "totalUp": 1536000.0, "totalDown": null}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.total_up, 1_536_000);
        assert_eq!(user.total_down, 0);
    }
}
