//! Level distribution records (one per user enrolled in a cohort event)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEvent {
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub event_id: i64,
}
