//! One fetched data set

use chrono::{DateTime, Utc};

use super::{LevelEvent, ProgressRecord, Transaction, UserProfile};

/// Everything one load cycle fetched
///
/// Immutable once built; the coordinator swaps whole snapshots.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub user: UserProfile,
    /// Newest first, as returned by the API
    pub transactions: Vec<Transaction>,
    pub progress: Vec<ProgressRecord>,
    /// Server-side XP aggregate
    pub total_xp: i64,
    pub level_events: Vec<LevelEvent>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Level of the current user in the distribution, if enrolled
    pub fn user_level(&self) -> Option<i64> {
        self.level_events
            .iter()
            .find(|e| e.user_id == self.user.id)
            .map(|e| e.level)
    }
}
