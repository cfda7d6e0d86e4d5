//! Level distribution across cohorts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{LevelEvent, StackedRow, StackedSeries, Subcategory};

/// Bucket name for events whose id maps to no cohort
pub const UNKNOWN_COHORT: &str = "Unknown";

/// One cohort: the event id its members are enrolled under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub event_id: i64,
    pub name: String,
    pub color: String,
}

/// Ordered event-id -> cohort mapping (stack order bottom-up)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortMap(pub Vec<Cohort>);

impl Default for CohortMap {
    fn default() -> Self {
        let cohort = |event_id, name: &str, color: &str| Cohort {
            event_id,
            name: name.to_string(),
            color: color.to_string(),
        };
        Self(vec![
            cohort(20, "Cohort 1", "#6366f1"),
            cohort(72, "Cohort 2", "#a78bfa"),
            cohort(250, "Cohort 3", "#fbbf24"),
        ])
    }
}

impl CohortMap {
    pub fn event_ids(&self) -> Vec<i64> {
        self.0.iter().map(|c| c.event_id).collect()
    }

    fn position(&self, event_id: i64) -> Option<usize> {
        self.0.iter().position(|c| c.event_id == event_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Users per level, stacked by cohort, levels ascending
///
/// Unmapped event ids are counted in each row's `unknown` bucket, which is
/// never part of the stacked total.
pub fn level_histogram(events: &[LevelEvent], cohorts: &CohortMap) -> StackedSeries {
    let mut by_level: BTreeMap<i64, StackedRow> = BTreeMap::new();

    for event in events {
        let row = by_level.entry(event.level).or_insert_with(|| StackedRow {
            category: event.level,
            counts: vec![0; cohorts.len()],
            unknown: 0,
        });
        match cohorts.position(event.event_id) {
            Some(idx) => row.counts[idx] += 1,
            None => {
                tracing::debug!(
                    event_id = event.event_id,
                    user_id = event.user_id,
                    "Level event outside known cohorts"
                );
                row.unknown += 1;
            }
        }
    }

    StackedSeries {
        subcategories: cohorts
            .0
            .iter()
            .map(|c| Subcategory {
                name: c.name.clone(),
                color: c.color.clone(),
            })
            .collect(),
        rows: by_level.into_values().collect(),
    }
}
