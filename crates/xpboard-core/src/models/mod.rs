//! Data models for xpboard
//!
//! Raw records mirror the GraphQL response shapes (camelCase). Timestamps are
//! kept as the raw strings the platform sends; parsing happens in
//! `analytics::dates` so a malformed field degrades one record, not the batch.

pub mod level_event;
pub mod progress;
pub mod series;
pub mod snapshot;
pub mod transaction;
pub mod user;

pub use level_event::LevelEvent;
pub use progress::{GradeOutcome, ProgressRecord};
pub use series::{
    CategoricalSeries, Category, PointKey, PointSeries, SeriesPoint, StackedRow, StackedSeries,
    Subcategory,
};
pub use snapshot::Snapshot;
pub use transaction::{RelatedObject, Transaction};
pub use user::UserProfile;

use serde::{Deserialize, Deserializer};

/// Accept integer or float JSON numbers (and null) for amount-like fields
///
/// The platform occasionally serializes integral amounts as floats.
pub(crate) fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(value
        .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)))
        .unwrap_or(0))
}
