//! Timestamp parsing and the completion-date fallback policy

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::models::ProgressRecord;

/// Why a raw timestamp could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp missing")]
    Missing,
    #[error("unparseable timestamp '{0}'")]
    Invalid(String),
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a platform timestamp
///
/// Accepts RFC 3339, zone-less date-times (taken as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimestampError::Missing);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError::Invalid(raw.to_string()))
}

/// Parse an optional timestamp field
pub fn parse_optional(raw: Option<&str>) -> Result<DateTime<Utc>, TimestampError> {
    raw.map_or(Err(TimestampError::Missing), parse_timestamp)
}

/// When a project was actually finished
///
/// `updatedAt` (last modification) wins over `createdAt`; if neither parses,
/// falls back to `now` and logs a warning.
pub fn completion_date(record: &ProgressRecord, now: DateTime<Utc>) -> DateTime<Utc> {
    parse_optional(record.updated_at.as_deref())
        .or_else(|_| parse_optional(record.created_at.as_deref()))
        .unwrap_or_else(|e| {
            tracing::warn!(
                record_id = record.id,
                error = %e,
                "Invalid dates in progress record, using current time"
            );
            now
        })
}
