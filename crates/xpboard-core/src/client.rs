//! Typed dashboard queries with a time-boxed result cache

use chrono::Utc;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::models::{LevelEvent, ProgressRecord, Snapshot, Transaction, UserProfile};
use crate::queries;
use crate::transport::GraphQlTransport;

/// Default lifetime of a cached query result
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Records decoded from a list field, plus the ones that were unusable
#[derive(Debug)]
pub struct Fetched<T> {
    pub records: Vec<T>,
    /// One `MalformedRecord` per skipped element
    pub malformed: Vec<CoreError>,
}

/// Decode every element of `data[field]`, skipping malformed ones
fn decode_list<T: DeserializeOwned>(data: &Value, field: &str) -> Result<Fetched<T>, CoreError> {
    let items = data
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::DataUnavailable {
            what: field.to_string(),
        })?;

    let mut records = Vec::with_capacity(items.len());
    let mut malformed = Vec::new();
    for item in items {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                let record_id = item
                    .get("id")
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "?".to_string());
                warn!(field, id = %record_id, error = %e, "Skipping malformed record");
                malformed.push(CoreError::MalformedRecord {
                    record_id,
                    field: field.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(Fetched { records, malformed })
}

/// Dashboard data source over a GraphQL transport
///
/// Results are memoized per document for the cache TTL; `invalidate` drops
/// everything so the next load hits the network.
pub struct DashboardClient {
    transport: Arc<dyn GraphQlTransport>,
    cache: Cache<String, Value>,
    level_event_ids: Vec<i64>,
}

impl DashboardClient {
    pub fn new(transport: Arc<dyn GraphQlTransport>, level_event_ids: Vec<i64>) -> Self {
        Self::with_ttl(transport, level_event_ids, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(
        transport: Arc<dyn GraphQlTransport>,
        level_event_ids: Vec<i64>,
        ttl: Duration,
    ) -> Self {
        Self {
            transport,
            cache: Cache::builder()
                .max_capacity(32)
                .time_to_live(ttl)
                .build(),
            level_event_ids,
        }
    }

    /// Drop every cached result
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
        debug!("Query cache invalidated");
    }

    async fn cached_query(&self, document: &str, variables: Value) -> Result<Value, CoreError> {
        let key = format!("{}|{}", document, variables);
        if let Some(hit) = self.cache.get(&key).await {
            debug!("Query cache hit");
            return Ok(hit);
        }
        let data = self.transport.query(document, variables).await?;
        self.cache.insert(key, data.clone()).await;
        Ok(data)
    }

    pub async fn fetch_user(&self) -> Result<UserProfile, CoreError> {
        let data = self.cached_query(queries::USER_QUERY, json!({})).await?;
        let first = data
            .get("user")
            .and_then(Value::as_array)
            .and_then(|users| users.first())
            .ok_or_else(|| CoreError::DataUnavailable {
                what: "user profile".to_string(),
            })?;
        serde_json::from_value(first.clone()).map_err(|source| CoreError::Decode {
            what: "user profile".to_string(),
            source,
        })
    }

    /// Server-side XP sum (0 when the aggregate is null)
    pub async fn fetch_total_xp(&self) -> Result<i64, CoreError> {
        let data = self.cached_query(queries::TOTAL_XP_QUERY, json!({})).await?;
        let amount = &data["transaction_aggregate"]["aggregate"]["sum"]["amount"];
        Ok(amount
            .as_i64()
            .or_else(|| amount.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0))
    }

    pub async fn fetch_transactions(&self) -> Result<Fetched<Transaction>, CoreError> {
        let data = self.cached_query(queries::TRANSACTIONS_QUERY, json!({})).await?;
        decode_list(&data, "transaction")
    }

    pub async fn fetch_progress(&self) -> Result<Fetched<ProgressRecord>, CoreError> {
        let data = self.cached_query(queries::PROGRESS_QUERY, json!({})).await?;
        decode_list(&data, "progress")
    }

    pub async fn fetch_level_events(&self) -> Result<Fetched<LevelEvent>, CoreError> {
        let data = self
            .cached_query(
                queries::LEVEL_EVENTS_QUERY,
                json!({ "eventIds": self.level_event_ids }),
            )
            .await?;
        decode_list(&data, "event_user")
    }

    /// All five queries concurrently; the first failure aborts the fetch
    ///
    /// Returns the snapshot and one `MalformedRecord` per skipped element.
    pub async fn fetch_snapshot(&self) -> Result<(Snapshot, Vec<CoreError>), CoreError> {
        let (user, total_xp, transactions, progress, level_events) = tokio::try_join!(
            self.fetch_user(),
            self.fetch_total_xp(),
            self.fetch_transactions(),
            self.fetch_progress(),
            self.fetch_level_events(),
        )?;

        let mut malformed = transactions.malformed;
        malformed.extend(progress.malformed);
        malformed.extend(level_events.malformed);
        let snapshot = Snapshot {
            user,
            transactions: transactions.records,
            progress: progress.records,
            total_xp,
            level_events: level_events.records,
            fetched_at: Utc::now(),
        };
        Ok((snapshot, malformed))
    }
}
