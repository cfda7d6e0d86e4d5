//! XP-derived series: trends, cumulative curves and per-project totals

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

use super::dates::parse_timestamp;
use crate::format::format_date;
use crate::models::{CategoricalSeries, Category, PointKey, PointSeries, SeriesPoint, Transaction};

/// Paths with this many segments or more are exercise-level, not project-level
const MAX_PROJECT_PATH_DEPTH: usize = 5;

/// XP earned in rolling windows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XpTrends {
    pub last_week: i64,
    pub last_month: i64,
    /// Most recent XP transaction
    pub last_xp: Option<Transaction>,
}

/// Progress towards the next level of the XP ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp_needed_for_next: i64,
    /// 0.0-100.0
    pub progress_to_next_level: f64,
}

/// Project name: last slash-delimited segment of the path
pub fn project_name(path: Option<&str>) -> String {
    path.and_then(|p| p.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

/// XP transactions paired with their parsed timestamp, in fetch order
///
/// Records with unparseable dates are skipped with a warning.
fn dated_xp(transactions: &[Transaction]) -> Vec<(DateTime<Utc>, &Transaction)> {
    transactions
        .iter()
        .filter(|t| t.is_xp())
        .filter_map(|t| match parse_timestamp(&t.created_at) {
            Ok(ts) => Some((ts, t)),
            Err(e) => {
                tracing::warn!(transaction_id = t.id, error = %e, "Skipping XP transaction");
                None
            }
        })
        .collect()
}

/// Sum of XP earned in `[now - window_days, now]`
pub fn xp_trend(transactions: &[Transaction], window_days: i64, now: DateTime<Utc>) -> i64 {
    let cutoff = now - Duration::days(window_days);
    dated_xp(transactions)
        .into_iter()
        .filter(|(ts, _)| *ts >= cutoff && *ts <= now)
        .map(|(_, t)| t.amount)
        .sum()
}

/// Last-week and last-month XP plus the latest XP transaction
pub fn xp_trends(transactions: &[Transaction], now: DateTime<Utc>) -> XpTrends {
    let last_xp = dated_xp(transactions)
        .into_iter()
        .fold(None::<(DateTime<Utc>, &Transaction)>, |latest, (ts, t)| match latest {
            Some((best, _)) if best >= ts => latest,
            _ => Some((ts, t)),
        })
        .map(|(_, t)| t.clone());

    XpTrends {
        last_week: xp_trend(transactions, 7, now),
        last_month: xp_trend(transactions, 30, now),
        last_xp,
    }
}

/// Running XP total, one point per XP transaction in time order
///
/// The sort is stable so equal timestamps keep fetch order.
pub fn cumulative_xp_series(transactions: &[Transaction]) -> PointSeries {
    let mut dated = dated_xp(transactions);
    dated.sort_by_key(|(ts, _)| *ts);

    let mut running = 0i64;
    let points = dated
        .into_iter()
        .map(|(ts, t)| {
            running += t.amount;
            SeriesPoint {
                x: PointKey::Time(ts),
                y: running as f64,
                delta: t.amount as f64,
                label: format_date(ts),
            }
        })
        .collect();

    PointSeries { points }
}

/// One point per unique project, cumulative over first occurrences only
///
/// Only project-level paths (fewer than 5 segments) count; when a project
/// appears again later its XP is skipped.
pub fn deduplicated_project_xp_series(transactions: &[Transaction]) -> PointSeries {
    let mut dated: Vec<_> = dated_xp(transactions)
        .into_iter()
        .filter(|(_, t)| {
            t.path.as_deref().is_some_and(|p| !p.is_empty())
                && t.path_depth() < MAX_PROJECT_PATH_DEPTH
        })
        .collect();
    dated.sort_by_key(|(ts, _)| *ts);

    let mut seen = HashSet::new();
    let mut running = 0i64;
    let mut points = Vec::new();

    for (_, t) in dated {
        let name = project_name(t.path.as_deref());
        if !seen.insert(name.clone()) {
            continue;
        }
        running += t.amount;
        points.push(SeriesPoint {
            x: PointKey::Category(name.clone()),
            y: running as f64,
            delta: t.amount as f64,
            label: name,
        });
    }

    PointSeries { points }
}

/// Projects ranked by total XP, descending
///
/// `allow_list` restricts the ranking to the named projects (e.g. completed ones).
pub fn top_projects_by_xp(
    transactions: &[Transaction],
    limit: usize,
    allow_list: Option<&[String]>,
    color: &str,
) -> CategoricalSeries {
    let mut by_project: HashMap<String, i64> = HashMap::new();

    for t in transactions.iter().filter(|t| t.is_xp()) {
        let name = project_name(t.path.as_deref());
        if let Some(allowed) = allow_list {
            if !allowed.contains(&name) {
                continue;
            }
        }
        *by_project.entry(name).or_default() += t.amount;
    }

    let mut ranked: Vec<(String, i64)> = by_project.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);

    CategoricalSeries::new(
        ranked
            .into_iter()
            .map(|(name, xp)| Category::new(name, xp as f64, color))
            .collect(),
    )
}

/// Position on the level ladder: 1000 XP for the first level, +10% per level
pub fn level_progress(total_xp: i64) -> LevelProgress {
    let mut level = 0u32;
    let mut xp_for_next: i64 = 1000;
    let mut accumulated: i64 = 0;

    // Stops at the top of the ladder once the threshold no longer fits in i64
    while let Some(threshold) = accumulated.checked_add(xp_for_next) {
        if threshold >= total_xp {
            break;
        }
        accumulated = threshold;
        level += 1;
        xp_for_next = (xp_for_next as f64 * 1.1).floor() as i64;
    }

    let into_level = total_xp - accumulated;
    LevelProgress {
        level,
        xp_needed_for_next: xp_for_next - into_level,
        progress_to_next_level: into_level as f64 / xp_for_next as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn xp(id: i64, amount: i64, at: &str, path: &str) -> Transaction {
        Transaction {
            id,
            kind: "xp".to_string(),
            amount,
            created_at: at.to_string(),
            path: Some(path.to_string()),
            related_object: None,
        }
    }

    #[test]
    fn test_project_name() {
        assert_eq!(project_name(Some("/bahrain/bh-module/go-reloaded")), "go-reloaded");
        assert_eq!(project_name(Some("single")), "single");
        assert_eq!(project_name(Some("")), "Unknown");
        assert_eq!(project_name(Some("/a/b/")), "Unknown");
        assert_eq!(project_name(None), "Unknown");
    }

    #[test]
    fn test_xp_trend_window_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let txs = vec![
            xp(1, 100, "2024-06-29T12:00:00Z", "/a/p1"),
            xp(2, 50, "2024-06-01T12:00:00Z", "/a/p2"),
            xp(3, 999, "2024-07-01T12:00:00Z", "/a/future"),
        ];
        assert_eq!(xp_trend(&txs, 7, now), 100);
        assert_eq!(xp_trend(&txs, 30, now), 150);
    }

    #[test]
    fn test_xp_trends_latest() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let txs = vec![
            xp(1, 10, "2024-06-01T00:00:00Z", "/a/old"),
            xp(2, 20, "2024-06-20T00:00:00Z", "/a/new"),
        ];
        let trends = xp_trends(&txs, now);
        assert_eq!(trends.last_xp.map(|t| t.id), Some(2));
        assert_eq!(trends.last_month, 30);
        assert_eq!(trends.last_week, 0);
    }

    #[test]
    fn test_cumulative_series_stable_on_equal_timestamps() {
        let txs = vec![
            xp(1, 5, "2024-01-02T00:00:00Z", "/a/b"),
            xp(2, 7, "2024-01-01T00:00:00Z", "/a/c"),
            xp(3, 11, "2024-01-01T00:00:00Z", "/a/d"),
        ];
        let series = cumulative_xp_series(&txs);
        let deltas: Vec<f64> = series.points.iter().map(|p| p.delta).collect();
        assert_eq!(deltas, vec![7.0, 11.0, 5.0]);
        assert_eq!(series.final_value(), 23.0);
    }

    #[test]
    fn test_cumulative_series_skips_bad_dates() {
        let txs = vec![
            xp(1, 5, "bogus", "/a/b"),
            xp(2, 7, "2024-01-01T00:00:00Z", "/a/c"),
        ];
        let series = cumulative_xp_series(&txs);
        assert_eq!(series.len(), 1);
        assert_eq!(series.final_value(), 7.0);
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let txs = vec![
            xp(1, 300, "2024-01-03T00:00:00Z", "/bh/module/ascii-art"),
            xp(2, 100, "2024-01-01T00:00:00Z", "/bh/module/go-reloaded"),
            xp(3, 200, "2024-01-02T00:00:00Z", "/bh/module/go-reloaded"),
            xp(4, 50, "2024-01-04T00:00:00Z", "/bh/module/piscine-js/quest-01"),
        ];
        let series = deduplicated_project_xp_series(&txs);
        let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["go-reloaded", "ascii-art"]);
        assert_eq!(series.values().collect::<Vec<_>>(), vec![100.0, 400.0]);
    }

    #[test]
    fn test_top_projects_allow_list_and_limit() {
        let txs = vec![
            xp(1, 100, "2024-01-01T00:00:00Z", "/a/alpha"),
            xp(2, 300, "2024-01-01T00:00:00Z", "/a/beta"),
            xp(3, 50, "2024-01-01T00:00:00Z", "/a/alpha"),
            xp(4, 500, "2024-01-01T00:00:00Z", "/a/gamma"),
        ];
        let top = top_projects_by_xp(&txs, 2, None, "#000");
        assert_eq!(top.labels(), vec!["gamma", "beta"]);

        let allowed = vec!["alpha".to_string(), "beta".to_string()];
        let top = top_projects_by_xp(&txs, 10, Some(&allowed), "#000");
        assert_eq!(top.labels(), vec!["beta", "alpha"]);
        assert_eq!(top.get("alpha").map(|c| c.value), Some(150.0));
    }

    #[test]
    fn test_level_progress_ladder() {
        let start = level_progress(0);
        assert_eq!(start.level, 0);
        assert_eq!(start.xp_needed_for_next, 1000);

        let mid = level_progress(1500);
        assert_eq!(mid.level, 1);
        assert_eq!(mid.xp_needed_for_next, 600);
        assert!((mid.progress_to_next_level - 500.0 / 1100.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_level_progress_huge_total_does_not_overflow() {
        let top = level_progress(i64::MAX);
        assert!(top.level > 100);
        assert!(top.xp_needed_for_next >= 0);
    }

    #[test]
    fn test_dedup_skips_empty_paths() {
        let txs = vec![
            xp(1, 40, "2024-01-01T00:00:00Z", ""),
            xp(2, 60, "2024-01-02T00:00:00Z", "/a/real"),
        ];
        let series = deduplicated_project_xp_series(&txs);
        let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["real"]);
        assert_eq!(series.final_value(), 60.0);
    }
}
