//! Project pass/fail statistics

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::dates::completion_date;
use crate::charts::Palette;
use crate::models::{CategoricalSeries, Category, GradeOutcome, ProgressRecord};

/// Pass/fail counters over valid grades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Valid records completed in the last 7 days
    pub last_week: usize,
    /// Valid records completed in the last 30 days
    pub last_month: usize,
}

impl ProjectStats {
    pub fn success_rate(&self) -> u32 {
        success_rate(self.passed, self.total)
    }
}

/// Outcomes completed within a trailing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectTrends {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub success_rate: u32,
}

/// Passed share as a rounded percentage (0 when nothing counted)
pub fn success_rate(passed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (passed as f64 / total as f64 * 100.0).round() as u32
}

/// "Passed" and "Failed" counts, colored from the palette
pub fn success_failure_series(progress: &[ProgressRecord], palette: &Palette) -> CategoricalSeries {
    let (passed, failed) = count_outcomes(progress.iter());
    CategoricalSeries::new(vec![
        Category::new("Passed", passed as f64, &palette.success),
        Category::new("Failed", failed as f64, &palette.error),
    ])
}

fn count_outcomes<'a>(records: impl Iterator<Item = &'a ProgressRecord>) -> (usize, usize) {
    records.fold((0, 0), |(passed, failed), r| match r.outcome() {
        Some(GradeOutcome::Passed) => (passed + 1, failed),
        Some(GradeOutcome::Failed) => (passed, failed + 1),
        None => (passed, failed),
    })
}

/// Counters over records with a valid grade (0 or >= 1)
pub fn project_stats(progress: &[ProgressRecord], now: DateTime<Utc>) -> ProjectStats {
    let week_ago = now - Duration::days(7);
    let month_ago = now - Duration::days(30);

    let valid: Vec<&ProgressRecord> = progress.iter().filter(|r| r.outcome().is_some()).collect();
    let (passed, failed) = count_outcomes(valid.iter().copied());

    let mut stats = ProjectStats {
        total: valid.len(),
        passed,
        failed,
        ..Default::default()
    };

    for record in valid {
        let completed = completion_date(record, now);
        if completed >= week_ago {
            stats.last_week += 1;
        }
        if completed >= month_ago {
            stats.last_month += 1;
        }
    }

    stats
}

/// Outcomes of records completed within the last `days` days
pub fn project_trends(progress: &[ProgressRecord], days: i64, now: DateTime<Utc>) -> ProjectTrends {
    let cutoff = now - Duration::days(days);
    let recent: Vec<&ProgressRecord> = progress
        .iter()
        .filter(|r| completion_date(r, now) >= cutoff)
        .collect();
    let (passed, failed) = count_outcomes(recent.iter().copied());

    ProjectTrends {
        total: recent.len(),
        passed,
        failed,
        success_rate: success_rate(passed, recent.len()),
    }
}

/// Unique names of graded projects, oldest completion first
pub fn completed_project_order(progress: &[ProgressRecord], now: DateTime<Utc>) -> Vec<String> {
    let mut completed: Vec<(DateTime<Utc>, &str)> = progress
        .iter()
        .filter(|r| r.outcome().is_some())
        .filter_map(|r| r.object_name().map(|name| (completion_date(r, now), name)))
        .collect();
    completed.sort_by_key(|(at, _)| *at);

    let mut names: Vec<String> = Vec::new();
    for (_, name) in completed {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
