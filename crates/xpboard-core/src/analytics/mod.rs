//! Statistics engine for the XP dashboard
//!
//! Pure derivations from fetched records to chart-ready series and scalar
//! summaries. Nothing here performs I/O or rendering; time-dependent functions
//! take an explicit `now`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::charts::Palette;
use crate::format::{format_bytes, initials, time_ago};
use crate::models::{CategoricalSeries, PointSeries, Snapshot, StackedSeries};

pub mod audits;
pub mod dates;
pub mod levels;
pub mod outcomes;
pub mod skills;
pub mod xp;


pub use audits::{
    audit_given_received_series, audit_ratio, audit_ratio_is_low, audits_points_series,
};
pub use dates::{completion_date, parse_timestamp, TimestampError};
pub use levels::{level_histogram, Cohort, CohortMap, UNKNOWN_COHORT};
pub use outcomes::{
    completed_project_order, project_stats, project_trends, success_failure_series, success_rate,
    ProjectStats, ProjectTrends,
};
pub use skills::{extract_skills, skills_distribution, top_skills_by_best_score, SkillShare};
pub use xp::{
    cumulative_xp_series, deduplicated_project_xp_series, level_progress, project_name,
    top_projects_by_xp, xp_trend, xp_trends, LevelProgress, XpTrends,
};

/// Default size of the top-projects ranking
pub const TOP_PROJECTS_LIMIT: usize = 10;
/// Default size of the top-skills ranking
pub const TOP_SKILLS_LIMIT: usize = 6;
/// Trailing window of the recent-outcomes line in the summary
pub const RECENT_TRENDS_DAYS: i64 = 30;

/// Derivations bound to a palette, cohort mapping and ranking limits
#[derive(Debug, Clone)]
pub struct StatsEngine {
    palette: Palette,
    cohorts: CohortMap,
    top_projects_limit: usize,
    top_skills_limit: usize,
}

impl Default for StatsEngine {
    fn default() -> Self {
        Self::new(Palette::default(), CohortMap::default())
    }
}

impl StatsEngine {
    pub fn new(palette: Palette, cohorts: CohortMap) -> Self {
        Self {
            palette,
            cohorts,
            top_projects_limit: TOP_PROJECTS_LIMIT,
            top_skills_limit: TOP_SKILLS_LIMIT,
        }
    }

    pub fn with_limits(mut self, top_projects: usize, top_skills: usize) -> Self {
        self.top_projects_limit = top_projects;
        self.top_skills_limit = top_skills;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn cohorts(&self) -> &CohortMap {
        &self.cohorts
    }

    pub fn cumulative_xp(&self, snapshot: &Snapshot) -> PointSeries {
        cumulative_xp_series(&snapshot.transactions)
    }

    pub fn project_xp_progression(&self, snapshot: &Snapshot) -> PointSeries {
        deduplicated_project_xp_series(&snapshot.transactions)
    }

    pub fn success_failure(&self, snapshot: &Snapshot) -> CategoricalSeries {
        success_failure_series(&snapshot.progress, &self.palette)
    }

    pub fn audit_given_received(&self, snapshot: &Snapshot) -> CategoricalSeries {
        audit_given_received_series(&snapshot.transactions, &self.palette)
    }

    pub fn audits_points(&self, snapshot: &Snapshot) -> CategoricalSeries {
        audits_points_series(snapshot.user.total_up, snapshot.user.total_down, &self.palette)
    }

    /// Top projects restricted to completed ones
    ///
    /// Falls back to every project when nothing is graded yet.
    pub fn top_projects(&self, snapshot: &Snapshot) -> CategoricalSeries {
        let completed = completed_project_order(&snapshot.progress, snapshot.fetched_at);
        let allow_list = (!completed.is_empty()).then_some(completed.as_slice());
        top_projects_by_xp(
            &snapshot.transactions,
            self.top_projects_limit,
            allow_list,
            &self.palette.primary,
        )
    }

    pub fn top_skills(&self, snapshot: &Snapshot) -> CategoricalSeries {
        top_skills_by_best_score(
            &snapshot.transactions,
            self.top_skills_limit,
            &self.palette.radar,
        )
    }

    pub fn level_distribution(&self, snapshot: &Snapshot) -> StackedSeries {
        level_histogram(&snapshot.level_events, &self.cohorts)
    }

    /// Scalar summary for the profile header and `stats` output
    pub fn summarize(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> DashboardSummary {
        let trends = xp_trends(&snapshot.transactions, now);
        let stats = project_stats(&snapshot.progress, now);
        let level = level_progress(snapshot.total_xp);
        let user = &snapshot.user;
        let display_name = user.display_name();
        let last_xp_ago = trends
            .last_xp
            .as_ref()
            .and_then(|t| parse_timestamp(&t.created_at).ok())
            .map(|ts| time_ago(ts, now));

        DashboardSummary {
            login: user.login.clone(),
            initials: initials(&display_name),
            display_name,
            email: user.email().map(str::to_string),
            total_xp: snapshot.total_xp,
            audit_ratio: audit_ratio(user.total_up, user.total_down),
            audit_ratio_low: audit_ratio_is_low(user.total_up, user.total_down),
            audit_done: format_bytes(user.total_up),
            audit_received: format_bytes(user.total_down),
            xp_last_week: trends.last_week,
            xp_last_month: trends.last_month,
            last_xp_project: trends
                .last_xp
                .as_ref()
                .map(|t| project_name(t.path.as_deref())),
            last_xp_ago,
            projects: stats,
            recent_projects: project_trends(&snapshot.progress, RECENT_TRENDS_DAYS, now),
            level: level.level,
            progress_to_next_level: level.progress_to_next_level,
            cohort_level: snapshot.user_level(),
            top_skills: self
                .top_skills(snapshot)
                .items
                .into_iter()
                .map(|c| c.label)
                .collect(),
            declared_skills: skills_distribution(&snapshot.progress),
            computed_at: now,
        }
    }
}

/// Scalar figures shown next to the charts
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub login: String,
    pub display_name: String,
    /// Avatar initials derived from the display name
    pub initials: String,
    pub email: Option<String>,
    pub total_xp: i64,
    pub audit_ratio: String,
    /// Ratio below 1: more audits received than done
    pub audit_ratio_low: bool,
    /// Audit volume done, as "kB"/"MB"
    pub audit_done: String,
    pub audit_received: String,
    pub xp_last_week: i64,
    pub xp_last_month: i64,
    pub last_xp_project: Option<String>,
    /// "3 days ago" for the latest XP transaction
    pub last_xp_ago: Option<String>,
    pub projects: ProjectStats,
    pub recent_projects: ProjectTrends,
    pub level: u32,
    pub progress_to_next_level: f64,
    /// Level in the cohort distribution, when enrolled
    pub cohort_level: Option<i64>,
    pub top_skills: Vec<String>,
    /// Skills declared in project attributes with their share
    pub declared_skills: Vec<SkillShare>,
    pub computed_at: DateTime<Utc>,
}
