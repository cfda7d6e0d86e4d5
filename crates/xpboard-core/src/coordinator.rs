//! Render coordinator: fetch, derive, render, present
//!
//! One cycle is `Idle -> Loading -> Rendered` (or back to `Idle` when the fetch
//! fails). Cycles are numbered; a cycle that finishes after a newer one started
//! is dropped instead of presented.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::analytics::{DashboardSummary, StatsEngine};
use crate::charts::{Canvas, ChartRenderer, ChartSlot, Scene, SceneKind};
use crate::client::DashboardClient;
use crate::config::DashboardConfig;
use crate::error::{CoreError, RenderIssue, RenderReport, SlotOutcome};
use crate::event::{DashboardEvent, EventBus};
use crate::models::{CategoricalSeries, PointSeries, Snapshot};
use crate::target::RenderTarget;
use crate::transport::{AuthProvider, GraphQlTransport};

/// Coordinator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Loading,
    Rendered,
}

/// How a load cycle ended (fetch failures are returned as errors)
#[derive(Debug)]
pub enum CycleResult {
    Rendered(RenderReport),
    /// A newer cycle started first; nothing was presented
    Superseded { generation: u64 },
}

impl CycleResult {
    pub fn report(&self) -> Option<&RenderReport> {
        match self {
            CycleResult::Rendered(report) => Some(report),
            CycleResult::Superseded { .. } => None,
        }
    }
}

/// Drives the dashboard: fetches a snapshot, renders every slot, presents them
pub struct RenderCoordinator {
    client: DashboardClient,
    auth: Arc<dyn AuthProvider>,
    target: Arc<dyn RenderTarget>,
    stats: StatsEngine,
    renderer: ChartRenderer,
    canvases: HashMap<ChartSlot, Canvas>,

    state: RwLock<CoordinatorState>,
    generation: AtomicU64,
    /// Last successfully fetched data set
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    event_bus: EventBus,
}

impl RenderCoordinator {
    pub fn new(
        client: DashboardClient,
        auth: Arc<dyn AuthProvider>,
        target: Arc<dyn RenderTarget>,
        stats: StatsEngine,
        renderer: ChartRenderer,
    ) -> Self {
        Self {
            client,
            auth,
            target,
            stats,
            renderer,
            canvases: ChartSlot::ALL
                .iter()
                .map(|slot| (*slot, slot.default_canvas()))
                .collect(),
            state: RwLock::new(CoordinatorState::Idle),
            generation: AtomicU64::new(0),
            snapshot: RwLock::new(None),
            event_bus: EventBus::default_capacity(),
        }
    }

    /// Wire everything from a config
    pub fn from_config(
        config: &DashboardConfig,
        transport: Arc<dyn GraphQlTransport>,
        auth: Arc<dyn AuthProvider>,
        target: Arc<dyn RenderTarget>,
    ) -> Self {
        let palette = config.palette();
        let client =
            DashboardClient::with_ttl(transport, config.cohorts.event_ids(), config.cache_ttl());
        let mut coordinator = Self::new(
            client,
            auth,
            target,
            StatsEngine::new(palette.clone(), config.cohorts.clone()),
            ChartRenderer::new(palette),
        );
        for slot in ChartSlot::ALL {
            coordinator.canvases.insert(slot, config.canvas_for(slot));
        }
        coordinator
    }

    pub fn with_canvas(mut self, slot: ChartSlot, canvas: Canvas) -> Self {
        self.canvases.insert(slot, canvas);
        self
    }

    pub fn state(&self) -> CoordinatorState {
        *self.state.read()
    }

    /// Number of the most recently started cycle
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().clone()
    }

    pub fn stats(&self) -> &StatsEngine {
        &self.stats
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn canvas(&self, slot: ChartSlot) -> Canvas {
        self.canvases
            .get(&slot)
            .copied()
            .unwrap_or_else(|| slot.default_canvas())
    }

    /// Scalar summary of the last snapshot
    pub fn summary(&self) -> Option<DashboardSummary> {
        self.snapshot()
            .map(|snapshot| self.stats.summarize(&snapshot, Utc::now()))
    }

    /// Start a cycle, reusing cached query results
    pub async fn load(&self) -> Result<CycleResult, CoreError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.write() = CoordinatorState::Loading;
        self.event_bus
            .publish(DashboardEvent::LoadStarted { generation });
        debug!(generation, "Load cycle started");

        if !self.auth.is_authenticated() {
            let err = CoreError::NotAuthenticated;
            self.fail(&err);
            return Err(err);
        }

        self.target.show_loading();
        let fetched = self.client.fetch_snapshot().await;

        if self.generation() != generation {
            debug!(generation, latest = self.generation(), "Cycle superseded");
            self.event_bus
                .publish(DashboardEvent::Superseded { generation });
            return Ok(CycleResult::Superseded { generation });
        }

        let (snapshot, malformed) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        let snapshot = Arc::new(snapshot);
        *self.snapshot.write() = Some(Arc::clone(&snapshot));

        let mut report = RenderReport::new();
        report.transactions_seen = snapshot.transactions.len();
        report.records_skipped = malformed.len();
        for err in &malformed {
            report.add_issue(RenderIssue::from_core_error("fetch", err));
        }

        self.render_all(&snapshot, &mut report);
        *self.state.write() = CoordinatorState::Rendered;

        let (warnings, errors, _) = report.error_count();
        info!(
            generation,
            transactions = report.transactions_seen,
            rendered = report.rendered_count(),
            warnings,
            errors,
            "Dashboard rendered"
        );
        self.event_bus.publish(DashboardEvent::CycleCompleted {
            generation,
            rendered: report.rendered_count(),
        });

        Ok(CycleResult::Rendered(report))
    }

    /// Drop cached results, then load
    pub async fn refresh(&self) -> Result<CycleResult, CoreError> {
        self.client.invalidate();
        self.load().await
    }

    fn fail(&self, err: &CoreError) {
        *self.state.write() = CoordinatorState::Idle;
        if err.is_auth_failure() {
            warn!(error = %err, "Authentication failed, logging out");
            self.auth.on_logout();
            self.event_bus.publish(DashboardEvent::LoggedOut);
        } else {
            error!(error = %err, "Dashboard load failed");
            self.target.show_error(&err.to_string());
            self.event_bus
                .publish(DashboardEvent::LoadFailed(err.to_string()));
        }
    }

    /// Render and present every slot; failures stay local to their slot
    fn render_all(&self, snapshot: &Snapshot, report: &mut RenderReport) {
        for slot in ChartSlot::ALL {
            let (scene, mut outcome) = match self.render_slot(slot, snapshot) {
                Ok(scene) if scene.kind == SceneKind::Empty => {
                    report.add_warning(slot.id(), "No data");
                    (scene, SlotOutcome::Placeholder)
                }
                Ok(scene) => (scene, SlotOutcome::Rendered),
                Err(e) => {
                    warn!(slot = %slot, error = %e, "Chart failed, showing placeholder");
                    report.add_issue(RenderIssue::from_core_error(slot.id(), &e));
                    (
                        self.renderer.render_error(self.canvas(slot), &e.to_string()),
                        SlotOutcome::Failed,
                    )
                }
            };

            if let Err(e) = self.target.present(slot, &scene) {
                error!(slot = %slot, error = %e, "Failed to present chart");
                report.add_issue(RenderIssue::from_core_error(slot.id(), &e));
                outcome = SlotOutcome::Failed;
            }

            report.record_slot(slot, outcome);
            self.event_bus
                .publish(DashboardEvent::SlotRendered { slot, outcome });
        }
    }

    pub fn render_slot(&self, slot: ChartSlot, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        match slot {
            ChartSlot::XpProgress => self.render_xp_progress(snapshot),
            ChartSlot::CumulativeXp => self.render_cumulative_xp(snapshot),
            ChartSlot::SuccessFailure => self.render_success_failure(snapshot),
            ChartSlot::AuditGivenReceived => self.render_audit_given_received(snapshot),
            ChartSlot::TopProjects => self.render_top_projects(snapshot),
            ChartSlot::TopSkills => self.render_top_skills(snapshot),
            ChartSlot::LevelHistogram => self.render_level_histogram(snapshot),
            ChartSlot::AuditPoints => self.render_audit_given_received_bars(snapshot),
        }
    }

    /// Raw running XP total as a line
    pub fn render_xp_progress(&self, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        let slot = ChartSlot::XpProgress;
        let series = checked_points(slot, self.stats.cumulative_xp(snapshot))?;
        Ok(self
            .renderer
            .render_line(&series, self.canvas(slot), &slot.labels()))
    }

    /// Smoothed per-project progression curve with point markers
    pub fn render_cumulative_xp(&self, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        let slot = ChartSlot::CumulativeXp;
        let series = checked_points(slot, self.stats.project_xp_progression(snapshot))?;
        Ok(self
            .renderer
            .render_cumulative_xp(&series, self.canvas(slot), &slot.labels()))
    }

    pub fn render_success_failure(&self, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        let slot = ChartSlot::SuccessFailure;
        let series = checked_categories(slot, self.stats.success_failure(snapshot))?;
        Ok(self
            .renderer
            .render_pie(&series, self.canvas(slot), &slot.labels()))
    }

    pub fn render_audit_given_received(&self, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        let slot = ChartSlot::AuditGivenReceived;
        let series = checked_categories(slot, self.stats.audit_given_received(snapshot))?;
        Ok(self
            .renderer
            .render_donut(&series, self.canvas(slot), &slot.labels()))
    }

    pub fn render_top_projects(&self, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        let slot = ChartSlot::TopProjects;
        let series = checked_categories(slot, self.stats.top_projects(snapshot))?;
        Ok(self
            .renderer
            .render_bars(&series, self.canvas(slot), &slot.labels()))
    }

    pub fn render_top_skills(&self, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        let slot = ChartSlot::TopSkills;
        let series = checked_categories(slot, self.stats.top_skills(snapshot))?;
        Ok(self
            .renderer
            .render_radar(&series, self.canvas(slot), &slot.labels()))
    }

    pub fn render_level_histogram(&self, snapshot: &Snapshot) -> Result<Scene, CoreError> {
        let slot = ChartSlot::LevelHistogram;
        let series = self.stats.level_distribution(snapshot);
        if series.subcategories.is_empty() && !series.rows.is_empty() {
            return Err(CoreError::transform(slot.id(), "no cohorts configured"));
        }
        Ok(self.renderer.render_level_histogram(
            &series,
            snapshot.user_level(),
            self.canvas(slot),
            &slot.labels(),
        ))
    }

    /// Audit points done/received as horizontal bars
    pub fn render_audit_given_received_bars(
        &self,
        snapshot: &Snapshot,
    ) -> Result<Scene, CoreError> {
        let slot = ChartSlot::AuditPoints;
        let series = checked_categories(slot, self.stats.audits_points(snapshot))?;
        Ok(self
            .renderer
            .render_horizontal_bars(&series, self.canvas(slot), &slot.labels()))
    }
}

/// Reject series a chart cannot place on a scale
fn checked_points(slot: ChartSlot, series: PointSeries) -> Result<PointSeries, CoreError> {
    if let Some(point) = series.points.iter().find(|p| !p.y.is_finite()) {
        return Err(CoreError::transform(
            slot.id(),
            format!("non-finite value at {:?}", point.label),
        ));
    }
    Ok(series)
}

fn checked_categories(
    slot: ChartSlot,
    series: CategoricalSeries,
) -> Result<CategoricalSeries, CoreError> {
    if let Some(item) = series
        .items
        .iter()
        .find(|c| !c.value.is_finite() || c.value < 0.0)
    {
        return Err(CoreError::transform(
            slot.id(),
            format!("invalid value {} for {:?}", item.value, item.label),
        ));
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_checked_categories_rejects_negative() {
        let series = CategoricalSeries::new(vec![
            Category::new("Done", 10.0, "#000"),
            Category::new("Received", -1.0, "#000"),
        ]);
        let err = checked_categories(ChartSlot::AuditPoints, series).unwrap_err();
        match err {
            CoreError::TransformFailure { chart, message } => {
                assert_eq!(chart, "audit_points");
                assert!(message.contains("Received"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_checked_points_rejects_nan() {
        let mut series = PointSeries::default();
        series.points.push(crate::models::SeriesPoint {
            x: crate::models::PointKey::Category("broken".to_string()),
            y: f64::NAN,
            delta: 0.0,
            label: "broken".to_string(),
        });
        assert!(checked_points(ChartSlot::XpProgress, series).is_err());
        assert!(checked_points(ChartSlot::XpProgress, PointSeries::default()).is_ok());
    }
}
