//! End-to-end render cycles over a scripted GraphQL transport

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use xpboard_core::analytics::CohortMap;
use xpboard_core::charts::SceneKind;
use xpboard_core::error::ErrorSeverity;
use xpboard_core::{
    AuthProvider, ChartSlot, CoordinatorState, CoreError, CycleResult, DashboardClient,
    DashboardConfig, DashboardEvent, GraphQlTransport, MemoryTarget, RefreshScheduler,
    RenderCoordinator, SlotOutcome, SvgFileTarget,
};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Clone, Copy)]
enum Failure {
    Auth,
    Network,
}

/// Answers by operation name; optionally fails or delays the first calls
struct ScriptedTransport {
    calls: AtomicUsize,
    empty: bool,
    failure: RwLock<Option<Failure>>,
    delayed_calls: usize,
    delay: Duration,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            empty: false,
            failure: RwLock::new(None),
            delayed_calls: 0,
            delay: Duration::ZERO,
        }
    }

    fn empty() -> Self {
        Self {
            empty: true,
            ..Self::new()
        }
    }

    fn failing(failure: Failure) -> Self {
        let transport = Self::new();
        *transport.failure.write() = Some(failure);
        transport
    }

    fn slow_first(calls: usize, delay: Duration) -> Self {
        Self {
            delayed_calls: calls,
            delay,
            ..Self::new()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphQlTransport for ScriptedTransport {
    async fn query(&self, document: &str, _variables: Value) -> Result<Value, CoreError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.delayed_calls {
            tokio::time::sleep(self.delay).await;
        }

        match *self.failure.read() {
            Some(Failure::Auth) => {
                return Err(CoreError::AuthExpired {
                    message: "JWTExpired".to_string(),
                })
            }
            Some(Failure::Network) => return Err(CoreError::network("connection refused")),
            None => {}
        }

        Ok(if self.empty {
            empty_payload(document)
        } else {
            full_payload(document)
        })
    }
}

fn full_payload(document: &str) -> Value {
    if document.contains("GetCurrentUser") {
        json!({ "user": [{
            "id": 7,
            "login": "jdoe",
            "attrs": { "firstName": "Jane", "lastName": "Doe" },
            "totalUp": 1_500_000,
            "totalDown": 1_000_000
        }] })
    } else if document.contains("GetUserXPTotal") {
        json!({ "transaction_aggregate": { "aggregate": { "sum": { "amount": 600 } } } })
    } else if document.contains("GetUserTransactions") {
        json!({ "transaction": [
            { "id": 9, "type": "skill_algo", "amount": 20, "createdAt": "2024-03-05T10:00:00Z" },
            { "id": 8, "type": "skill_rust", "amount": 30, "createdAt": "2024-03-04T10:00:00Z" },
            { "id": 7, "type": "skill_go", "amount": 65, "createdAt": "2024-03-03T10:00:00Z" },
            { "id": 6, "type": "audit", "amount": -1, "createdAt": "2024-03-02T10:00:00Z" },
            { "id": 5, "type": "audit", "amount": 1, "createdAt": "2024-03-01T10:00:00Z" },
            { "id": 4, "type": "xp", "amount": 300, "createdAt": "2024-02-20T10:00:00Z",
              "path": "/bahrain/bh-module/ascii-art" },
            { "id": 3, "type": "xp", "amount": 200, "createdAt": "2024-02-10T10:00:00Z",
              "path": "/bahrain/bh-module/go-reloaded" },
            { "id": 2, "type": "xp", "amount": 100, "createdAt": "2024-01-10T10:00:00Z",
              "path": "/bahrain/bh-module/piscine-go/quest-01" },
            { "id": 1, "amount": 5 }
        ] })
    } else if document.contains("GetUserProgress") {
        json!({ "progress": [
            { "id": 2, "grade": 1.4, "updatedAt": "2024-02-20T10:00:00Z",
              "path": "/bahrain/bh-module/ascii-art",
              "object": { "name": "ascii-art", "type": "project", "attrs": { "skills": ["go"] } } },
            { "id": 1, "grade": 0.0, "updatedAt": "2024-02-10T10:00:00Z",
              "path": "/bahrain/bh-module/go-reloaded",
              "object": { "name": "go-reloaded", "type": "project" } }
        ] })
    } else {
        json!({ "event_user": [
            { "level": 3, "userId": 7, "eventId": 72 },
            { "level": 3, "userId": 8, "eventId": 20 },
            { "level": 5, "userId": 9, "eventId": 250 },
            { "level": 5, "userId": 10, "eventId": 999 }
        ] })
    }
}

fn empty_payload(document: &str) -> Value {
    if document.contains("GetCurrentUser") {
        json!({ "user": [{ "id": 7, "login": "new" }] })
    } else if document.contains("GetUserXPTotal") {
        json!({ "transaction_aggregate": { "aggregate": { "sum": { "amount": null } } } })
    } else if document.contains("GetUserTransactions") {
        json!({ "transaction": [] })
    } else if document.contains("GetUserProgress") {
        json!({ "progress": [] })
    } else {
        json!({ "event_user": [] })
    }
}

struct FakeAuth {
    signed_in: AtomicBool,
    logouts: AtomicUsize,
}

impl FakeAuth {
    fn signed_in() -> Arc<Self> {
        Arc::new(Self {
            signed_in: AtomicBool::new(true),
            logouts: AtomicUsize::new(0),
        })
    }
}

impl AuthProvider for FakeAuth {
    fn is_authenticated(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    fn current_token(&self) -> Option<String> {
        self.is_authenticated().then(|| "token".to_string())
    }

    fn on_logout(&self) {
        self.signed_in.store(false, Ordering::SeqCst);
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

fn coordinator(
    transport: Arc<ScriptedTransport>,
    auth: Arc<FakeAuth>,
) -> (RenderCoordinator, Arc<MemoryTarget>) {
    let target = Arc::new(MemoryTarget::new());
    let coordinator = RenderCoordinator::from_config(
        &DashboardConfig::default(),
        transport,
        auth,
        target.clone(),
    );
    (coordinator, target)
}

// ============================================================================
// Render cycles
// ============================================================================

#[tokio::test]
async fn test_full_cycle_presents_every_slot() {
    let transport = Arc::new(ScriptedTransport::new());
    let (coordinator, target) = coordinator(transport.clone(), FakeAuth::signed_in());

    let result = coordinator.load().await.unwrap();
    let report = result.report().expect("cycle should render");

    assert_eq!(coordinator.state(), CoordinatorState::Rendered);
    assert_eq!(target.slot_count(), ChartSlot::ALL.len());
    assert_eq!(report.rendered_count(), ChartSlot::ALL.len());
    assert_eq!(report.records_skipped, 1);
    assert_eq!(target.loading_count(), 1);
    assert_eq!(transport.call_count(), 5);

    let histogram = target.scene(ChartSlot::LevelHistogram).unwrap();
    assert!(histogram.texts().contains(&"Your Level"));

    let pie = target.scene(ChartSlot::SuccessFailure).unwrap();
    assert!(pie.tooltips().iter().any(|t| t.starts_with("Passed: 1")));

    let snapshot = coordinator.snapshot().unwrap();
    assert_eq!(snapshot.total_xp, 600);
    assert_eq!(snapshot.user_level(), Some(3));

    let summary = coordinator.summary().unwrap();
    assert_eq!(summary.audit_ratio, "1.5");
    assert_eq!(summary.top_skills, vec!["go", "rust", "algo"]);
}

#[tokio::test]
async fn test_failed_chart_does_not_block_other_slots() {
    // level events arrive but no cohort can stack them
    let config = DashboardConfig {
        cohorts: CohortMap(vec![]),
        ..DashboardConfig::default()
    };
    let target = Arc::new(MemoryTarget::new());
    let coordinator = RenderCoordinator::from_config(
        &config,
        Arc::new(ScriptedTransport::new()),
        FakeAuth::signed_in(),
        target.clone(),
    );

    let result = coordinator.load().await.unwrap();
    let report = result.report().expect("cycle should render");

    assert_eq!(coordinator.state(), CoordinatorState::Rendered);
    assert_eq!(
        report.outcome(ChartSlot::LevelHistogram),
        Some(SlotOutcome::Failed)
    );
    let failed = target.scene(ChartSlot::LevelHistogram).unwrap();
    assert_eq!(failed.kind, SceneKind::Error);

    for slot in ChartSlot::ALL {
        if slot == ChartSlot::LevelHistogram {
            continue;
        }
        assert_eq!(report.outcome(slot), Some(SlotOutcome::Rendered), "{slot}");
        assert_eq!(target.scene(slot).unwrap().kind, SceneKind::Chart, "{slot}");
    }
    assert_eq!(report.rendered_count(), ChartSlot::ALL.len() - 1);

    let issue = report
        .issues
        .iter()
        .find(|i| i.source == ChartSlot::LevelHistogram.id())
        .expect("failed slot should be reported");
    assert_eq!(issue.severity, ErrorSeverity::Error);
}

#[tokio::test]
async fn test_empty_account_shows_placeholders() {
    let transport = Arc::new(ScriptedTransport::empty());
    let (coordinator, target) = coordinator(transport, FakeAuth::signed_in());

    let result = coordinator.load().await.unwrap();
    let report = result.report().unwrap();

    assert_eq!(coordinator.state(), CoordinatorState::Rendered);
    assert_eq!(report.outcome(ChartSlot::CumulativeXp), Some(SlotOutcome::Placeholder));
    assert_eq!(report.outcome(ChartSlot::TopSkills), Some(SlotOutcome::Placeholder));
    let (_, errors, fatal) = report.error_count();
    assert_eq!((errors, fatal), (0, 0));

    let scene = target.scene(ChartSlot::TopProjects).unwrap();
    assert_eq!(scene.kind, SceneKind::Empty);
    assert_eq!(scene.texts(), vec!["No project XP data available"]);
}

#[tokio::test]
async fn test_cache_reused_until_refresh() {
    let transport = Arc::new(ScriptedTransport::new());
    let (coordinator, _) = coordinator(transport.clone(), FakeAuth::signed_in());

    coordinator.load().await.unwrap();
    coordinator.load().await.unwrap();
    assert_eq!(transport.call_count(), 5);

    coordinator.refresh().await.unwrap();
    assert_eq!(transport.call_count(), 10);
    assert_eq!(coordinator.generation(), 3);
}

#[tokio::test]
async fn test_svg_target_writes_one_file_per_slot() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let coordinator = RenderCoordinator::from_config(
        &DashboardConfig::default(),
        transport,
        FakeAuth::signed_in(),
        Arc::new(SvgFileTarget::new(dir.path())),
    );

    coordinator.load().await.unwrap();

    for slot in ChartSlot::ALL {
        let path = dir.path().join(format!("{}.svg", slot.id()));
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"), "{} is not an svg", path.display());
    }
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_auth_expiry_logs_out() {
    let transport = Arc::new(ScriptedTransport::failing(Failure::Auth));
    let auth = FakeAuth::signed_in();
    let (coordinator, target) = coordinator(transport, auth.clone());
    let mut events = coordinator.event_bus().subscribe();

    let err = coordinator.load().await.unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(auth.logouts.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert_eq!(target.slot_count(), 0);
    assert!(target.errors().is_empty());

    assert_eq!(
        events.recv().await.unwrap(),
        DashboardEvent::LoadStarted { generation: 1 }
    );
    assert_eq!(events.recv().await.unwrap(), DashboardEvent::LoggedOut);
}

#[tokio::test]
async fn test_network_failure_surfaces_error() {
    let transport = Arc::new(ScriptedTransport::failing(Failure::Network));
    let auth = FakeAuth::signed_in();
    let (coordinator, target) = coordinator(transport, auth.clone());

    let err = coordinator.load().await.unwrap_err();

    assert!(matches!(err, CoreError::Network { .. }));
    assert_eq!(auth.logouts.load(Ordering::SeqCst), 0);
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert_eq!(target.errors().len(), 1);
    assert!(target.errors()[0].contains("connection refused"));
    assert!(coordinator.snapshot().is_none());
}

#[tokio::test]
async fn test_signed_out_never_fetches() {
    let transport = Arc::new(ScriptedTransport::new());
    let auth = FakeAuth::signed_in();
    auth.signed_in.store(false, Ordering::SeqCst);
    let (coordinator, _) = coordinator(transport.clone(), auth.clone());

    let err = coordinator.load().await.unwrap_err();

    assert!(matches!(err, CoreError::NotAuthenticated));
    assert_eq!(transport.call_count(), 0);
    assert_eq!(auth.logouts.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Supersede and scheduling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_newer_load_supersedes_in_flight_cycle() {
    // First cycle's five queries are slow, the second cycle's are instant
    let transport = Arc::new(ScriptedTransport::slow_first(5, Duration::from_millis(50)));
    let (coordinator, _) = coordinator(transport, FakeAuth::signed_in());

    let (first, second) = tokio::join!(coordinator.load(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        coordinator.load().await
    });

    assert!(matches!(
        first.unwrap(),
        CycleResult::Superseded { generation: 1 }
    ));
    assert!(matches!(second.unwrap(), CycleResult::Rendered(_)));
    assert_eq!(coordinator.state(), CoordinatorState::Rendered);
    assert_eq!(coordinator.generation(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_refreshes_until_dropped() {
    let transport = Arc::new(ScriptedTransport::new());
    let (coordinator, _) = coordinator(transport.clone(), FakeAuth::signed_in());
    let coordinator = Arc::new(coordinator);

    let scheduler = RefreshScheduler::start(Arc::clone(&coordinator), Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(125)).await;

    assert_eq!(coordinator.generation(), 2);
    assert_eq!(transport.call_count(), 10);

    drop(scheduler);
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(coordinator.generation(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_stops_after_logout() {
    let transport = Arc::new(ScriptedTransport::failing(Failure::Auth));
    let (coordinator, _) = coordinator(transport, FakeAuth::signed_in());
    let coordinator = Arc::new(coordinator);

    let scheduler = RefreshScheduler::start(Arc::clone(&coordinator), Duration::from_secs(30));
    tokio::time::sleep(Duration::from_secs(95)).await;

    assert!(scheduler.is_finished());
    assert_eq!(coordinator.generation(), 1);
}

#[tokio::test]
async fn test_client_snapshot_matches_coordinator_data() {
    let transport = Arc::new(ScriptedTransport::new());
    let client = DashboardClient::new(transport, vec![20, 72, 250]);

    let (snapshot, malformed) = client.fetch_snapshot().await.unwrap();

    assert_eq!(malformed.len(), 1);
    assert_eq!(snapshot.transactions.len(), 8);
    assert_eq!(snapshot.progress.len(), 2);
    assert_eq!(snapshot.level_events.len(), 4);
}
