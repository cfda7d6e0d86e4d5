//! xpboard-core - Core library for xpboard
//!
//! Fetches a learner's records over GraphQL, derives chart series from them,
//! and renders those series as resolution-independent SVG scenes.

pub mod analytics;
pub mod charts;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod format;
pub mod models;
pub mod queries;
pub mod scheduler;
pub mod target;
pub mod transport;

pub use analytics::{DashboardSummary, StatsEngine};
pub use charts::{ChartRenderer, ChartSlot, Palette, Scene};
pub use client::DashboardClient;
pub use config::DashboardConfig;
pub use coordinator::{CoordinatorState, CycleResult, RenderCoordinator};
pub use error::{CoreError, RenderReport, SlotOutcome};
pub use event::{DashboardEvent, EventBus};
pub use models::Snapshot;
pub use scheduler::RefreshScheduler;
pub use target::{MemoryTarget, RenderTarget, SvgFileTarget};
pub use transport::{AuthProvider, GraphQlTransport, HttpTransport, TokenAuth};
