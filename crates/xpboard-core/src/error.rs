//! Error types for xpboard-core
//!
//! Provides the error hierarchy with thiserror plus a per-cycle report used for
//! graceful degradation: one broken chart never takes the dashboard down.

use std::path::PathBuf;
use thiserror::Error;

use crate::charts::ChartSlot;

/// Core error type for xpboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Transport Errors
    // ===================
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Authentication expired: {message}")]
    AuthExpired { message: String },

    #[error("No authentication token available")]
    NotAuthenticated,

    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    // ===================
    // Data Errors
    // ===================
    #[error("Data unavailable: {what}")]
    DataUnavailable { what: String },

    #[error("Malformed record {record_id} (field {field}): {message}")]
    MalformedRecord {
        record_id: String,
        field: String,
        message: String,
    },

    #[error("Failed to decode {what} from response")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to prepare chart {chart}: {message}")]
    TransformFailure { chart: String, message: String },

    // ===================
    // Config / IO Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// True when the failure must end the session (logout), not just this cycle
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, CoreError::AuthExpired { .. } | CoreError::NotAuthenticated)
    }

    pub fn network(message: impl Into<String>) -> Self {
        CoreError::Network {
            message: message.into(),
            source: None,
        }
    }

    pub fn transform(chart: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::TransformFailure {
            chart: chart.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Network {
            message: e.to_string(),
            source: Some(e),
        }
    }
}

/// Severity level for issues raised during a render cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Chart shows a "no data" placeholder
    Warning,
    /// Chart shows an error placeholder, siblings unaffected
    Error,
    /// Whole cycle aborted
    Fatal,
}

/// Individual entry in a render report
#[derive(Debug, Clone)]
pub struct RenderIssue {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl RenderIssue {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    /// Create user-friendly issue from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let (message, suggestion, severity) = match error {
            CoreError::AuthExpired { message } => (
                format!("Session expired: {}", message),
                Some("Sign in again and export a fresh XPBOARD_TOKEN".to_string()),
                ErrorSeverity::Fatal,
            ),
            CoreError::NotAuthenticated => (
                "No token configured".to_string(),
                Some("Pass --token or set XPBOARD_TOKEN".to_string()),
                ErrorSeverity::Fatal,
            ),
            CoreError::Network { message, .. } => (
                format!("Network error: {}", message),
                Some("Check your connection and the configured endpoint".to_string()),
                ErrorSeverity::Fatal,
            ),
            CoreError::TransformFailure { chart, message } => (
                format!("{}: {}", chart, message),
                None,
                ErrorSeverity::Error,
            ),
            CoreError::DataUnavailable { what } => {
                (format!("No data: {}", what), None, ErrorSeverity::Warning)
            }
            CoreError::MalformedRecord {
                record_id,
                field,
                message,
            } => (
                format!("Skipped {} record {}: {}", field, record_id, message),
                None,
                ErrorSeverity::Warning,
            ),
            _ => (error.to_string(), None, ErrorSeverity::Error),
        };

        Self {
            source,
            message,
            severity,
            suggestion,
        }
    }
}

/// What happened to a single chart slot in a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    Rendered,
    Placeholder,
    Failed,
}

/// Report of a render cycle
///
/// Tracks per-slot outcomes so a partial failure is visible without
/// failing the whole cycle.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub issues: Vec<RenderIssue>,
    pub slots: Vec<(ChartSlot, SlotOutcome)>,
    pub transactions_seen: usize,
    pub records_skipped: usize,
}

impl RenderReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: RenderIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.issues.push(RenderIssue::warning(source, message));
    }

    pub fn record_slot(&mut self, slot: ChartSlot, outcome: SlotOutcome) {
        self.slots.push((slot, outcome));
    }

    /// Outcome recorded for a slot, if the slot ran this cycle
    pub fn outcome(&self, slot: ChartSlot) -> Option<SlotOutcome> {
        self.slots
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, outcome)| *outcome)
    }

    /// Returns true if there are any issues (including warnings)
    pub fn has_errors(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Number of slots that produced a real chart
    pub fn rendered_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|(_, o)| *o == SlotOutcome::Rendered)
            .count()
    }

    /// Returns count by severity
    pub fn error_count(&self) -> (usize, usize, usize) {
        let count = |severity| {
            self.issues
                .iter()
                .filter(|e| e.severity == severity)
                .count()
        };
        (
            count(ErrorSeverity::Warning),
            count(ErrorSeverity::Error),
            count(ErrorSeverity::Fatal),
        )
    }
}
