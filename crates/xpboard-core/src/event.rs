//! Event bus for xpboard using tokio::broadcast
//!
//! The coordinator publishes cycle progress; the CLI subscribes to drive its
//! spinner and log lines.

use tokio::sync::broadcast;

use crate::charts::ChartSlot;
use crate::error::SlotOutcome;

/// Events emitted by the render coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// A load cycle started
    LoadStarted { generation: u64 },
    /// One chart slot was handed to the target
    SlotRendered { slot: ChartSlot, outcome: SlotOutcome },
    /// Every slot of a cycle was presented
    CycleCompleted { generation: u64, rendered: usize },
    /// A newer cycle started before this one finished; its result was dropped
    Superseded { generation: u64 },
    /// Fetch failed; the dashboard went back to idle
    LoadFailed(String),
    /// Authentication expired and the session was ended
    LoggedOut,
}

/// Event bus for broadcasting dashboard events
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (64 events)
    pub fn default_capacity() -> Self {
        Self::new(64)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DashboardEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
