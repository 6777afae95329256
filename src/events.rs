//! Task event hub
//!
//! Replaces polling with an explicit publish/subscribe channel: the store
//! publishes after each successful task mutation, and subscribers (the
//! websocket stream, statistics widgets) refetch on receipt. Lagging
//! subscribers drop events rather than blocking publishers.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::TaskStatus;

/// Notification emitted after a committed task mutation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    TaskCreated {
        event_id: Uuid,
        task_id: Uuid,
    },
    TaskStatusChanged {
        event_id: Uuid,
        task_id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
    },
    TaskCompleted {
        event_id: Uuid,
        task_id: Uuid,
        completed_by: Uuid,
    },
    TaskDeleted {
        event_id: Uuid,
        task_id: Uuid,
    },
}

impl TaskEvent {
    /// The event (party) this notification belongs to
    pub fn event_id(&self) -> Uuid {
        match self {
            TaskEvent::TaskCreated { event_id, .. }
            | TaskEvent::TaskStatusChanged { event_id, .. }
            | TaskEvent::TaskCompleted { event_id, .. }
            | TaskEvent::TaskDeleted { event_id, .. } => *event_id,
        }
    }
}

/// Broadcast hub for task events
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<TaskEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    /// Subscribe to task events
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; subscribers that lagged simply miss it
    pub fn publish(&self, event: TaskEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
