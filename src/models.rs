//! Data models for users, events, tasks, polls and chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator, unrestricted
    Admin,
    /// Creates and runs events
    Organizer,
    /// Invited attendee
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Organizer => "ORGANIZER",
            Role::Guest => "GUEST",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "ORGANIZER" => Ok(Role::Organizer),
            "GUEST" => Ok(Role::Guest),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// An event owned by an organizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// The creator; anchor for event-scoped permissions
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// RSVP answer of an attendee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsvpStatus {
    Going,
    Maybe,
    Declined,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Going => "GOING",
            RsvpStatus::Maybe => "MAYBE",
            RsvpStatus::Declined => "DECLINED",
        }
    }
}

impl std::str::FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GOING" => Ok(RsvpStatus::Going),
            "MAYBE" => Ok(RsvpStatus::Maybe),
            "DECLINED" => Ok(RsvpStatus::Declined),
            _ => Err(format!("Invalid rsvp status: {}", s)),
        }
    }
}

/// An attendee's RSVP for an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rsvp {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RsvpStatus,
    pub responded_at: DateTime<Utc>,
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started
    Todo,
    /// Being worked on
    InProgress,
    /// Done, with captured completion proof
    Completed,
    /// Abandoned by the creator or an organizer
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Position in the forward workflow order TODO -> IN_PROGRESS -> COMPLETED.
    /// CANCELLED sits outside the forward order.
    pub fn forward_order(&self) -> Option<u8> {
        match self {
            TaskStatus::Todo => Some(0),
            TaskStatus::InProgress => Some(1),
            TaskStatus::Completed => Some(2),
            TaskStatus::Cancelled => None,
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

/// Priority level for tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low = 0,
    Medium = 1,
    High = 2,
    Urgent = 3,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            "URGENT" => Ok(TaskPriority::Urgent),
            _ => Err(format!("Invalid task priority: {}", s)),
        }
    }
}

/// Proof captured when a task is completed.
///
/// Only written by the dedicated completion action, never by a bare
/// status update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub completed_by: Uuid,
    pub completed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub image_urls: Vec<String>,
}

/// A task within an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub event_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    pub created_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<TaskCompletion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A poll attached to an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub event_id: Uuid,
    pub question: String,
    pub created_by: Uuid,
    pub options: Vec<PollOption>,
    pub created_at: DateTime<Utc>,
}

/// One choice in a poll, with its current tally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Uuid,
    pub label: String,
    pub votes: i64,
}

/// A chat message in an event's discussion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub event_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Task counts per status for an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

/// Request to create a user (admin-managed accounts)
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Request to create a new event
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
}

/// Request to update an event
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
}

/// Request to create a new task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Uuid>,
    pub due_at: Option<DateTime<Utc>>,
}

/// Request to update a task; all fields optional, status changes go
/// through the workflow engine
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Uuid>,
    pub due_at: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    /// True if any field other than `status` is set
    pub fn touches_details(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.assignee_id.is_some()
            || self.due_at.is_some()
    }
}

/// Request to complete a task with proof
#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub note: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Request to set an RSVP
#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    pub status: RsvpStatus,
}

/// Request to create a poll
#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
}

/// Request to vote on a poll
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option_id: Uuid,
}

/// Request to post a chat message
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub body: String,
}
