//! Database store for users, events, tasks, polls and chat
//!
//! Publishes a `TaskEvent` after each committed task mutation so
//! subscribers can refetch statistics instead of polling.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::events::{EventHub, TaskEvent};
use crate::models::{
    ChatMessage, CreateTaskRequest, Event, Poll, PollOption, Role, Rsvp, RsvpStatus, Task,
    TaskCompletion, TaskPriority, TaskStats, TaskStatus, UpdateEventRequest, UpdateTaskRequest,
    User,
};

/// Database store
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    events: EventHub,
}

impl Store {
    pub fn new(pool: SqlitePool, events: EventHub) -> Self {
        Self { pool, events }
    }

    // User operations

    pub async fn create_user(&self, name: &str, email: &str, role: Role) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(name)
        .bind(email)
        .bind(role.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
        })
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    // Event operations

    pub async fn create_event(
        &self,
        organizer_id: Uuid,
        title: &str,
        description: Option<String>,
        location: Option<String>,
        starts_at: Option<DateTime<Utc>>,
    ) -> Result<Event> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, location, starts_at, organizer_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(title)
        .bind(&description)
        .bind(&location)
        .bind(starts_at)
        .bind(organizer_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Event {
            id,
            title: title.to_string(),
            description,
            location,
            starts_at,
            organizer_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, location, starts_at, organizer_id, created_at, updated_at
            FROM events
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, title, description, location, starts_at, organizer_id, created_at, updated_at
            FROM events
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    pub async fn update_event(&self, id: Uuid, req: &UpdateEventRequest) -> Result<Event> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE events
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                location = COALESCE(?, location),
                starts_at = COALESCE(?, starts_at),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.location)
        .bind(req.starts_at)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_event(id).await
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        let event_id = id.to_string();

        sqlx::query("DELETE FROM poll_votes WHERE poll_id IN (SELECT id FROM polls WHERE event_id = ?)")
            .bind(&event_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM poll_options WHERE poll_id IN (SELECT id FROM polls WHERE event_id = ?)")
            .bind(&event_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM polls WHERE event_id = ?")
            .bind(&event_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM messages WHERE event_id = ?")
            .bind(&event_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM rsvps WHERE event_id = ?")
            .bind(&event_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE event_id = ?")
            .bind(&event_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(&event_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_rsvp(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        status: RsvpStatus,
    ) -> Result<Rsvp> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO rsvps (event_id, user_id, status, responded_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (event_id, user_id)
            DO UPDATE SET status = excluded.status, responded_at = excluded.responded_at
            "#,
        )
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .bind(status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Rsvp {
            event_id,
            user_id,
            status,
            responded_at: now,
        })
    }

    pub async fn list_rsvps(&self, event_id: Uuid) -> Result<Vec<Rsvp>> {
        let rows = sqlx::query_as::<_, RsvpRow>(
            r#"
            SELECT event_id, user_id, status, responded_at
            FROM rsvps
            WHERE event_id = ?
            ORDER BY responded_at ASC
            "#,
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    // Task operations

    pub async fn create_task(
        &self,
        event_id: Uuid,
        created_by: Uuid,
        req: &CreateTaskRequest,
    ) -> Result<Task> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let priority = req.priority.unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO tasks (id, event_id, title, description, status, priority, assignee_id, created_by, due_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(event_id.to_string())
        .bind(&req.title)
        .bind(&req.description)
        .bind(TaskStatus::Todo.as_str())
        .bind(priority.as_str())
        .bind(req.assignee_id.map(|u| u.to_string()))
        .bind(created_by.to_string())
        .bind(req.due_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.events.publish(TaskEvent::TaskCreated {
            event_id,
            task_id: id,
        });

        Ok(Task {
            id,
            event_id,
            title: req.title.clone(),
            description: req.description.clone(),
            status: TaskStatus::Todo,
            priority,
            assignee_id: req.assignee_id,
            created_by,
            due_at: req.due_at,
            completion: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, event_id, title, description, status, priority, assignee_id, created_by,
                   due_at, completed_by, completed_at, completion_note, completion_images,
                   created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

        row.try_into()
    }

    pub async fn list_tasks_for_event(&self, event_id: Uuid) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, event_id, title, description, status, priority, assignee_id, created_by,
                   due_at, completed_by, completed_at, completion_note, completion_images,
                   created_at, updated_at
            FROM tasks
            WHERE event_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Update descriptive fields; status is handled by `set_task_status`
    pub async fn update_task_details(&self, id: Uuid, req: &UpdateTaskRequest) -> Result<Task> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE tasks
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                priority = COALESCE(?, priority),
                assignee_id = COALESCE(?, assignee_id),
                due_at = COALESCE(?, due_at),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.priority.map(|p| p.as_str()))
        .bind(req.assignee_id.map(|u| u.to_string()))
        .bind(req.due_at)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_task(id).await
    }

    /// Apply a checked status transition
    pub async fn set_task_status(&self, task: &Task, status: TaskStatus) -> Result<Task> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await?;

        self.events.publish(TaskEvent::TaskStatusChanged {
            event_id: task.event_id,
            task_id: task.id,
            from: task.status,
            to: status,
        });

        self.get_task(task.id).await
    }

    /// Complete a task, capturing proof in the same write as the status change
    pub async fn complete_task(
        &self,
        task: &Task,
        completed_by: Uuid,
        note: Option<String>,
        image_urls: &[String],
    ) -> Result<Task> {
        let now = Utc::now();
        let images = serde_json::to_string(image_urls)
            .map_err(|e| AppError::Internal(format!("Invalid image list: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, completed_by = ?, completed_at = ?, completion_note = ?,
                completion_images = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(TaskStatus::Completed.as_str())
        .bind(completed_by.to_string())
        .bind(now)
        .bind(&note)
        .bind(images)
        .bind(now)
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await?;

        self.events.publish(TaskEvent::TaskCompleted {
            event_id: task.event_id,
            task_id: task.id,
            completed_by,
        });

        self.get_task(task.id).await
    }

    /// Edit the proof of an already-completed task; status untouched
    pub async fn update_completion_details(
        &self,
        task: &Task,
        note: Option<String>,
        image_urls: &[String],
    ) -> Result<Task> {
        let now = Utc::now();
        let images = serde_json::to_string(image_urls)
            .map_err(|e| AppError::Internal(format!("Invalid image list: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE tasks
            SET completion_note = ?, completion_images = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&note)
        .bind(images)
        .bind(now)
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_task(task.id).await
    }

    pub async fn delete_task(&self, task: &Task) -> Result<()> {
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task.id.to_string())
            .execute(&self.pool)
            .await?;

        self.events.publish(TaskEvent::TaskDeleted {
            event_id: task.event_id,
            task_id: task.id,
        });

        Ok(())
    }

    /// Task counts per status for an event, recomputed on every fetch
    pub async fn task_stats(&self, event_id: Uuid) -> Result<TaskStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN status = 'TODO' THEN 1 ELSE 0 END), 0) AS todo,
                   COALESCE(SUM(CASE WHEN status = 'IN_PROGRESS' THEN 1 ELSE 0 END), 0) AS in_progress,
                   COALESCE(SUM(CASE WHEN status = 'COMPLETED' THEN 1 ELSE 0 END), 0) AS completed,
                   COALESCE(SUM(CASE WHEN status = 'CANCELLED' THEN 1 ELSE 0 END), 0) AS cancelled
            FROM tasks
            WHERE event_id = ?
            "#,
        )
        .bind(event_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskStats {
            total: row.total,
            todo: row.todo,
            in_progress: row.in_progress,
            completed: row.completed,
            cancelled: row.cancelled,
        })
    }

    // Poll operations

    pub async fn create_poll(
        &self,
        event_id: Uuid,
        created_by: Uuid,
        question: &str,
        options: &[String],
    ) -> Result<Poll> {
        if options.len() < 2 {
            return Err(AppError::BadRequest(
                "A poll needs at least two options".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO polls (id, event_id, question, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(event_id.to_string())
        .bind(question)
        .bind(created_by.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let mut poll_options = Vec::with_capacity(options.len());
        for label in options {
            let option_id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO poll_options (id, poll_id, label)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(option_id.to_string())
            .bind(id.to_string())
            .bind(label)
            .execute(&self.pool)
            .await?;
            poll_options.push(PollOption {
                id: option_id,
                label: label.clone(),
                votes: 0,
            });
        }

        Ok(Poll {
            id,
            event_id,
            question: question.to_string(),
            created_by,
            options: poll_options,
            created_at: now,
        })
    }

    pub async fn get_poll(&self, id: Uuid) -> Result<Poll> {
        let row = sqlx::query_as::<_, PollRow>(
            r#"
            SELECT id, event_id, question, created_by, created_at
            FROM polls
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Poll {} not found", id)))?;

        let options = sqlx::query_as::<_, PollOptionRow>(
            r#"
            SELECT o.id, o.label, COUNT(v.user_id) AS votes
            FROM poll_options o
            LEFT JOIN poll_votes v ON v.option_id = o.id
            WHERE o.poll_id = ?
            GROUP BY o.id, o.label
            ORDER BY o.rowid ASC
            "#,
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut poll: Poll = row.try_into()?;
        poll.options = options
            .into_iter()
            .map(|o| o.try_into())
            .collect::<Result<Vec<_>>>()?;
        Ok(poll)
    }

    pub async fn delete_poll(&self, id: Uuid) -> Result<()> {
        let poll_id = id.to_string();
        sqlx::query("DELETE FROM poll_votes WHERE poll_id = ?")
            .bind(&poll_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM poll_options WHERE poll_id = ?")
            .bind(&poll_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM polls WHERE id = ?")
            .bind(&poll_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a vote; one per user per poll, last vote wins
    pub async fn vote(&self, poll_id: Uuid, option_id: Uuid, user_id: Uuid) -> Result<()> {
        let belongs: Option<(String,)> =
            sqlx::query_as("SELECT id FROM poll_options WHERE id = ? AND poll_id = ?")
                .bind(option_id.to_string())
                .bind(poll_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        if belongs.is_none() {
            return Err(AppError::BadRequest(
                "Option does not belong to this poll".to_string(),
            ));
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO poll_votes (poll_id, option_id, user_id, voted_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (poll_id, user_id)
            DO UPDATE SET option_id = excluded.option_id, voted_at = excluded.voted_at
            "#,
        )
        .bind(poll_id.to_string())
        .bind(option_id.to_string())
        .bind(user_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Chat operations

    pub async fn create_message(
        &self,
        event_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<ChatMessage> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO messages (id, event_id, author_id, body, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(event_id.to_string())
        .bind(author_id.to_string())
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ChatMessage {
            id,
            event_id,
            author_id,
            body: body.to_string(),
            created_at: now,
        })
    }

    pub async fn list_messages(&self, event_id: Uuid) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, event_id, author_id, body, created_at
            FROM messages
            WHERE event_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

// Internal row types for sqlx

fn parse_uuid(s: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Internal(format!("Invalid {} UUID: {}", field, e)))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&row.id, "id")?,
            name: row.name,
            email: row.email,
            role: row
                .role
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid role: {}", e)))?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: Option<String>,
    location: Option<String>,
    starts_at: Option<DateTime<Utc>>,
    organizer_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Event {
            id: parse_uuid(&row.id, "id")?,
            title: row.title,
            description: row.description,
            location: row.location,
            starts_at: row.starts_at,
            organizer_id: parse_uuid(&row.organizer_id, "organizer_id")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RsvpRow {
    event_id: String,
    user_id: String,
    status: String,
    responded_at: DateTime<Utc>,
}

impl TryFrom<RsvpRow> for Rsvp {
    type Error = AppError;

    fn try_from(row: RsvpRow) -> Result<Self> {
        Ok(Rsvp {
            event_id: parse_uuid(&row.event_id, "event_id")?,
            user_id: parse_uuid(&row.user_id, "user_id")?,
            status: row
                .status
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid rsvp status: {}", e)))?,
            responded_at: row.responded_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    event_id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    assignee_id: Option<String>,
    created_by: String,
    due_at: Option<DateTime<Utc>>,
    completed_by: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    completion_note: Option<String>,
    completion_images: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = AppError;

    fn try_from(row: TaskRow) -> Result<Self> {
        let assignee_id = row
            .assignee_id
            .as_deref()
            .map(|s| parse_uuid(s, "assignee_id"))
            .transpose()?;

        let completion = match (row.completed_by.as_deref(), row.completed_at) {
            (Some(by), Some(at)) => Some(TaskCompletion {
                completed_by: parse_uuid(by, "completed_by")?,
                completed_at: at,
                note: row.completion_note,
                image_urls: serde_json::from_str(&row.completion_images)
                    .map_err(|e| AppError::Internal(format!("Invalid image list: {}", e)))?,
            }),
            _ => None,
        };

        Ok(Task {
            id: parse_uuid(&row.id, "id")?,
            event_id: parse_uuid(&row.event_id, "event_id")?,
            title: row.title,
            description: row.description,
            status: row
                .status
                .parse::<TaskStatus>()
                .map_err(|e| AppError::Internal(format!("Invalid status: {}", e)))?,
            priority: row
                .priority
                .parse::<TaskPriority>()
                .map_err(|e| AppError::Internal(format!("Invalid priority: {}", e)))?,
            assignee_id,
            created_by: parse_uuid(&row.created_by, "created_by")?,
            due_at: row.due_at,
            completion,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total: i64,
    todo: i64,
    in_progress: i64,
    completed: i64,
    cancelled: i64,
}

#[derive(sqlx::FromRow)]
struct PollRow {
    id: String,
    event_id: String,
    question: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PollRow> for Poll {
    type Error = AppError;

    fn try_from(row: PollRow) -> Result<Self> {
        Ok(Poll {
            id: parse_uuid(&row.id, "id")?,
            event_id: parse_uuid(&row.event_id, "event_id")?,
            question: row.question,
            created_by: parse_uuid(&row.created_by, "created_by")?,
            options: Vec::new(),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PollOptionRow {
    id: String,
    label: String,
    votes: i64,
}

impl TryFrom<PollOptionRow> for PollOption {
    type Error = AppError;

    fn try_from(row: PollOptionRow) -> Result<Self> {
        Ok(PollOption {
            id: parse_uuid(&row.id, "id")?,
            label: row.label,
            votes: row.votes,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    event_id: String,
    author_id: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(ChatMessage {
            id: parse_uuid(&row.id, "id")?,
            event_id: parse_uuid(&row.event_id, "event_id")?,
            author_id: parse_uuid(&row.author_id, "author_id")?,
            body: row.body,
            created_at: row.created_at,
        })
    }
}
