//! REST handlers
//!
//! Every state-changing route re-runs the resolver and workflow rules the
//! UI consults, so the server is the enforcement point rather than the
//! browser.

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::authz::{Action, ResourceKind, ResourceRefs};
use crate::error::{AppError, Result};
use crate::models::{
    ChatMessage, CompleteTaskRequest, CreateEventRequest, CreateMessageRequest, CreatePollRequest,
    CreateTaskRequest, CreateUserRequest, Event, Poll, Rsvp, RsvpRequest, Task, TaskStats,
    UpdateEventRequest, UpdateTaskRequest, User, VoteRequest,
};
use crate::websocket;
use crate::workflow::{self, WorkflowError};
use crate::AppState;

/// The authenticated user making the request.
///
/// Token verification lives in the external session provider; this server
/// trusts the `x-user-id` header it forwards and resolves it to a profile.
pub struct Actor(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".to_string()))?;

        let id = Uuid::parse_str(header)
            .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".to_string()))?;

        match state.store.get_user(id).await {
            Ok(user) => Ok(Actor(user)),
            Err(AppError::NotFound(_)) => {
                Err(AppError::Unauthorized("Unknown user".to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(websocket::handler))
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_me))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/:id/rsvp", put(set_rsvp))
        .route("/events/:id/rsvps", get(list_rsvps))
        .route("/events/:id/stats", get(event_stats))
        .route("/events/:id/tasks", get(list_tasks).post(create_task))
        .route("/events/:id/polls", post(create_poll))
        .route(
            "/events/:id/messages",
            get(list_messages).post(create_message),
        )
        .route(
            "/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/:id/complete", post(complete_task))
        .route("/tasks/:id/completion", axum::routing::patch(update_completion))
        .route("/polls/:id", get(get_poll).delete(delete_poll))
        .route("/polls/:id/vote", post(vote))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn forbidden() -> AppError {
    AppError::Forbidden("Insufficient permissions".to_string())
}

// User handlers

async fn get_me(Actor(user): Actor) -> Json<User> {
    Json(user)
}

async fn list_users(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Users, Action::Read, None)
    {
        return Err(forbidden());
    }
    Ok(Json(state.store.list_users().await?))
}

async fn create_user(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Users, Action::Create, None)
    {
        return Err(forbidden());
    }
    let created = state
        .store
        .create_user(&req.name, &req.email, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// Event handlers

async fn create_event(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    if !state.resolver.can_create_event(&user) {
        return Err(forbidden());
    }
    let event = state
        .store
        .create_event(
            user.id,
            &req.title,
            req.description,
            req.location,
            req.starts_at,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn list_events(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Event>>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Events, Action::Read, None)
    {
        return Err(forbidden());
    }
    Ok(Json(state.store.list_events().await?))
}

async fn get_event(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Events, Action::Read, None)
    {
        return Err(forbidden());
    }
    Ok(Json(state.store.get_event(id).await?))
}

async fn update_event(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    let event = state.store.get_event(id).await?;
    if !state.resolver.has_permission(
        &user,
        ResourceKind::Events,
        Action::Update,
        Some(&ResourceRefs::for_event(&event)),
    ) {
        return Err(forbidden());
    }
    Ok(Json(state.store.update_event(id, &req).await?))
}

async fn delete_event(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let event = state.store.get_event(id).await?;
    if !state.resolver.has_permission(
        &user,
        ResourceKind::Events,
        Action::Delete,
        Some(&ResourceRefs::for_event(&event)),
    ) {
        return Err(forbidden());
    }
    state.store.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_rsvp(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<RsvpRequest>,
) -> Result<Json<Rsvp>> {
    if !state.resolver.can_rsvp(&user) {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    Ok(Json(state.store.set_rsvp(event.id, user.id, req.status).await?))
}

async fn list_rsvps(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Rsvp>>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Events, Action::Read, None)
    {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    Ok(Json(state.store.list_rsvps(event.id).await?))
}

async fn event_stats(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskStats>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Tasks, Action::Read, None)
    {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    Ok(Json(state.store.task_stats(event.id).await?))
}

// Task handlers

async fn create_task(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    if !state.resolver.can_create_task(&user) {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    let task = state.store.create_task(event.id, user.id, &req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Task>>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Tasks, Action::Read, None)
    {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    Ok(Json(state.store.list_tasks_for_event(event.id).await?))
}

async fn get_task(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Tasks, Action::Read, None)
    {
        return Err(forbidden());
    }
    Ok(Json(state.store.get_task(id).await?))
}

/// Field edits are gated by the detail-edit rule; a status change is gated
/// by the transition rules, which are the authority even where the coarse
/// update gate would disagree (an unrelated organizer cancelling).
async fn update_task(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    let mut task = state.store.get_task(id).await?;

    if req.touches_details() {
        if !workflow::can_edit_details(&task, &user) {
            return Err(forbidden());
        }
        task = state.store.update_task_details(id, &req).await?;
    }

    if let Some(target) = req.status {
        workflow::check_move(&task, target, &user)?;
        task = state.store.set_task_status(&task, target).await?;
    }

    Ok(Json(task))
}

async fn complete_task(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteTaskRequest>,
) -> Result<Json<Task>> {
    let task = state.store.get_task(id).await?;

    match workflow::check_complete(&task, &user) {
        Ok(()) => {}
        Err(WorkflowError::CompletionNotAllowed) => return Err(forbidden()),
        Err(e) => return Err(e.into()),
    }

    Ok(Json(
        state
            .store
            .complete_task(&task, user.id, req.note, &req.image_urls)
            .await?,
    ))
}

async fn update_completion(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteTaskRequest>,
) -> Result<Json<Task>> {
    let task = state.store.get_task(id).await?;

    if task.completion.is_none() {
        return Err(AppError::BadRequest(
            "Task has no completion details".to_string(),
        ));
    }
    if !workflow::can_edit_completion_details(&task, &user) {
        return Err(forbidden());
    }

    Ok(Json(
        state
            .store
            .update_completion_details(&task, req.note, &req.image_urls)
            .await?,
    ))
}

async fn delete_task(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let task = state.store.get_task(id).await?;
    if !state.resolver.can_delete_task(&user, &task) {
        return Err(forbidden());
    }
    state.store.delete_task(&task).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Poll handlers

async fn create_poll(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreatePollRequest>,
) -> Result<(StatusCode, Json<Poll>)> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Polls, Action::Create, None)
    {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    let poll = state
        .store
        .create_poll(event.id, user.id, &req.question, &req.options)
        .await?;
    Ok((StatusCode::CREATED, Json(poll)))
}

async fn get_poll(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Poll>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Polls, Action::Read, None)
    {
        return Err(forbidden());
    }
    Ok(Json(state.store.get_poll(id).await?))
}

async fn delete_poll(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let poll = state.store.get_poll(id).await?;
    if !state.resolver.has_permission(
        &user,
        ResourceKind::Polls,
        Action::Delete,
        Some(&ResourceRefs::for_poll(&poll)),
    ) {
        return Err(forbidden());
    }
    state.store.delete_poll(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn vote(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Poll>> {
    if !state.resolver.can_vote(&user) {
        return Err(forbidden());
    }
    let poll = state.store.get_poll(id).await?;
    state.store.vote(poll.id, req.option_id, user.id).await?;
    Ok(Json(state.store.get_poll(id).await?))
}

// Chat handlers

async fn list_messages(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>> {
    if !state
        .resolver
        .has_permission(&user, ResourceKind::Chat, Action::Read, None)
    {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    Ok(Json(state.store.list_messages(event.id).await?))
}

async fn create_message(
    Actor(user): Actor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    if !state.resolver.can_write_chat(&user) {
        return Err(forbidden());
    }
    let event = state.store.get_event(id).await?;
    let message = state
        .store
        .create_message(event.id, user.id, &req.body)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
