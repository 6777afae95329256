//! API integration tests
//!
//! Black-box tests over the full router: authorization enforcement,
//! workflow transitions, completion proof, polls, rsvps and chat.

use axum::body::Body;
use axum::Router;
use hyper::{Request, StatusCode};
use invited::models::{Role, User};
use invited::{http, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup_app() -> (Router, Arc<AppState>) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(pool);
    (http::router(state.clone()), state)
}

struct Cast {
    admin: User,
    organizer: User,
    other_organizer: User,
    guest: User,
    other_guest: User,
}

async fn seed_users(state: &AppState) -> Cast {
    Cast {
        admin: state
            .store
            .create_user("Ada", "ada@example.com", Role::Admin)
            .await
            .unwrap(),
        organizer: state
            .store
            .create_user("Olive", "olive@example.com", Role::Organizer)
            .await
            .unwrap(),
        other_organizer: state
            .store
            .create_user("Omar", "omar@example.com", Role::Organizer)
            .await
            .unwrap(),
        guest: state
            .store
            .create_user("Gus", "gus@example.com", Role::Guest)
            .await
            .unwrap(),
        other_guest: state
            .store
            .create_user("Greta", "greta@example.com", Role::Guest)
            .await
            .unwrap(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_event(app: &Router, organizer: &User) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        "/events",
        Some(organizer.id),
        Some(json!({"title": "Launch party"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn create_task(app: &Router, event_id: Uuid, creator: &User, assignee: Option<Uuid>) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        &format!("/events/{}/tasks", event_id),
        Some(creator.id),
        Some(json!({"title": "Order catering", "assignee_id": assignee})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state) = setup_app().await;
    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let (app, _state) = setup_app().await;
    let (status, _) = send(&app, "GET", "/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_user_is_unauthorized() {
    let (app, _state) = setup_app().await;
    let (status, _) = send(&app, "GET", "/events", Some(Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;

    let (status, body) = send(&app, "GET", "/users/me", Some(cast.guest.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Gus");
    assert_eq!(body["role"], "GUEST");
}

#[tokio::test]
async fn test_guest_cannot_create_event() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;

    let (status, _) = send(
        &app,
        "POST",
        "/events",
        Some(cast.guest.id),
        Some(json!({"title": "Party"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_organizer_creates_and_reads_event() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;

    let event_id = create_event(&app, &cast.organizer).await;
    let (status, body) = send(
        &app,
        "GET",
        &format!("/events/{}", event_id),
        Some(cast.guest.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Launch party");
    assert_eq!(body["organizer_id"], cast.organizer.id.to_string());
}

#[tokio::test]
async fn test_event_update_is_creator_scoped() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;

    // Another organizer may not touch it
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/events/{}", event_id),
        Some(cast.other_organizer.id),
        Some(json!({"title": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The creator may
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/events/{}", event_id),
        Some(cast.organizer.id),
        Some(json!({"title": "Renamed party"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed party");

    // So may an admin
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/events/{}", event_id),
        Some(cast.admin.id),
        Some(json!({"description": "Moderated"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_event_delete_is_creator_scoped() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/events/{}", event_id),
        Some(cast.other_organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/events/{}", event_id),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/events/{}", event_id),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guest_can_rsvp() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/events/{}/rsvp", event_id),
        Some(cast.guest.id),
        Some(json!({"status": "GOING"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "GOING");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/events/{}/rsvps", event_id),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_guest_cannot_create_task() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/events/{}/tasks", event_id),
        Some(cast.guest.id),
        Some(json!({"title": "Sneaky task"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guest_assignee_moves_forward_only() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;

    // Forward: TODO -> IN_PROGRESS
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.guest.id),
        Some(json!({"status": "IN_PROGRESS"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_PROGRESS");

    // Backward: IN_PROGRESS -> TODO is rejected before any write
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.guest.id),
        Some(json!({"status": "TODO"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Cancellation is out of reach for a guest assignee
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.guest.id),
        Some(json!({"status": "CANCELLED"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/tasks/{}", task_id),
        Some(cast.guest.id),
        None,
    )
    .await;
    assert_eq!(body["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn test_unrelated_guest_cannot_move_task() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.other_guest.id),
        Some(json!({"status": "IN_PROGRESS"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_any_organizer_may_cancel_but_not_move() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.other_organizer.id),
        Some(json!({"status": "IN_PROGRESS"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.other_organizer.id),
        Some(json!({"status": "CANCELLED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
}

#[tokio::test]
async fn test_organizer_creator_moves_freely() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;

    for target in ["COMPLETED", "TODO", "IN_PROGRESS", "CANCELLED", "TODO"] {
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/tasks/{}", task_id),
            Some(cast.organizer.id),
            Some(json!({"status": target})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "-> {}", target);
        assert_eq!(body["status"], target);
    }
}

#[tokio::test]
async fn test_task_detail_edit_rights() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;

    // A guest assignee may move status but never edit details
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.guest.id),
        Some(json!({"title": "Renamed by guest"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The creator may
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.organizer.id),
        Some(json!({"title": "Order more catering", "priority": "HIGH"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Order more catering");
    assert_eq!(body["priority"], "HIGH");
}

#[tokio::test]
async fn test_detail_edit_and_status_in_one_patch() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, None).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        Some(cast.organizer.id),
        Some(json!({"priority": "URGENT", "status": "IN_PROGRESS"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["priority"], "URGENT");
    assert_eq!(body["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn test_completion_flow() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;

    // An unrelated guest may not complete
    let (status, _) = send(
        &app,
        "POST",
        &format!("/tasks/{}/complete", task_id),
        Some(cast.other_guest.id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The assignee completes with proof
    let (status, body) = send(
        &app,
        "POST",
        &format!("/tasks/{}/complete", task_id),
        Some(cast.guest.id),
        Some(json!({
            "note": "Tables are set",
            "image_urls": ["https://cdn.example.com/tables.jpg"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
    assert_eq!(body["completion"]["note"], "Tables are set");
    assert_eq!(body["completion"]["completed_by"], cast.guest.id.to_string());

    // Completing twice conflicts
    let (status, _) = send(
        &app,
        "POST",
        &format!("/tasks/{}/complete", task_id),
        Some(cast.guest.id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_completion_details_edit_rights() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;

    // No completion yet
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}/completion", task_id),
        Some(cast.guest.id),
        Some(json!({"note": "Too early"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(
        &app,
        "POST",
        &format!("/tasks/{}/complete", task_id),
        Some(cast.guest.id),
        Some(json!({"note": "Done"})),
    )
    .await;

    // The guest assignee may touch proof once completed
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}/completion", task_id),
        Some(cast.guest.id),
        Some(json!({"note": "Done, with photos", "image_urls": ["https://cdn.example.com/a.jpg"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completion"]["note"], "Done, with photos");

    // An unrelated guest may not
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}/completion", task_id),
        Some(cast.other_guest.id),
        Some(json!({"note": "Vandalism"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_task_delete_rights() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;
    let task_id = create_task(&app, event_id, &cast.organizer, Some(cast.other_organizer.id)).await;

    // Assignee organizer is not the creator: delete denied
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/tasks/{}", task_id),
        Some(cast.other_organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/tasks/{}", task_id),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/tasks/{}", task_id),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_stats_reflect_transitions() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;

    let first = create_task(&app, event_id, &cast.organizer, Some(cast.guest.id)).await;
    let _second = create_task(&app, event_id, &cast.organizer, None).await;

    send(
        &app,
        "PATCH",
        &format!("/tasks/{}", first),
        Some(cast.guest.id),
        Some(json!({"status": "IN_PROGRESS"})),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/events/{}/stats", event_id),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["todo"], 1);
    assert_eq!(body["in_progress"], 1);
    assert_eq!(body["completed"], 0);
}

#[tokio::test]
async fn test_poll_lifecycle() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;

    // Guests cannot create polls
    let (status, _) = send(
        &app,
        "POST",
        &format!("/events/{}/polls", event_id),
        Some(cast.guest.id),
        Some(json!({"question": "Theme?", "options": ["Retro", "Space"]})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/events/{}/polls", event_id),
        Some(cast.organizer.id),
        Some(json!({"question": "Theme?", "options": ["Retro", "Space"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let poll_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let option_id = body["options"][0]["id"].as_str().unwrap().to_string();

    // A guest votes, tally updates
    let (status, body) = send(
        &app,
        "POST",
        &format!("/polls/{}/vote", poll_id),
        Some(cast.guest.id),
        Some(json!({"option_id": option_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["options"][0]["votes"], 1);

    // Only the creator (or admin) deletes
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/polls/{}", poll_id),
        Some(cast.other_organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/polls/{}", poll_id),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_chat_read_and_write() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;
    let event_id = create_event(&app, &cast.organizer).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/events/{}/messages", event_id),
        Some(cast.guest.id),
        Some(json!({"body": "Can I bring a plus one?"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/events/{}/messages", event_id),
        Some(cast.other_guest.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["body"], "Can I bring a plus one?");
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(cast.organizer.id),
        Some(json!({"name": "Newbie", "email": "new@example.com", "role": "GUEST"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(cast.admin.id),
        Some(json!({"name": "Newbie", "email": "new@example.com", "role": "GUEST"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "GUEST");
}

#[tokio::test]
async fn test_unknown_resources_are_not_found() {
    let (app, state) = setup_app().await;
    let cast = seed_users(&state).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/tasks/{}", Uuid::new_v4()),
        Some(cast.organizer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/events/{}", Uuid::new_v4()),
        Some(cast.organizer.id),
        Some(json!({"title": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
