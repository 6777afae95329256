//! Invited+ server - event and task management backend

pub mod authz;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod models;
pub mod store;
pub mod websocket;
pub mod workflow;

use sqlx::SqlitePool;
use std::sync::Arc;

use authz::Resolver;
use events::EventHub;
use store::Store;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub resolver: Resolver,
    pub events: EventHub,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        let events = EventHub::new();
        Arc::new(Self {
            store: Store::new(pool, events.clone()),
            resolver: Resolver::default(),
            events,
        })
    }
}
