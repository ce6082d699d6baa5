pub mod accounts;
pub mod events;
pub mod health;
pub mod journal;
pub mod outbox;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/journal", post(journal::post_journal))
        .route("/accounts/{id}/history", get(accounts::history))
        .route("/outbox/process", post(outbox::process))
        .route("/events", post(events::ingest))
        .route("/health", get(health::health))
        .with_state(state)
}
