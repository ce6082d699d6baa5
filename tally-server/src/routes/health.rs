use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::error::ApiError;
use crate::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.ledger.health().await?;
    Ok(Json(json!({
        "dbConnected": snapshot.db_connected,
        "outboxQueue": snapshot.outbox_queue,
        "pendingRetries": snapshot.pending_retries,
        "metrics": snapshot.metrics,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
