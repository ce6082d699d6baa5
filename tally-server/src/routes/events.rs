use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use tally_ledger::outbox::{LedgerEvent, POSTED_TOPIC};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub journal_id: Option<String>,
    pub topic: Option<String>,
    pub payload: Option<serde_json::Value>,
}

/// POST /events, the consumer acknowledgement sink. Duplicate deliveries
/// are the normal case and succeed.
pub async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<EventBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(body) =
        payload.map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))?;
    let journal_id = match body.journal_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ApiError::bad_request("journalId is required")),
    };
    let event = LedgerEvent {
        journal_id: journal_id.into(),
        topic: body.topic.unwrap_or_else(|| POSTED_TOPIC.to_string()),
        payload: body.payload.unwrap_or_else(|| json!({})),
    };
    state.ledger.acks().record(&event).await?;
    Ok(Json(json!({ "ok": true })))
}
