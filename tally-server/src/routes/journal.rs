use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::json;

use tally_ledger::journal::JournalRequest;

use crate::auth::RequireApiKey;
use crate::error::ApiError;
use crate::AppState;

/// POST /journal
pub async fn post_journal(
    State(state): State<AppState>,
    _auth: RequireApiKey,
    payload: Result<Json<JournalRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))?;
    let receipt = state.ledger.post_journal(request).await?;
    Ok(Json(json!({ "ok": true, "journalId": receipt.journal_id })))
}
