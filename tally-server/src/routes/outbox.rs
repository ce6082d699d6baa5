use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use tally_ledger::outbox::RunSummary;

use crate::auth::RequireApiKey;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessQuery {
    pub max_batch: Option<usize>,
    pub max_backoff_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub target: Option<String>,
}

/// POST /outbox/process?maxBatch=&maxBackoffMs=&timeoutMs=&target=
pub async fn process(
    State(state): State<AppState>,
    _auth: RequireApiKey,
    Query(query): Query<ProcessQuery>,
) -> Result<Json<RunSummary>, ApiError> {
    let opts = state.config.process_opts(
        query.target.as_deref(),
        query.max_batch,
        query.max_backoff_ms,
        query.timeout_ms,
    );
    let summary = state.ledger.outbox().process_once(opts).await?;
    Ok(Json(summary))
}
