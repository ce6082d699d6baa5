use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use tally_ledger::entry::AccountHistory;
use tally_ledger::Currency;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub currency: Option<String>,
}

/// GET /accounts/{id}/history?currency=CCY
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<AccountHistory>, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::bad_request("account id is required"));
    }
    let currency = query
        .currency
        .map(|c| c.parse::<Currency>())
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let history = state.ledger.entries().history(id.into(), currency).await?;
    if history.history.is_empty() {
        return Err(ApiError::not_found(format!(
            "no history for account {}",
            history.account_id
        )));
    }
    Ok(Json(history))
}
