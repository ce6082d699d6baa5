use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use tally_ledger::ack::error::AckError;
use tally_ledger::entry::error::EntryError;
use tally_ledger::error::LedgerError;
use tally_ledger::journal::error::JournalError;
use tally_ledger::outbox::error::OutboxError;

/// Error envelope for every endpoint: a status code plus a
/// `{error, details?}` JSON body. Never a partial success.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "invalid or missing API key".to_string(),
            details: None,
        }
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            details: None,
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
            details: None,
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Validation(issues) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: "request failed schema validation".to_string(),
                details: Some(
                    serde_json::to_value(issues).expect("validation issues serialize"),
                ),
            },
            JournalError::DuplicateKey(_) => Self {
                status: StatusCode::CONFLICT,
                message: err.to_string(),
                details: None,
            },
            JournalError::Unbalanced
            | JournalError::CurrencyMismatch { .. }
            | JournalError::Transition { .. }
            | JournalError::InvalidAmount(_)
            | JournalError::InsufficientFunds { .. }
            | JournalError::NegativeBalance { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
                details: None,
            },
            JournalError::Chaos
            | JournalError::Sqlx(_)
            | JournalError::Account(_)
            | JournalError::Entry(_)
            | JournalError::Outbox(_) => {
                error!(error = %err, "journal posting failed");
                Self::internal()
            }
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Journal(journal) => journal.into(),
            other => {
                error!(error = %other, "ledger operation failed");
                Self::internal()
            }
        }
    }
}

impl From<EntryError> for ApiError {
    fn from(err: EntryError) -> Self {
        error!(error = %err, "history query failed");
        Self::internal()
    }
}

impl From<OutboxError> for ApiError {
    fn from(err: OutboxError) -> Self {
        error!(error = %err, "outbox processing failed");
        Self::internal()
    }
}

impl From<AckError> for ApiError {
    fn from(err: AckError) -> Self {
        match err {
            AckError::MissingJournalId => Self::bad_request(err.to_string()),
            AckError::Sqlx(_) => {
                error!(error = %err, "ack insert failed");
                Self::internal()
            }
        }
    }
}
