use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::primitives::{
    AccountId, Bucket, Currency, DebitOrCredit, JournalId, JournalStatus, Transition,
};
use crate::transition::LineEffect;

/// A posting request exactly as received on the wire. Nothing here is trusted
/// yet; field-level checks live in the validate module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalRequest {
    #[serde(default)]
    pub journal_id: String,
    #[serde(default)]
    pub idempotency_key: String,
    #[serde(default)]
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub transition: String,
    #[serde(default)]
    pub from_bucket: Option<String>,
    #[serde(default)]
    pub to_bucket: Option<String>,
    #[serde(default)]
    pub amount: LineAmount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineAmount {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
}

/// A posting request that passed shape validation.
#[derive(Debug, Clone)]
pub struct NewJournal {
    pub journal_id: JournalId,
    pub idempotency_key: String,
    pub lines: Vec<JournalLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLine {
    pub account_id: AccountId,
    pub side: DebitOrCredit,
    pub transition: Transition,
    pub from_bucket: Option<Bucket>,
    pub to_bucket: Option<Bucket>,
    pub amount: String,
    pub currency: Currency,
}

/// A journal that passed semantic preflight and is ready to apply: one
/// currency, legal transitions, balanced in minor units.
#[derive(Debug, Clone)]
pub(crate) struct PreparedJournal {
    pub journal_id: JournalId,
    pub idempotency_key: String,
    pub currency: Currency,
    pub lines: Vec<PreparedLine>,
    pub lines_json: serde_json::Value,
}

#[derive(Debug, Clone)]
pub(crate) struct PreparedLine {
    pub line_no: i32,
    pub account_id: AccountId,
    pub side: DebitOrCredit,
    pub transition: Transition,
    pub from_bucket: Option<Bucket>,
    pub to_bucket: Option<Bucket>,
    pub effect: LineEffect,
    pub amount: String,
    pub amount_minor: i64,
}

/// Header row of a committed or in-flight journal.
#[derive(Debug, Clone)]
pub struct JournalValues {
    pub journal_id: JournalId,
    pub idempotency_key: String,
    pub status: JournalStatus,
    pub created_at: DateTime<Utc>,
}
