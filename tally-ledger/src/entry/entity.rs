use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::primitives::{AccountId, Bucket, Currency, DebitOrCredit, JournalId, Transition};

/// One committed audit record, one per journal line. Append-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryValues {
    pub journal_id: JournalId,
    pub line_no: i32,
    pub account_id: AccountId,
    pub from_bucket: Option<Bucket>,
    pub to_bucket: Option<Bucket>,
    pub side: DebitOrCredit,
    pub transition: Transition,
    pub amount: String,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

/// An audit record about to be appended inside a posting transaction.
#[derive(Clone, Debug)]
pub struct NewEntry {
    pub journal_id: JournalId,
    pub line_no: i32,
    pub account_id: AccountId,
    pub from_bucket: Option<Bucket>,
    pub to_bucket: Option<Bucket>,
    pub side: DebitOrCredit,
    pub transition: Transition,
    pub amount: String,
    pub currency: Currency,
}
