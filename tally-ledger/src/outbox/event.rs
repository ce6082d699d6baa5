use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::primitives::{JournalId, OutboxStatus};

/// The single logical topic a posted journal publishes on.
pub const POSTED_TOPIC: &str = "LedgerEvent.Posted";

/// Wire shape POSTed to the consumer, and accepted back on the ack endpoint.
/// The payload stays an opaque JSON value end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub journal_id: JournalId,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct OutboxItem {
    pub id: Uuid,
    pub journal_id: JournalId,
    pub topic: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboxItem {
    pub fn event(&self) -> LedgerEvent {
        LedgerEvent {
            journal_id: self.journal_id.clone(),
            topic: self.topic.clone(),
            payload: self.payload.clone(),
        }
    }
}
