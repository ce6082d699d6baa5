use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::primitives::JournalId;

use super::{error::OutboxError, event::*};

const ITEM_COLUMNS: &str =
    "id, journal_id, topic, payload, status, attempts, next_attempt_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct OutboxRepo {
    pool: PgPool,
}

impl OutboxRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Enqueued inside the posting transaction so the event becomes visible
    /// atomically with the balance change.
    pub async fn enqueue_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        journal_id: &JournalId,
    ) -> Result<(), OutboxError> {
        sqlx::query(
            r#"INSERT INTO outbox (journal_id, topic, payload, status, attempts, next_attempt_at)
            VALUES ($1, $2, $3, 'pending', 0, NOW())"#,
        )
        .bind(journal_id)
        .bind(POSTED_TOPIC)
        .bind(json!({ "journalId": journal_id }))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Claims the single earliest-due pending item and flips it to
    /// `processing` in the same atomic statement. `SKIP LOCKED` keeps
    /// concurrent workers off each other's claims.
    pub async fn claim_next(&self) -> Result<Option<OutboxItem>, OutboxError> {
        let row = sqlx::query(&format!(
            r#"UPDATE outbox SET status = 'processing', updated_at = NOW()
            WHERE id = (
                SELECT id FROM outbox
                WHERE status = 'pending' AND next_attempt_at <= NOW()
                ORDER BY next_attempt_at ASC, created_at ASC, id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {ITEM_COLUMNS}"#
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(item_from_row))
    }

    pub async fn mark_sent(&self, id: Uuid) -> Result<(), OutboxError> {
        let result = sqlx::query(
            r#"UPDATE outbox
            SET status = 'sent', attempts = attempts + 1, updated_at = NOW()
            WHERE id = $1 AND status = 'processing'"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OutboxError::ItemNotProcessing(id));
        }
        Ok(())
    }

    pub async fn reschedule(
        &self,
        id: Uuid,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), OutboxError> {
        let result = sqlx::query(
            r#"UPDATE outbox
            SET status = 'pending', attempts = attempts + 1, next_attempt_at = $2,
                updated_at = NOW()
            WHERE id = $1 AND status = 'processing'"#,
        )
        .bind(id)
        .bind(next_attempt_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OutboxError::ItemNotProcessing(id));
        }
        Ok(())
    }

    /// (still pending, pending with at least one failed attempt)
    pub async fn queue_depths(&self) -> Result<(i64, i64), OutboxError> {
        let row = sqlx::query(
            r#"SELECT
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'pending' AND attempts > 0) AS pending_retries
            FROM outbox"#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok((row.get("pending"), row.get("pending_retries")))
    }
}

fn item_from_row(row: PgRow) -> OutboxItem {
    OutboxItem {
        id: row.get("id"),
        journal_id: row.get("journal_id"),
        topic: row.get("topic"),
        payload: row.get("payload"),
        status: row
            .get::<String, _>("status")
            .parse()
            .expect("Could not parse outbox status"),
        attempts: row.get("attempts"),
        next_attempt_at: row.get("next_attempt_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
