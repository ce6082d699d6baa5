use sqlx::PgPool;

use crate::outbox::LedgerEvent;

use super::error::AckError;

#[derive(Debug, Clone)]
pub(crate) struct AckRepo {
    pool: PgPool,
}

impl AckRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Returns true when a row was written, false when the journal was
    /// already acknowledged. The conflict path is the intended idempotency
    /// route, not a failure.
    pub async fn insert(&self, event: &LedgerEvent) -> Result<bool, AckError> {
        let result = sqlx::query(
            r#"INSERT INTO events_acks (journal_id, topic, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT (journal_id) DO NOTHING"#,
        )
        .bind(&event.journal_id)
        .bind(&event.topic)
        .bind(&event.payload)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
