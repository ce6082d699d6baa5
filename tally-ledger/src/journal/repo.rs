use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::primitives::JournalId;

use super::{entity::*, error::JournalError};

#[derive(Debug, Clone)]
pub(crate) struct JournalRepo {
    pool: PgPool,
}

impl JournalRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Idempotency probe: either key colliding means "already posted".
    pub async fn find_existing_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        idempotency_key: &str,
        journal_id: &JournalId,
    ) -> Result<Option<JournalValues>, JournalError> {
        let row = sqlx::query(
            r#"SELECT journal_id, idempotency_key, status, created_at
            FROM journals
            WHERE idempotency_key = $1 OR journal_id = $2
            LIMIT 1"#,
        )
        .bind(idempotency_key)
        .bind(journal_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(journal_from_row))
    }

    pub async fn find_existing(
        &self,
        idempotency_key: &str,
        journal_id: &JournalId,
    ) -> Result<Option<JournalValues>, JournalError> {
        let row = sqlx::query(
            r#"SELECT journal_id, idempotency_key, status, created_at
            FROM journals
            WHERE idempotency_key = $1 OR journal_id = $2
            LIMIT 1"#,
        )
        .bind(idempotency_key)
        .bind(journal_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(journal_from_row))
    }

    pub async fn insert_header_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        prepared: &PreparedJournal,
    ) -> Result<(), JournalError> {
        sqlx::query(
            r#"INSERT INTO journals (journal_id, idempotency_key, lines, status)
            VALUES ($1, $2, $3, 'pending')"#,
        )
        .bind(&prepared.journal_id)
        .bind(&prepared.idempotency_key)
        .bind(&prepared.lines_json)
        .execute(&mut **tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                JournalError::DuplicateKey(prepared.journal_id.clone())
            }
            other => JournalError::Sqlx(other),
        })?;
        Ok(())
    }

    pub async fn mark_posted_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        journal_id: &JournalId,
    ) -> Result<(), JournalError> {
        sqlx::query("UPDATE journals SET status = 'posted' WHERE journal_id = $1")
            .bind(journal_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

fn journal_from_row(row: PgRow) -> JournalValues {
    JournalValues {
        journal_id: row.get("journal_id"),
        idempotency_key: row.get("idempotency_key"),
        status: row
            .get::<String, _>("status")
            .parse()
            .expect("Could not parse journal status"),
        created_at: row.get("created_at"),
    }
}
