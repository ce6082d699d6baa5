use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::primitives::{AccountId, Bucket, Currency};

use super::{entity::AccountValues, error::AccountError};

const ACCOUNT_COLUMNS: &str =
    "id, currency, available, pending, escrow, outflow, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct AccountRepo {
    pool: PgPool,
}

impl AccountRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Creates the account on first reference, with zeroed buckets and the
    /// currency of the touching line. Existing accounts are left untouched.
    pub async fn upsert_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &AccountId,
        currency: &Currency,
    ) -> Result<(), AccountError> {
        sqlx::query(
            r#"INSERT INTO accounts (id, currency)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(id)
        .bind(currency)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn touch_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &AccountId,
    ) -> Result<(), AccountError> {
        sqlx::query("UPDATE accounts SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Predicate-guarded bucket move. The WHERE clause bundles the currency
    /// check and, unless the account is overdraft-exempt, the funds check;
    /// zero matched rows means one of them failed.
    pub async fn apply_move_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &AccountId,
        currency: &Currency,
        from: Bucket,
        to: Bucket,
        amount_minor: i64,
        overdraft_exempt: bool,
    ) -> Result<u64, AccountError> {
        let from_col = from.column();
        let to_col = to.column();
        let mut sql = format!(
            "UPDATE accounts \
             SET {from_col} = {from_col} - $1, {to_col} = {to_col} + $1, updated_at = NOW() \
             WHERE id = $2 AND currency = $3"
        );
        if !overdraft_exempt {
            sql.push_str(&format!(" AND {from_col} >= $1"));
        }
        let result = sqlx::query(&sql)
            .bind(amount_minor)
            .bind(id)
            .bind(currency)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_all_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[AccountId],
    ) -> Result<Vec<AccountValues>, AccountError> {
        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(account_from_row).collect())
    }

    pub async fn find(&self, id: &AccountId) -> Result<AccountValues, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(account_from_row)
            .ok_or_else(|| AccountError::NotFound(id.clone()))
    }
}

fn account_from_row(row: PgRow) -> AccountValues {
    AccountValues {
        id: row.get("id"),
        currency: row.get("currency"),
        available: row.get("available"),
        pending: row.get("pending"),
        escrow: row.get("escrow"),
        outflow: row.get("outflow"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
