use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};

use crate::primitives::{AccountId, Bucket, Currency};

use super::{entity::*, error::EntryError};

#[derive(Debug, Clone)]
pub(crate) struct EntryRepo {
    pool: PgPool,
}

impl EntryRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn append_all_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entries: &[NewEntry],
    ) -> Result<(), EntryError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO ledger_entries
            (journal_id, line_no, account_id, from_bucket, to_bucket, side, transition, amount, currency)"#,
        );
        query_builder.push_values(entries, |mut builder, entry| {
            builder
                .push_bind(&entry.journal_id)
                .push_bind(entry.line_no)
                .push_bind(&entry.account_id)
                .push_bind(entry.from_bucket.map(Bucket::as_str))
                .push_bind(entry.to_bucket.map(Bucket::as_str))
                .push_bind(entry.side.as_str())
                .push_bind(entry.transition.as_str())
                .push_bind(&entry.amount)
                .push_bind(&entry.currency);
        });
        query_builder.build().execute(&mut **tx).await?;
        Ok(())
    }

    /// Chronological audit projection for one account, optionally narrowed to
    /// a single currency.
    pub async fn list_for_account(
        &self,
        account_id: &AccountId,
        currency: Option<&Currency>,
    ) -> Result<Vec<EntryValues>, EntryError> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"SELECT journal_id, line_no, account_id, from_bucket, to_bucket,
                      side, transition, amount, currency, created_at
            FROM ledger_entries
            WHERE account_id = "#,
        );
        query_builder.push_bind(account_id);
        if let Some(currency) = currency {
            query_builder.push(" AND currency = ");
            query_builder.push_bind(currency);
        }
        query_builder.push(" ORDER BY created_at ASC, line_no ASC");
        let rows = query_builder.build().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(entry_from_row).collect())
    }
}

fn entry_from_row(row: PgRow) -> EntryValues {
    EntryValues {
        journal_id: row.get("journal_id"),
        line_no: row.get("line_no"),
        account_id: row.get("account_id"),
        from_bucket: row
            .get::<Option<String>, _>("from_bucket")
            .map(|b| b.parse().expect("Could not parse bucket")),
        to_bucket: row
            .get::<Option<String>, _>("to_bucket")
            .map(|b| b.parse().expect("Could not parse bucket")),
        side: row
            .get::<String, _>("side")
            .parse()
            .expect("Could not parse side"),
        transition: row
            .get::<String, _>("transition")
            .parse()
            .expect("Could not parse transition"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        created_at: row.get("created_at"),
    }
}
