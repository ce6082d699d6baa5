#![allow(dead_code)]
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};
use sqlx::Row;
use uuid::Uuid;

use tally_ledger::journal::{JournalRequest, LineAmount, LineRequest};
use tally_ledger::{Ledger, LedgerConfig};

pub async fn init_pool() -> anyhow::Result<sqlx::PgPool> {
    let pg_host = std::env::var("PG_HOST").unwrap_or("localhost".to_string());
    let pg_con = format!("postgres://user:password@{pg_host}:5432/pg");
    let pool = sqlx::PgPool::connect(&pg_con).await?;
    Ok(pool)
}

pub async fn init_ledger(pool: &sqlx::PgPool) -> anyhow::Result<Ledger> {
    init_ledger_with_chaos(pool, 0.0).await
}

pub async fn init_ledger_with_chaos(
    pool: &sqlx::PgPool,
    chaos_probability: f64,
) -> anyhow::Result<Ledger> {
    let config = LedgerConfig::builder()
        .pool(pool.clone())
        .exec_migrations(true)
        .chaos_probability(chaos_probability)
        .build()?;
    Ok(Ledger::init(config).await?)
}

pub async fn init_ledger_with_overdraft(
    pool: &sqlx::PgPool,
    overdraft_account: &str,
) -> anyhow::Result<Ledger> {
    let config = LedgerConfig::builder()
        .pool(pool.clone())
        .exec_migrations(true)
        .system_overdraft(std::collections::HashSet::from([
            overdraft_account.to_string()
        ]))
        .build()?;
    Ok(Ledger::init(config).await?)
}

pub fn unique_id(prefix: &str) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), 12);
    format!("{prefix}-{suffix}")
}

pub async fn seed_account(
    pool: &sqlx::PgPool,
    id: &str,
    currency: &str,
    available: i64,
) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO accounts (id, currency, available) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(currency)
        .bind(available)
        .execute(pool)
        .await?;
    Ok(())
}

pub fn line(
    account_id: &str,
    side: &str,
    transition: &str,
    from_bucket: Option<&str>,
    to_bucket: Option<&str>,
    amount: &str,
    currency: &str,
) -> LineRequest {
    LineRequest {
        account_id: account_id.to_string(),
        side: side.to_string(),
        transition: transition.to_string(),
        from_bucket: from_bucket.map(str::to_string),
        to_bucket: to_bucket.map(str::to_string),
        amount: LineAmount {
            amount: amount.to_string(),
            currency: currency.to_string(),
        },
    }
}

/// The canonical two-line posting: reserve on the debtor, lock on the pool.
pub fn reserve_lock_journal(
    journal_id: &str,
    idempotency_key: &str,
    debtor: &str,
    pool_account: &str,
    amount: &str,
) -> JournalRequest {
    JournalRequest {
        journal_id: journal_id.to_string(),
        idempotency_key: idempotency_key.to_string(),
        lines: vec![
            line(
                debtor,
                "debit",
                "reserve",
                Some("available"),
                Some("pending"),
                amount,
                "USD",
            ),
            line(
                pool_account,
                "credit",
                "lock",
                Some("available"),
                Some("escrow"),
                amount,
                "USD",
            ),
        ],
    }
}

/// (available, pending, escrow, outflow) in minor units.
pub async fn bucket_values(
    pool: &sqlx::PgPool,
    id: &str,
) -> anyhow::Result<(i64, i64, i64, i64)> {
    let row = sqlx::query(
        "SELECT available, pending, escrow, outflow FROM accounts WHERE id = $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok((
        row.get("available"),
        row.get("pending"),
        row.get("escrow"),
        row.get("outflow"),
    ))
}

pub async fn audit_count(pool: &sqlx::PgPool, journal_id: &str) -> anyhow::Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM ledger_entries WHERE journal_id = $1")
        .bind(journal_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get("n"))
}

pub async fn journal_status(
    pool: &sqlx::PgPool,
    journal_id: &str,
) -> anyhow::Result<Option<String>> {
    let row = sqlx::query("SELECT status FROM journals WHERE journal_id = $1")
        .bind(journal_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.get("status")))
}

pub async fn outbox_item(
    pool: &sqlx::PgPool,
    journal_id: &str,
) -> anyhow::Result<Option<(String, i32, DateTime<Utc>)>> {
    let row = sqlx::query(
        "SELECT status, attempts, next_attempt_at FROM outbox WHERE journal_id = $1",
    )
    .bind(journal_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| (r.get("status"), r.get("attempts"), r.get("next_attempt_at"))))
}

pub async fn seed_outbox_item(
    pool: &sqlx::PgPool,
    journal_id: &str,
    attempts: i32,
    due_offset_ms: i64,
) -> anyhow::Result<Uuid> {
    let next_attempt_at = Utc::now() + chrono::Duration::milliseconds(due_offset_ms);
    let row = sqlx::query(
        r#"INSERT INTO outbox (journal_id, topic, payload, status, attempts, next_attempt_at)
        VALUES ($1, 'LedgerEvent.Posted', $2, 'pending', $3, $4)
        RETURNING id"#,
    )
    .bind(journal_id)
    .bind(serde_json::json!({ "journalId": journal_id }))
    .bind(attempts)
    .bind(next_attempt_at)
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

/// Leftover queue entries from other test binaries would get claimed by the
/// dispatcher under test; drop them first.
pub async fn drain_outbox(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM outbox").execute(pool).await?;
    Ok(())
}

/// Minimal consumer stub: records the journalIds it was handed and answers
/// with a fixed status.
#[derive(Clone, Default)]
pub struct StubConsumer {
    pub received: Arc<Mutex<Vec<String>>>,
}

impl StubConsumer {
    pub fn journal_ids(&self) -> Vec<String> {
        self.received.lock().expect("stub mutex").clone()
    }
}

pub async fn spawn_consumer(status: StatusCode) -> anyhow::Result<(String, StubConsumer)> {
    let stub = StubConsumer::default();
    let app = Router::new()
        .route("/events", post(consume))
        .with_state((stub.clone(), status));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub consumer serves");
    });
    Ok((format!("http://{addr}/events"), stub))
}

async fn consume(
    State((stub, status)): State<(StubConsumer, StatusCode)>,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let journal_id = body
        .get("journalId")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    stub.received.lock().expect("stub mutex").push(journal_id);
    status
}
