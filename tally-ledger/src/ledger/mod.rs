pub mod config;
pub mod error;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

pub use config::*;
use error::*;

use crate::{
    account::Accounts,
    ack::Acks,
    entry::{Entries, NewEntry},
    journal::{
        error::JournalError, preflight, validate, JournalRequest, Journals, PreparedJournal,
    },
    metrics::{LedgerMetrics, MetricsSnapshot},
    outbox::Outbox,
    primitives::{AccountId, JournalId},
    transition::LineEffect,
};

/// Root handle over the ledger: owns the pool and wires the per-entity
/// services together. Cheap to clone, safe to share across workers.
#[derive(Clone)]
pub struct Ledger {
    pool: PgPool,
    accounts: Accounts,
    journals: Journals,
    entries: Entries,
    outbox: Outbox,
    acks: Acks,
    metrics: Arc<LedgerMetrics>,
    system_overdraft: Arc<HashSet<String>>,
    chaos_probability: f64,
}

#[derive(Debug, Clone)]
pub struct PostReceipt {
    pub journal_id: JournalId,
    /// True when the posting was already committed under this idempotency
    /// key or journal id; no writes happened on this call.
    pub idempotent: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub db_connected: bool,
    pub outbox_queue: i64,
    pub pending_retries: i64,
    pub metrics: MetricsSnapshot,
}

impl Ledger {
    pub async fn init(config: LedgerConfig) -> Result<Self, LedgerError> {
        let pool = config.connect().await?;
        let metrics = Arc::new(LedgerMetrics::default());
        let accounts = Accounts::new(&pool);
        let journals = Journals::new(&pool);
        let entries = Entries::new(&pool);
        let outbox = Outbox::new(&pool, Arc::clone(&metrics));
        let acks = Acks::new(&pool);
        Ok(Self {
            pool,
            accounts,
            journals,
            entries,
            outbox,
            acks,
            metrics,
            system_overdraft: Arc::new(config.system_overdraft),
            chaos_probability: config.chaos_probability,
        })
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn journals(&self) -> &Journals {
        &self.journals
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn acks(&self) -> &Acks {
        &self.acks
    }

    pub fn metrics(&self) -> &LedgerMetrics {
        &self.metrics
    }

    /// Posts a balanced journal atomically: header, guarded bucket moves,
    /// audit entries, and the outbox event become visible together or not at
    /// all.
    #[instrument(name = "tally_ledger.post_journal", skip(self, request), err)]
    pub async fn post_journal(&self, request: JournalRequest) -> Result<PostReceipt, LedgerError> {
        let started = Instant::now();
        let prepared = match validate(&request)
            .map_err(JournalError::Validation)
            .and_then(preflight)
        {
            Ok(prepared) => prepared,
            Err(err) => {
                self.metrics.post_failed();
                return Err(err.into());
            }
        };
        let journal_id = prepared.journal_id.clone();
        let idempotency_key = prepared.idempotency_key.clone();
        match self.post_prepared(prepared).await {
            Ok(receipt) => {
                if receipt.idempotent {
                    self.metrics.idempotent_hit();
                } else {
                    self.metrics.journal_posted();
                }
                info!(
                    journal_id = %journal_id,
                    idempotency_key = %idempotency_key,
                    idempotent = receipt.idempotent,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "journal posted"
                );
                Ok(receipt)
            }
            Err(err) => {
                self.metrics.post_failed();
                warn!(
                    journal_id = %journal_id,
                    idempotency_key = %idempotency_key,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "journal post aborted"
                );
                Err(err.into())
            }
        }
    }

    async fn post_prepared(&self, prepared: PreparedJournal) -> Result<PostReceipt, JournalError> {
        let mut tx = self.pool.begin().await?;

        if let Some(existing) = self
            .journals
            .find_existing_in_tx(&mut tx, &prepared.idempotency_key, &prepared.journal_id)
            .await?
        {
            return Ok(PostReceipt {
                journal_id: existing.journal_id,
                idempotent: true,
            });
        }

        match self.journals.insert_header_in_tx(&mut tx, &prepared).await {
            Ok(()) => {}
            Err(JournalError::DuplicateKey(_)) => {
                // lost the unique-index race; the surviving header is the answer
                drop(tx);
                if let Some(existing) = self
                    .journals
                    .find_existing(&prepared.idempotency_key, &prepared.journal_id)
                    .await?
                {
                    return Ok(PostReceipt {
                        journal_id: existing.journal_id,
                        idempotent: true,
                    });
                }
                return Err(JournalError::DuplicateKey(prepared.journal_id.clone()));
            }
            Err(other) => return Err(other),
        }

        let mut touched: Vec<AccountId> = Vec::new();
        let mut entries = Vec::with_capacity(prepared.lines.len());
        for line in &prepared.lines {
            self.accounts
                .upsert_in_tx(&mut tx, &line.account_id, &prepared.currency)
                .await?;
            match line.effect {
                LineEffect::Noop => {
                    self.accounts.touch_in_tx(&mut tx, &line.account_id).await?;
                }
                LineEffect::Move { from, to } => {
                    let overdraft_exempt =
                        self.system_overdraft.contains(line.account_id.as_str());
                    let matched = self
                        .accounts
                        .apply_move_in_tx(
                            &mut tx,
                            &line.account_id,
                            &prepared.currency,
                            from,
                            to,
                            line.amount_minor,
                            overdraft_exempt,
                        )
                        .await?;
                    if matched == 0 {
                        return Err(JournalError::InsufficientFunds {
                            account_id: line.account_id.clone(),
                            bucket: from,
                            currency: prepared.currency.clone(),
                        });
                    }
                }
            }
            if !touched.contains(&line.account_id) {
                touched.push(line.account_id.clone());
            }
            entries.push(NewEntry {
                journal_id: prepared.journal_id.clone(),
                line_no: line.line_no,
                account_id: line.account_id.clone(),
                from_bucket: line.from_bucket,
                to_bucket: line.to_bucket,
                side: line.side,
                transition: line.transition,
                amount: line.amount.clone(),
                currency: prepared.currency.clone(),
            });
        }
        self.entries.append_all_in_tx(&mut tx, &entries).await?;

        // Backstop against pathological but individually-legal line orders:
        // no non-exempt account may leave the transaction with a negative
        // bucket.
        for account in self.accounts.find_all_in_tx(&mut tx, &touched).await? {
            if self.system_overdraft.contains(account.id.as_str()) {
                continue;
            }
            for (bucket, value) in account.buckets() {
                if value < 0 {
                    return Err(JournalError::NegativeBalance {
                        account_id: account.id.clone(),
                        bucket,
                    });
                }
            }
        }

        self.outbox
            .enqueue_in_tx(&mut tx, &prepared.journal_id)
            .await?;
        self.journals
            .mark_posted_in_tx(&mut tx, &prepared.journal_id)
            .await?;

        if self.chaos_probability > 0.0
            && rand::rng().random::<f64>() < self.chaos_probability
        {
            return Err(JournalError::Chaos);
        }

        tx.commit().await?;
        Ok(PostReceipt {
            journal_id: prepared.journal_id,
            idempotent: false,
        })
    }

    #[instrument(name = "tally_ledger.health", skip(self), err)]
    pub async fn health(&self) -> Result<HealthSnapshot, LedgerError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        let (outbox_queue, pending_retries) = self.outbox.queue_depths().await?;
        Ok(HealthSnapshot {
            db_connected: true,
            outbox_queue,
            pending_retries,
            metrics: self.metrics.snapshot(),
        })
    }
}
