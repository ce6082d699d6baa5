mod dispatcher;
pub mod error;
mod event;
mod repo;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{instrument, warn};

use crate::metrics::LedgerMetrics;
use crate::primitives::JournalId;

pub use dispatcher::*;
use error::OutboxError;
pub use event::*;
use repo::OutboxRepo;

/// The durable post-commit queue and its dispatcher.
///
/// Enqueueing happens inside posting transactions; draining is pull-based and
/// safe to run from any number of workers concurrently.
#[derive(Clone)]
pub struct Outbox {
    repo: OutboxRepo,
    http: reqwest::Client,
    metrics: Arc<LedgerMetrics>,
}

impl Outbox {
    pub(crate) fn new(pool: &PgPool, metrics: Arc<LedgerMetrics>) -> Self {
        Self {
            repo: OutboxRepo::new(pool),
            http: reqwest::Client::new(),
            metrics,
        }
    }

    pub(crate) async fn enqueue_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        journal_id: &JournalId,
    ) -> Result<(), OutboxError> {
        self.repo.enqueue_in_tx(tx, journal_id).await
    }

    pub async fn queue_depths(&self) -> Result<(i64, i64), OutboxError> {
        self.repo.queue_depths().await
    }

    /// Drains up to `max_batch` due items: claim one, dispatch, mark sent or
    /// reschedule with backoff. Dispatch failures are tallied as `retried`,
    /// never returned as errors.
    #[instrument(
        name = "tally_ledger.outbox.process_once",
        skip(self),
        fields(target = %opts.target, max_batch = opts.max_batch)
    )]
    pub async fn process_once(&self, opts: ProcessOpts) -> Result<RunSummary, OutboxError> {
        let mut summary = RunSummary::default();
        for _ in 0..opts.max_batch {
            let Some(item) = self.repo.claim_next().await? else {
                break;
            };
            summary.attempted += 1;
            match self.dispatch(&opts, &item).await {
                Ok(()) => {
                    self.repo.mark_sent(item.id).await?;
                    self.metrics.outbox_item_sent();
                    summary.sent += 1;
                }
                Err(reason) => {
                    let delay = backoff_delay(item.attempts + 1, opts.max_backoff_ms);
                    let next_attempt_at = Utc::now()
                        + chrono::Duration::from_std(delay).expect("backoff delay fits");
                    self.repo.reschedule(item.id, next_attempt_at).await?;
                    self.metrics.outbox_item_retried();
                    summary.retried += 1;
                    warn!(
                        item_id = %item.id,
                        journal_id = %item.journal_id,
                        attempts = item.attempts + 1,
                        %reason,
                        "dispatch failed, rescheduled with backoff"
                    );
                }
            }
        }
        let (pending, pending_retries) = self.repo.queue_depths().await?;
        summary.pending = pending;
        summary.pending_retries = pending_retries;
        Ok(summary)
    }

    async fn dispatch(&self, opts: &ProcessOpts, item: &OutboxItem) -> Result<(), String> {
        let response = self
            .http
            .post(&opts.target)
            .timeout(Duration::from_millis(opts.timeout_ms))
            .json(&item.event())
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        // best-effort body read, for the retry log only
        let body = response.text().await.unwrap_or_default();
        Err(format!("consumer returned {status}: {body}"))
    }
}
