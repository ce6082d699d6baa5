//! In-memory operation counters, snapshotted into the health surface.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct LedgerMetrics {
    journals_posted: AtomicU64,
    idempotent_hits: AtomicU64,
    post_failures: AtomicU64,
    outbox_sent: AtomicU64,
    outbox_retried: AtomicU64,
}

impl LedgerMetrics {
    pub fn journal_posted(&self) {
        self.journals_posted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn idempotent_hit(&self) {
        self.idempotent_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn post_failed(&self) {
        self.post_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn outbox_item_sent(&self) {
        self.outbox_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn outbox_item_retried(&self) {
        self.outbox_retried.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            journals_posted: self.journals_posted.load(Ordering::Relaxed),
            idempotent_hits: self.idempotent_hits.load(Ordering::Relaxed),
            post_failures: self.post_failures.load(Ordering::Relaxed),
            outbox_sent: self.outbox_sent.load(Ordering::Relaxed),
            outbox_retried: self.outbox_retried.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub journals_posted: u64,
    pub idempotent_hits: u64,
    pub post_failures: u64,
    pub outbox_sent: u64,
    pub outbox_retried: u64,
}
