pub mod error;
mod repo;

use sqlx::PgPool;
use tracing::instrument;

use crate::outbox::LedgerEvent;

use error::AckError;
use repo::AckRepo;

/// Consumer-side acknowledgement set: one durable record per processed
/// journal, duplicate inserts tolerated.
#[derive(Clone)]
pub struct Acks {
    repo: AckRepo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Recorded,
    Duplicate,
}

impl Acks {
    pub(crate) fn new(pool: &PgPool) -> Self {
        Self {
            repo: AckRepo::new(pool),
        }
    }

    #[instrument(name = "tally_ledger.acks.record", skip(self, event), fields(journal_id = %event.journal_id), err)]
    pub async fn record(&self, event: &LedgerEvent) -> Result<AckOutcome, AckError> {
        if event.journal_id.is_empty() {
            return Err(AckError::MissingJournalId);
        }
        if self.repo.insert(event).await? {
            Ok(AckOutcome::Recorded)
        } else {
            Ok(AckOutcome::Duplicate)
        }
    }
}
