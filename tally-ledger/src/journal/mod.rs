mod entity;
pub mod error;
mod repo;
mod validate;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::primitives::JournalId;

pub use entity::*;
use error::JournalError;
use repo::JournalRepo;
pub use validate::ValidationIssue;
pub(crate) use validate::{preflight, validate};

/// Service for journal headers. The posting transaction itself is
/// orchestrated by the ledger root, which drives these building blocks
/// together with the account, entry, and outbox services.
#[derive(Clone)]
pub struct Journals {
    repo: JournalRepo,
}

impl Journals {
    pub(crate) fn new(pool: &PgPool) -> Self {
        Self {
            repo: JournalRepo::new(pool),
        }
    }

    #[instrument(name = "tally_ledger.journals.find_existing", skip(self), err)]
    pub async fn find_existing(
        &self,
        idempotency_key: &str,
        journal_id: &JournalId,
    ) -> Result<Option<JournalValues>, JournalError> {
        self.repo.find_existing(idempotency_key, journal_id).await
    }

    pub(crate) async fn find_existing_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        idempotency_key: &str,
        journal_id: &JournalId,
    ) -> Result<Option<JournalValues>, JournalError> {
        self.repo
            .find_existing_in_tx(tx, idempotency_key, journal_id)
            .await
    }

    pub(crate) async fn insert_header_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        prepared: &PreparedJournal,
    ) -> Result<(), JournalError> {
        self.repo.insert_header_in_tx(tx, prepared).await
    }

    pub(crate) async fn mark_posted_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        journal_id: &JournalId,
    ) -> Result<(), JournalError> {
        self.repo.mark_posted_in_tx(tx, journal_id).await
    }
}
