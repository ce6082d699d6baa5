mod entity;
pub mod error;
mod repo;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::primitives::{AccountId, Bucket, Currency};

pub use entity::*;
use error::AccountError;
use repo::AccountRepo;

/// Service for working with ledger accounts.
#[derive(Clone)]
pub struct Accounts {
    repo: AccountRepo,
}

impl Accounts {
    pub(crate) fn new(pool: &PgPool) -> Self {
        Self {
            repo: AccountRepo::new(pool),
        }
    }

    #[instrument(name = "tally_ledger.accounts.find", skip(self), err)]
    pub async fn find(&self, id: &AccountId) -> Result<AccountValues, AccountError> {
        self.repo.find(id).await
    }

    pub(crate) async fn upsert_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &AccountId,
        currency: &Currency,
    ) -> Result<(), AccountError> {
        self.repo.upsert_in_tx(tx, id, currency).await
    }

    pub(crate) async fn touch_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &AccountId,
    ) -> Result<(), AccountError> {
        self.repo.touch_in_tx(tx, id).await
    }

    pub(crate) async fn apply_move_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: &AccountId,
        currency: &Currency,
        from: Bucket,
        to: Bucket,
        amount_minor: i64,
        overdraft_exempt: bool,
    ) -> Result<u64, AccountError> {
        self.repo
            .apply_move_in_tx(tx, id, currency, from, to, amount_minor, overdraft_exempt)
            .await
    }

    pub(crate) async fn find_all_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[AccountId],
    ) -> Result<Vec<AccountValues>, AccountError> {
        self.repo.find_all_in_tx(tx, ids).await
    }
}
