mod entity;
pub mod error;
mod repo;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::primitives::{AccountId, Currency, Transition};

pub use entity::*;
use error::EntryError;
use repo::EntryRepo;

/// Service for the append-only audit log.
#[derive(Clone)]
pub struct Entries {
    repo: EntryRepo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHistory {
    pub account_id: AccountId,
    pub currency: Currency,
    pub history: Vec<HistoryPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub transition: Transition,
    pub amount: String,
    pub timestamp: DateTime<Utc>,
}

impl Entries {
    pub(crate) fn new(pool: &PgPool) -> Self {
        Self {
            repo: EntryRepo::new(pool),
        }
    }

    pub(crate) async fn append_all_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entries: &[NewEntry],
    ) -> Result<(), EntryError> {
        self.repo.append_all_in_tx(tx, entries).await
    }

    /// Empty history is a valid result; the web adapter decides whether that
    /// surfaces as a 404.
    #[instrument(name = "tally_ledger.entries.history", skip(self), err)]
    pub async fn history(
        &self,
        account_id: AccountId,
        currency: Option<Currency>,
    ) -> Result<AccountHistory, EntryError> {
        let entries = self
            .repo
            .list_for_account(&account_id, currency.as_ref())
            .await?;
        let currency = currency
            .or_else(|| entries.first().map(|e| e.currency.clone()))
            .unwrap_or_else(|| "USD".parse().expect("USD is a valid currency"));
        Ok(AccountHistory {
            account_id,
            currency,
            history: entries
                .into_iter()
                .map(|entry| HistoryPoint {
                    transition: entry.transition,
                    amount: entry.amount,
                    timestamp: entry.created_at,
                })
                .collect(),
        })
    }
}
