use thiserror::Error;

use crate::{
    account::error::AccountError, ack::error::AckError, entry::error::EntryError,
    journal::error::JournalError, outbox::error::OutboxError,
};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("LedgerError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("LedgerError - Migrate: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
    #[error("LedgerError - Config: {0}")]
    ConfigError(String),
    #[error("LedgerError - Journal: {0}")]
    Journal(#[from] JournalError),
    #[error("LedgerError - Account: {0}")]
    Account(#[from] AccountError),
    #[error("LedgerError - Entry: {0}")]
    Entry(#[from] EntryError),
    #[error("LedgerError - Outbox: {0}")]
    Outbox(#[from] OutboxError),
    #[error("LedgerError - Ack: {0}")]
    Ack(#[from] AckError),
}
