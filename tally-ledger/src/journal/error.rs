use thiserror::Error;

use crate::account::error::AccountError;
use crate::entry::error::EntryError;
use crate::money::MoneyError;
use crate::outbox::error::OutboxError;
use crate::primitives::{AccountId, Bucket, Currency, JournalId};
use crate::transition::TransitionError;

use super::validate::ValidationIssue;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("JournalError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JournalError - Validation: request failed schema validation ({} issue(s))", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error("JournalError - DuplicateKey: journal '{0}' collides with an existing journal")]
    DuplicateKey(JournalId),
    #[error("JournalError - Unbalanced: debits do not equal credits in minor units")]
    Unbalanced,
    #[error(
        "JournalError - CurrencyMismatch: line {line_no} uses {got} but the journal is {expected}"
    )]
    CurrencyMismatch {
        line_no: usize,
        expected: Currency,
        got: Currency,
    },
    #[error("JournalError - line {line_no}: {source}")]
    Transition {
        line_no: usize,
        source: TransitionError,
    },
    #[error("JournalError - {0}")]
    InvalidAmount(#[from] MoneyError),
    #[error(
        "JournalError - InsufficientFunds: account '{account_id}' has insufficient funds in \
         {bucket} or holds a currency other than {currency}"
    )]
    InsufficientFunds {
        account_id: AccountId,
        bucket: Bucket,
        currency: Currency,
    },
    #[error(
        "JournalError - NegativeBalance: account '{account_id}' bucket {bucket} went negative"
    )]
    NegativeBalance { account_id: AccountId, bucket: Bucket },
    #[error("JournalError - ChaosFailure: synthetic failure injected, transaction rolled back")]
    Chaos,
    #[error("JournalError - Account: {0}")]
    Account(#[from] AccountError),
    #[error("JournalError - Entry: {0}")]
    Entry(#[from] EntryError),
    #[error("JournalError - Outbox: {0}")]
    Outbox(#[from] OutboxError),
}
