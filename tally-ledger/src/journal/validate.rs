//! Shape validation (collects field-level issues) and semantic preflight
//! (currency uniformity, transition legality, exact balance) for posting
//! requests. Everything here runs before a transaction is opened.

use serde::Serialize;

use crate::money;
use crate::primitives::{AccountId, Bucket, Currency, DebitOrCredit, Transition};
use crate::transition;

use super::entity::*;
use super::error::JournalError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub code: &'static str,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }
}

/// Checks the request shape, collecting every issue it can find rather than
/// bailing on the first one.
pub fn validate(request: &JournalRequest) -> Result<NewJournal, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if request.journal_id.is_empty() {
        issues.push(ValidationIssue::new(
            "journalId",
            "journalId must be a non-empty string",
            "required",
        ));
    }
    if request.idempotency_key.is_empty() {
        issues.push(ValidationIssue::new(
            "idempotencyKey",
            "idempotencyKey must be a non-empty string",
            "required",
        ));
    }
    if request.lines.len() < 2 {
        issues.push(ValidationIssue::new(
            "lines",
            "a journal needs at least 2 lines",
            "too_small",
        ));
    }

    let mut lines = Vec::with_capacity(request.lines.len());
    for (index, line) in request.lines.iter().enumerate() {
        if let Some(line) = validate_line_shape(index, line, &mut issues) {
            lines.push(line);
        }
    }

    if issues.is_empty() {
        Ok(NewJournal {
            journal_id: request.journal_id.clone().into(),
            idempotency_key: request.idempotency_key.clone(),
            lines,
        })
    } else {
        Err(issues)
    }
}

fn validate_line_shape(
    index: usize,
    line: &LineRequest,
    issues: &mut Vec<ValidationIssue>,
) -> Option<JournalLine> {
    let path = |field: &str| format!("lines[{index}].{field}");

    if line.account_id.is_empty() {
        issues.push(ValidationIssue::new(
            path("accountId"),
            "accountId must be a non-empty string",
            "required",
        ));
    }
    let side = match line.side.parse::<DebitOrCredit>() {
        Ok(side) => Some(side),
        Err(_) => {
            issues.push(ValidationIssue::new(
                path("side"),
                format!("side must be 'debit' or 'credit', got '{}'", line.side),
                "invalid_enum",
            ));
            None
        }
    };
    let transition = match line.transition.parse::<Transition>() {
        Ok(transition) => Some(transition),
        Err(_) => {
            issues.push(ValidationIssue::new(
                path("transition"),
                format!("unknown transition '{}'", line.transition),
                "invalid_enum",
            ));
            None
        }
    };
    let from_bucket = parse_bucket(&line.from_bucket, &path("fromBucket"), issues)?;
    let to_bucket = parse_bucket(&line.to_bucket, &path("toBucket"), issues)?;

    let currency = match line.amount.currency.parse::<Currency>() {
        Ok(currency) => Some(currency),
        Err(_) => {
            issues.push(ValidationIssue::new(
                path("amount.currency"),
                format!(
                    "currency must be a three-letter uppercase code, got '{}'",
                    line.amount.currency
                ),
                "pattern",
            ));
            None
        }
    };
    let amount = money::canonicalize(&line.amount.amount);
    if money::to_minor(&amount).is_err() {
        issues.push(ValidationIssue::new(
            path("amount.amount"),
            format!(
                "amount must be a decimal with at most two fraction digits, got '{}'",
                line.amount.amount
            ),
            "pattern",
        ));
        return None;
    }

    Some(JournalLine {
        account_id: AccountId::new(line.account_id.clone()),
        side: side?,
        transition: transition?,
        from_bucket,
        to_bucket,
        amount,
        currency: currency?,
    })
}

#[allow(clippy::option_option)]
fn parse_bucket(
    raw: &Option<String>,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Option<Bucket>> {
    match raw {
        None => Some(None),
        Some(raw) => match raw.parse::<Bucket>() {
            Ok(bucket) => Some(Some(bucket)),
            Err(_) => {
                issues.push(ValidationIssue::new(
                    path,
                    format!("unknown bucket '{raw}'"),
                    "invalid_enum",
                ));
                None
            }
        },
    }
}

/// Semantic preflight over a shape-valid journal. Order matters: currency
/// uniformity, then state-machine legality per line, then the balance proof.
pub(crate) fn preflight(journal: NewJournal) -> Result<PreparedJournal, JournalError> {
    let currency = journal
        .lines
        .first()
        .map(|line| line.currency.clone())
        .expect("shape validation guarantees at least two lines");
    for (index, line) in journal.lines.iter().enumerate() {
        if line.currency != currency {
            return Err(JournalError::CurrencyMismatch {
                line_no: index + 1,
                expected: currency,
                got: line.currency.clone(),
            });
        }
    }

    let mut effects = Vec::with_capacity(journal.lines.len());
    for (index, line) in journal.lines.iter().enumerate() {
        let effect = transition::validate_line(line.transition, line.from_bucket, line.to_bucket)
            .map_err(|source| JournalError::Transition {
                line_no: index + 1,
                source,
            })?;
        effects.push(effect);
    }

    if !money::is_balanced(
        journal
            .lines
            .iter()
            .map(|line| (line.side, line.amount.as_str())),
    )? {
        return Err(JournalError::Unbalanced);
    }

    let lines_json =
        serde_json::to_value(&journal.lines).expect("journal lines serialize to JSON");
    let mut lines = Vec::with_capacity(journal.lines.len());
    for (index, (line, effect)) in journal.lines.into_iter().zip(effects).enumerate() {
        let amount_minor = money::to_minor(&line.amount)?;
        lines.push(PreparedLine {
            line_no: (index + 1) as i32,
            account_id: line.account_id,
            side: line.side,
            transition: line.transition,
            from_bucket: line.from_bucket,
            to_bucket: line.to_bucket,
            effect,
            amount: line.amount,
            amount_minor,
        });
    }

    Ok(PreparedJournal {
        journal_id: journal.journal_id,
        idempotency_key: journal.idempotency_key,
        currency,
        lines,
        lines_json,
    })
}
