//! The bucket state machine: which (from, to) pair each transition may label.

use thiserror::Error;

use crate::primitives::{Bucket, Transition};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("MissingBucket: {field} is required for {transition} (expected {expected})")]
    MissingBucket {
        transition: Transition,
        field: &'static str,
        expected: String,
    },
    #[error("InvalidBucket: {field} for {transition} must be {expected}, got {got}")]
    InvalidBucket {
        transition: Transition,
        field: &'static str,
        expected: String,
        got: Bucket,
    },
}

/// One row of the rules table. `lock` is the only transition with a choice of
/// source bucket.
pub struct TransitionRule {
    pub from: &'static [Bucket],
    pub to: Bucket,
}

impl Transition {
    pub fn rule(self) -> TransitionRule {
        use Bucket::*;
        match self {
            Transition::Reserve => TransitionRule {
                from: &[Available],
                to: Pending,
            },
            Transition::Lock => TransitionRule {
                from: &[Pending, Available],
                to: Escrow,
            },
            Transition::Finalize => TransitionRule {
                from: &[Escrow],
                to: Outflow,
            },
            Transition::Release => TransitionRule {
                from: &[Pending],
                to: Available,
            },
            Transition::Revert => TransitionRule {
                from: &[Escrow],
                to: Available,
            },
        }
    }
}

/// What a validated line does to its account's buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEffect {
    /// `fromBucket == toBucket`: legal for any transition, moves nothing.
    Noop,
    Move { from: Bucket, to: Bucket },
}

pub fn validate_line(
    transition: Transition,
    from: Option<Bucket>,
    to: Option<Bucket>,
) -> Result<LineEffect, TransitionError> {
    if let (Some(f), Some(t)) = (from, to) {
        if f == t {
            return Ok(LineEffect::Noop);
        }
    }
    let rule = transition.rule();
    let expected_from = rule
        .from
        .iter()
        .map(|b| b.as_str())
        .collect::<Vec<_>>()
        .join(" or ");

    let from = from.ok_or(TransitionError::MissingBucket {
        transition,
        field: "fromBucket",
        expected: expected_from.clone(),
    })?;
    let to = to.ok_or_else(|| TransitionError::MissingBucket {
        transition,
        field: "toBucket",
        expected: rule.to.as_str().to_string(),
    })?;

    if !rule.from.contains(&from) {
        return Err(TransitionError::InvalidBucket {
            transition,
            field: "fromBucket",
            expected: expected_from,
            got: from,
        });
    }
    if to != rule.to {
        return Err(TransitionError::InvalidBucket {
            transition,
            field: "toBucket",
            expected: rule.to.as_str().to_string(),
            got: to,
        });
    }
    Ok(LineEffect::Move { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use Bucket::*;
    use Transition::*;

    #[test]
    fn every_transition_has_a_rule() {
        for transition in [Reserve, Lock, Finalize, Release, Revert] {
            let rule = transition.rule();
            assert!(!rule.from.is_empty());
        }
    }

    #[test]
    fn exact_pairs_validate() {
        assert_eq!(
            validate_line(Reserve, Some(Available), Some(Pending)).unwrap(),
            LineEffect::Move {
                from: Available,
                to: Pending
            }
        );
        assert_eq!(
            validate_line(Finalize, Some(Escrow), Some(Outflow)).unwrap(),
            LineEffect::Move {
                from: Escrow,
                to: Outflow
            }
        );
        assert_eq!(
            validate_line(Release, Some(Pending), Some(Available)).unwrap(),
            LineEffect::Move {
                from: Pending,
                to: Available
            }
        );
        assert_eq!(
            validate_line(Revert, Some(Escrow), Some(Available)).unwrap(),
            LineEffect::Move {
                from: Escrow,
                to: Available
            }
        );
    }

    #[test]
    fn lock_accepts_either_source() {
        assert!(validate_line(Lock, Some(Pending), Some(Escrow)).is_ok());
        assert!(validate_line(Lock, Some(Available), Some(Escrow)).is_ok());
        assert!(matches!(
            validate_line(Lock, Some(Outflow), Some(Escrow)),
            Err(TransitionError::InvalidBucket {
                field: "fromBucket",
                ..
            })
        ));
    }

    #[test]
    fn same_bucket_is_a_noop_for_any_transition() {
        for transition in [Reserve, Lock, Finalize, Release, Revert] {
            assert_eq!(
                validate_line(transition, Some(Escrow), Some(Escrow)).unwrap(),
                LineEffect::Noop
            );
        }
    }

    #[test]
    fn missing_buckets_are_reported_with_the_offending_field() {
        assert!(matches!(
            validate_line(Reserve, None, Some(Pending)),
            Err(TransitionError::MissingBucket {
                field: "fromBucket",
                ..
            })
        ));
        assert!(matches!(
            validate_line(Reserve, Some(Available), None),
            Err(TransitionError::MissingBucket {
                field: "toBucket",
                ..
            })
        ));
    }

    #[test]
    fn wrong_destination_is_rejected() {
        assert!(matches!(
            validate_line(Reserve, Some(Available), Some(Escrow)),
            Err(TransitionError::InvalidBucket {
                field: "toBucket",
                ..
            })
        ));
    }
}
