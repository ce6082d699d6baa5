use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::primitives::{AccountId, Bucket, Currency};

/// Current state of an account: one currency, four bucketed sub-balances in
/// integer minor units.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountValues {
    pub id: AccountId,
    pub currency: Currency,
    pub available: i64,
    pub pending: i64,
    pub escrow: i64,
    pub outflow: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountValues {
    pub fn bucket(&self, bucket: Bucket) -> i64 {
        match bucket {
            Bucket::Available => self.available,
            Bucket::Pending => self.pending,
            Bucket::Escrow => self.escrow,
            Bucket::Outflow => self.outflow,
        }
    }

    pub fn buckets(&self) -> [(Bucket, i64); 4] {
        [
            (Bucket::Available, self.available),
            (Bucket::Pending, self.pending),
            (Bucket::Escrow, self.escrow),
            (Bucket::Outflow, self.outflow),
        ]
    }
}
