use std::collections::HashSet;

use derive_builder::Builder;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::error::LedgerError;

/// Account exempt from the non-negative guard by default.
pub const DEFAULT_SYSTEM_OVERDRAFT: &str = "ESCROW_POOL";

/// How the ledger reaches its store and which posting policies apply.
///
/// Exactly one connection source must be given: an injected pool (the
/// test-mode override) or a connection string to open a pool from.
#[derive(Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct LedgerConfig {
    #[builder(setter(strip_option), default)]
    pub(super) pool: Option<PgPool>,
    #[builder(setter(into, strip_option), default)]
    pub(super) pg_con: Option<String>,
    #[builder(setter(strip_option), default)]
    pub(super) max_connections: Option<u32>,
    #[builder(default)]
    pub(super) exec_migrations: bool,
    /// Account ids allowed to go temporarily negative to balance
    /// debit/credit semantics.
    #[builder(setter(into), default = "default_system_overdraft()")]
    pub(super) system_overdraft: HashSet<String>,
    /// Probability in [0, 1] of a synthetic failure after the journal is
    /// marked posted, forcing the whole transaction to roll back. Off in
    /// production.
    #[builder(default)]
    pub(super) chaos_probability: f64,
}

fn default_system_overdraft() -> HashSet<String> {
    HashSet::from([DEFAULT_SYSTEM_OVERDRAFT.to_string()])
}

impl LedgerConfig {
    pub fn builder() -> LedgerConfigBuilder {
        LedgerConfigBuilder::default()
    }

    /// Resolves the backing pool (an injected one wins) and, when
    /// configured, brings the schema up to date before anything else
    /// touches it.
    pub(super) async fn connect(&self) -> Result<PgPool, LedgerError> {
        let pool = match &self.pool {
            Some(injected) => injected.clone(),
            None => {
                let url = self.pg_con.as_deref().ok_or_else(|| {
                    LedgerError::ConfigError(
                        "no store configured: provide a connection string or inject a pool"
                            .to_string(),
                    )
                })?;
                let mut opts = PgPoolOptions::new();
                if let Some(cap) = self.max_connections {
                    opts = opts.max_connections(cap);
                }
                opts.connect(url).await?
            }
        };
        if self.exec_migrations {
            sqlx::migrate!().run(&pool).await?;
        }
        Ok(pool)
    }
}

impl LedgerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let has_con = matches!(self.pg_con, Some(Some(_)));
        let has_pool = matches!(self.pool, Some(Some(_)));
        match (has_con, has_pool) {
            (false, false) => {
                return Err(
                    "a ledger needs a store: set a connection string or inject a pool".to_string()
                )
            }
            (true, true) => {
                return Err(
                    "connection string and injected pool are mutually exclusive".to_string()
                )
            }
            _ => {}
        }
        match self.chaos_probability {
            Some(p) if !(0.0..=1.0).contains(&p) => {
                Err(format!("chaos_probability must lie in [0, 1], got {p}"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_exactly_one_connection_source() {
        assert!(LedgerConfig::builder().build().is_err());
        assert!(LedgerConfig::builder()
            .pg_con("postgres://localhost/pg")
            .build()
            .is_ok());
    }

    #[tokio::test]
    async fn rejects_two_connection_sources() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/pg")
            .unwrap();
        assert!(LedgerConfig::builder()
            .pg_con("postgres://localhost/pg")
            .pool(pool)
            .build()
            .is_err());
    }

    #[test]
    fn overdraft_set_defaults_to_the_escrow_pool() {
        let config = LedgerConfig::builder()
            .pg_con("postgres://localhost/pg")
            .build()
            .unwrap();
        assert!(config.system_overdraft.contains(DEFAULT_SYSTEM_OVERDRAFT));
    }

    #[test]
    fn chaos_probability_is_bounded() {
        assert!(LedgerConfig::builder()
            .pg_con("postgres://localhost/pg")
            .chaos_probability(1.5)
            .build()
            .is_err());
        assert!(LedgerConfig::builder()
            .pg_con("postgres://localhost/pg")
            .chaos_probability(1.0)
            .build()
            .is_ok());
    }
}
