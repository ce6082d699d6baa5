//! Dispatch policy: batch options, the run summary, backoff arithmetic, and
//! target URL resolution. All pure; the I/O lives on the outbox service.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;

pub const DEFAULT_MAX_BATCH: usize = 50;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 60_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOCAL_TARGET: &str = "http://127.0.0.1:3000/events";
const DEFAULT_LOCAL_HOST: &str = "http://127.0.0.1:3000";

const BACKOFF_BASE_MS: u64 = 500;
const BACKOFF_EXP_CAP: i32 = 10;

#[derive(Debug, Clone)]
pub struct ProcessOpts {
    pub target: String,
    pub max_batch: usize,
    pub max_backoff_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ProcessOpts {
    fn default() -> Self {
        Self {
            target: DEFAULT_LOCAL_TARGET.to_string(),
            max_batch: DEFAULT_MAX_BATCH,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Outcome of one `process_once` run. Dispatch failures are counted, never
/// raised.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub attempted: u64,
    pub sent: u64,
    pub retried: u64,
    pub pending: i64,
    pub pending_retries: i64,
}

/// `min(500ms · 2^min(attempts, 10), max)` plus additive jitter of up to 20%
/// of the capped delay.
pub fn backoff_delay(attempts: i32, max_backoff_ms: u64) -> Duration {
    let exp = attempts.clamp(0, BACKOFF_EXP_CAP) as u32;
    let delay = BACKOFF_BASE_MS
        .saturating_mul(1u64 << exp)
        .min(max_backoff_ms);
    let jitter = rand::rng().random_range(0..=delay / 5);
    Duration::from_millis(delay + jitter)
}

/// Precedence: explicit argument, configured absolute URL, configured path on
/// a configured host, local development default.
pub fn resolve_target(
    override_target: Option<&str>,
    configured_url: Option<&str>,
    configured_path: Option<&str>,
    configured_host: Option<&str>,
) -> String {
    if let Some(target) = override_target {
        return target.to_string();
    }
    if let Some(url) = configured_url {
        return url.to_string();
    }
    if let Some(path) = configured_path {
        let host = configured_host.unwrap_or(DEFAULT_LOCAL_HOST);
        return format!("{}{}", host.trim_end_matches('/'), path);
    }
    DEFAULT_LOCAL_TARGET.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deterministic_part(attempts: i32, max_backoff_ms: u64) -> u64 {
        let exp = attempts.clamp(0, BACKOFF_EXP_CAP) as u32;
        BACKOFF_BASE_MS
            .saturating_mul(1u64 << exp)
            .min(max_backoff_ms)
    }

    #[test]
    fn backoff_grows_then_plateaus() {
        assert_eq!(deterministic_part(1, 60_000), 1_000);
        assert_eq!(deterministic_part(2, 60_000), 2_000);
        assert_eq!(deterministic_part(7, 60_000), 60_000);
        assert_eq!(deterministic_part(10, 60_000), 60_000);
        // the exponent caps at 10, so the delay cannot wrap at high attempts
        assert_eq!(deterministic_part(10_000, 60_000), 60_000);
    }

    #[test]
    fn backoff_stays_within_the_jitter_window() {
        for attempts in 0..20 {
            let base = deterministic_part(attempts, 1_000);
            for _ in 0..50 {
                let delay = backoff_delay(attempts, 1_000).as_millis() as u64;
                assert!(delay >= base);
                assert!(delay <= base + base / 5);
            }
        }
    }

    #[test]
    fn backoff_is_monotone_in_attempts() {
        let mut previous = 0;
        for attempts in 0..12 {
            let current = deterministic_part(attempts, 60_000);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn target_resolution_precedence() {
        assert_eq!(
            resolve_target(
                Some("http://override/hook"),
                Some("http://configured/url"),
                Some("/path"),
                Some("http://host"),
            ),
            "http://override/hook"
        );
        assert_eq!(
            resolve_target(None, Some("http://configured/url"), Some("/path"), None),
            "http://configured/url"
        );
        assert_eq!(
            resolve_target(None, None, Some("/hooks/ledger"), Some("http://consumer:9000/")),
            "http://consumer:9000/hooks/ledger"
        );
        assert_eq!(
            resolve_target(None, None, Some("/events"), None),
            "http://127.0.0.1:3000/events"
        );
        assert_eq!(resolve_target(None, None, None, None), DEFAULT_LOCAL_TARGET);
    }
}
