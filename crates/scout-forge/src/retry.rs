use std::future::Future;
use std::time::Duration;

use scout_core::config::ForgeConfig;

use crate::errors::{ForgeError, Result};

/// Runs `op` up to `config.retry_attempts` times with exponential backoff
/// (`retry_base_secs * 2^attempt`, capped at `retry_cap_secs`), retrying
/// only transient failures (spec §7: "transient failures are retried with
/// exponential backoff up to a bounded attempt count; permanent failures
/// are not retried").
pub async fn with_retry<T, F, Fut>(config: &ForgeConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.kind() == scout_core::errors::TransportErrorKind::Transient && attempt + 1 < config.retry_attempts => {
                let backoff = (config.retry_base_secs.saturating_mul(1u64 << attempt)).min(config.retry_cap_secs);
                tracing::warn!(attempt, backoff, error = %err, "forge call failed, retrying");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                attempt += 1;
            }
            Err(err) if err.kind() == scout_core::errors::TransportErrorKind::Transient => {
                return Err(ForgeError::RetriesExhausted { attempts: attempt + 1, last: err.to_string() });
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config() -> ForgeConfig {
        ForgeConfig {
            token: None,
            connect_timeout_secs: 1,
            total_timeout_secs: 1,
            retry_attempts: 3,
            retry_base_secs: 0,
            retry_cap_secs: 0,
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_without_retrying() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = with_retry(&config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_retry_budget_on_persistent_transient_failure() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = with_retry(&config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ForgeError::RateLimited { retry_after_secs: 0 })
        })
        .await;
        assert!(matches!(result, Err(ForgeError::RetriesExhausted { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_a_permanent_failure() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = with_retry(&config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ForgeError::MissingToken)
        })
        .await;
        assert!(matches!(result, Err(ForgeError::MissingToken)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
