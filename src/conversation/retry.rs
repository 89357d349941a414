//! Bounded retry for idempotent reads against the agent service.
//!
//! Only lookups and status/list reads go through here. Creating threads, messages or runs is
//! never retried, since a blind retry could start a duplicate run.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;

use super::config::RetrySettings;
use super::error::{TransportError, TransportResult};

/// Run `operation`, retrying transient failures with jittered exponential backoff
pub async fn idempotent<T, F, Fut>(
    settings: &RetrySettings,
    operation: &str,
    mut call: F,
) -> TransportResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TransportResult<T>>,
{
    if settings.max_elapsed_ms == 0 {
        return call().await;
    }

    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(settings.initial_interval_ms))
        .with_max_elapsed_time(Some(Duration::from_millis(settings.max_elapsed_ms)))
        .build();

    backoff::future::retry_notify(
        policy,
        || {
            let attempt = call();
            async move {
                attempt.await.map_err(|e| {
                    if e.is_transient() {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        },
        |err: TransportError, wait: Duration| {
            tracing::warn!("{} failed ({}), retrying in {:?}", operation, err, wait);
        },
    )
    .await
}
