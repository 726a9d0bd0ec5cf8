//! Fixed-interval retry for fallible async operations.
//!
//! The index poll is a single fallible call; this combinator owns the retry
//! policy around it so the poller itself stays retry-free.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Outcome of a retried operation: the value, or the last error together with
/// the number of attempts made.
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `operation` up to `max_tries` times, sleeping `wait` between failed
/// attempts. The first success wins; exhaustion returns the final error.
///
/// `on_retry` is invoked after each failed attempt that will be retried,
/// before the wait, so callers can surface a notice to the operator.
pub async fn retry_fixed<T, E, F, Fut, N>(
    max_tries: u32,
    wait: Duration,
    mut operation: F,
    mut on_retry: N,
) -> Result<T, Exhausted<E>>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    N: FnMut(u32, &E),
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt, max_tries, error = %e, "Operation failed");
                if attempt >= max_tries {
                    return Err(Exhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                on_retry(attempt, &e);
                sleep(wait).await;
            }
        }
    }
}
