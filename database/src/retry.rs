use std::{future::Future, pin::Pin, time::Duration};

use tokio::time::sleep;

/// Runs `operation` until it succeeds, fails with an error `is_retryable`
/// rejects, or `max_retries` retries have been spent. The delay doubles after
/// every failed attempt.
pub async fn retry_with_backoff<F, T, E, P>(
    mut operation: F,
    max_retries: usize,
    initial_delay: Duration,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Pin<Box<dyn Future<Output = Result<T, E>> + Send>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_retries && is_retryable(&e) => {
                attempt += 1;
                tracing::warn!(
                    "Attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );
                sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
