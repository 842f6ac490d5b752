use crate::errors::{ActionError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Bounded retry with a fixed backoff between attempts.
///
/// Runs `op` up to `attempts` times, sleeping `backoff` between failed
/// attempts. Only errors accepted by `should_retry` are absorbed; any
/// other error, and the last error once attempts are exhausted, is
/// returned to the caller.
pub(crate) async fn retry_with_backoff<T, F, Fut, P>(
    attempts: u32,
    backoff: Duration,
    mut should_retry: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&ActionError) -> bool,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && should_retry(&err) => {
                debug!(%err, attempt, attempts, "attempt failed, backing off");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
