use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Bounded retry with exponential backoff.
///
/// `op` runs at most `retries + 1` times; the delay starts at `base_delay` and
/// doubles after every failed attempt. The last error is returned.
pub async fn with_backoff<T, E, F, Fut>(retries: u32, base_delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = base_delay;
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < retries => {
                attempt += 1;
                tracing::debug!(attempt, error = %err, "retrying after failure");
                sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            Err(err) => return Err(err),
        }
    }
}
