use std::future::IntoFuture;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Store calls slower than this are logged at warn level.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_secs(1);

/// Awaits a store call and logs how long it took.
///
/// Accepts anything awaitable, including the driver's action builders. The
/// outcome is passed through untouched; failures are only annotated in the
/// log line.
///
/// ```ignore
/// let user = timed("users.find_one", collection.find_one(filter)).await?;
/// ```
pub async fn timed<F, T, E>(operation: &'static str, future: F) -> Result<T, E>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let result = future.await;
    let elapsed = start.elapsed();
    let duration_ms = elapsed.as_millis() as u64;

    match &result {
        Ok(_) if elapsed >= SLOW_QUERY_THRESHOLD => {
            warn!(operation, duration_ms, "Slow database query");
        }
        Ok(_) => debug!(operation, duration_ms, "Database query completed"),
        Err(e) => warn!(operation, duration_ms, error = %e, "Database query failed"),
    }

    result
}
