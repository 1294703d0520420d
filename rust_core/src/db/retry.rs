//! Automatic retry with exponential backoff for transient database failures.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Execute a database operation, retrying transient failures.
pub async fn execute_with_retry<F, Fut, T>(mut f: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_attempts && is_retriable_error(&e) => {
                let backoff_ms = 100_u64 * 2_u64.pow(attempt - 1);
                warn!(
                    "Database operation failed (attempt {}/{}): {}. Retrying in {}ms",
                    attempt, max_attempts, e, backoff_ms
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Connection-level errors are likely transient; constraint and syntax
/// errors are not.
fn is_retriable_error(e: &anyhow::Error) -> bool {
    let err_str = e.to_string().to_lowercase();
    err_str.contains("connection")
        || err_str.contains("timeout")
        || err_str.contains("broken pipe")
        || err_str.contains("deadlock detected")
        || err_str.contains("too many clients")
        || err_str.contains("server closed the connection")
}
