// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Bounded retry loop with exponential backoff.
///
/// Used to poll contributor stats that GitHub is still computing and to
/// repeat the README fetch-splice-commit cycle when a commit is rejected.
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Error;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone,)]
pub struct RetryConfig
{
    /// Maximum number of retry attempts (default: 3).
    pub max_attempts:     u32,
    /// Initial delay between retries in milliseconds (default: 1000).
    pub initial_delay_ms: u64,
    /// Multiplier for exponential backoff (default: 2.0).
    pub backoff_factor:   f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, initial_delay_ms: 1000, backoff_factor: 2.0,
        }
    }
}

impl RetryConfig
{
    /// Configuration with a short, fixed delay, handy for polling.
    pub fn polling(max_attempts: u32, delay_ms: u64,) -> Self
    {
        Self {
            max_attempts: max_attempts.max(1,), initial_delay_ms: delay_ms, backoff_factor: 1.0,
        }
    }
}

/// Executes an async operation with exponential backoff retry logic.
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays)
/// * `operation_name` - Name of the operation for logging
/// * `f` - Async function to retry
///
/// # Errors
///
/// Returns the last error encountered if all retry attempts fail.
///
/// # Example
///
/// ```no_run
/// use hml::{Error, RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let result = retry_with_backoff(&config, "fetch data", || async {
///     // Some API call that might fail
///     Ok::<_, Error,>(42,)
/// },)
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T,>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, Error,>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error,>,>,
{
    let max_attempts = config.max_attempts.max(1,);
    let mut attempt = 1;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match f().await {
            Ok(result,) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result,);
            }
            Err(error,) => {
                if attempt >= max_attempts {
                    warn!("{} failed after {} attempts: {}", operation_name, max_attempts, error);
                    return Err(error,);
                }

                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name, attempt, max_attempts, error, delay_ms
                );

                sleep(Duration::from_millis(delay_ms,),).await;
                delay_ms = (delay_ms as f64 * config.backoff_factor) as u64;
                attempt += 1;
            }
        }
    }
}
