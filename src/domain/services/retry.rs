#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ApiError;
use crate::domain::models::ApiResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> RetryPolicy {
        return RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        };
    }
}

impl RetryPolicy {
    pub fn from_config() -> Result<RetryPolicy> {
        let max_attempts = u32::try_from(Config::get_u64(ConfigKey::RetryAttempts)?)?;
        return Ok(RetryPolicy {
            max_attempts,
            base_delay: Config::get_duration(ConfigKey::RetryDelay)?,
        });
    }

    /// Delay slept after the given failed attempt, counting from 1.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        return self.base_delay.saturating_mul(2u32.pow(exponent));
    }
}

/// True when the message carries a standalone 4xx status token, such as
/// "Request failed with status code 404".
pub fn is_client_error(message: &str) -> bool {
    return message
        .split(|c: char| return !c.is_ascii_alphanumeric())
        .filter(|token| return token.len() == 3)
        .filter_map(|token| return token.parse::<u16>().ok())
        .any(|code| return (400..500).contains(&code));
}

fn is_retryable(err: &ApiError) -> bool {
    if let Some(status) = err.status() {
        if (400..500).contains(&status) {
            return false;
        }
    }

    return !is_client_error(err.message());
}

/// Runs `call` until it succeeds, fails with a client error, or exhausts
/// `policy.max_attempts`. The delay doubles after every failed attempt and the
/// last error is returned once attempts run out.
pub async fn retry_api_call<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match call().await {
            Ok(res) => return Ok(res),
            Err(err) => err,
        };

        if !is_retryable(&err) || attempt >= max_attempts {
            return Err(err);
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            attempt = attempt,
            max_attempts = max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = err.message(),
            "Retrying API call"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
