//! Shared HTTP retry helper for the external API adapters.

use std::time::Duration;

/// Bounded-attempt retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 2_000,
        }
    }
}

fn should_retry_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Delay before the next attempt. A parseable `Retry-After` header wins
/// (capped at 30s), otherwise exponential backoff from the policy base.
fn backoff_delay(
    attempt: u32,
    policy: &RetryPolicy,
    retry_after: Option<&reqwest::header::HeaderValue>,
) -> Duration {
    if let Some(secs) = retry_after
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        return Duration::from_secs(secs.min(30));
    }
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(
        policy
            .base_delay_ms
            .saturating_mul(factor)
            .min(policy.max_delay_ms),
    )
}

/// Send a request, retrying transient failures (timeouts, connect
/// errors, 408/429/5xx) up to the policy's attempt budget. The final
/// response is returned as-is; status handling stays with the caller.
pub async fn send_with_retry(
    request: reqwest::RequestBuilder,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, reqwest::Error> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        // Requests with streaming bodies can't be cloned; send once.
        let Some(cloned) = request.try_clone() else {
            return request.send().await;
        };

        match cloned.send().await {
            Ok(response) => {
                if attempt < attempts && should_retry_status(response.status()) {
                    let delay = backoff_delay(
                        attempt,
                        policy,
                        response.headers().get(reqwest::header::RETRY_AFTER),
                    );
                    log::warn!(
                        "retry {attempt}/{attempts} after HTTP {} (sleeping {delay:?})",
                        response.status()
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Ok(response);
            }
            Err(err) => {
                if attempt < attempts && (err.is_timeout() || err.is_connect()) {
                    let delay = backoff_delay(attempt, policy, None);
                    log::warn!(
                        "retry {attempt}/{attempts} after transport error: {err} (sleeping {delay:?})"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(backoff_delay(1, &policy, None), Duration::from_millis(250));
        assert_eq!(backoff_delay(2, &policy, None), Duration::from_millis(500));
        assert_eq!(backoff_delay(3, &policy, None), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(backoff_delay(10, &policy, None), Duration::from_millis(2000));
    }

    #[test]
    fn test_retry_after_header_wins() {
        let policy = RetryPolicy::default();
        let value = reqwest::header::HeaderValue::from_static("5");
        assert_eq!(
            backoff_delay(1, &policy, Some(&value)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_retry_after_is_capped_at_30s() {
        let policy = RetryPolicy::default();
        let value = reqwest::header::HeaderValue::from_static("600");
        assert_eq!(
            backoff_delay(1, &policy, Some(&value)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_should_retry_status() {
        assert!(should_retry_status(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_status(reqwest::StatusCode::BAD_GATEWAY));
        assert!(!should_retry_status(reqwest::StatusCode::UNAUTHORIZED));
        assert!(!should_retry_status(reqwest::StatusCode::OK));
    }
}
