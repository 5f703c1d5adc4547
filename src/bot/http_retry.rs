//! Retry wrapper for bot API requests
//!
//! Retries 429 and 5xx gateway errors with exponential backoff plus jitter,
//! preferring the server's `Retry-After` seconds when present. Any other
//! status is returned to the caller on the first attempt. POST requests
//! are never repeated.

use reqwest::{Client, Request, Response, StatusCode};
use std::time::Duration;

/// Upper bound applied to `Retry-After`
const MAX_RETRY_AFTER_SECS: u64 = 300;

/// Retry behaviour for [`send_with_retry`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one (0 disables retrying)
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Backoff for the given zero-based retry, capped, with 10-30% jitter
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let capped = exp.min(self.max_delay);
        capped.mul_f64(1.1 + rand::random::<f64>() * 0.2)
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn is_idempotent(method: &reqwest::Method) -> bool {
    *method != reqwest::Method::POST
}

fn retry_after(response: &Response) -> Option<Duration> {
    let value = response.headers().get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    let secs = value.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
}

/// Execute `request`, retrying transient failures according to `policy`.
///
/// POST requests and requests with streaming bodies are sent once.
pub async fn send_with_retry(
    client: &Client,
    request: Request,
    policy: &RetryPolicy,
) -> Result<Response, reqwest::Error> {
    let retries = if is_idempotent(request.method()) { policy.max_retries } else { 0 };
    let mut pending = request;
    let mut attempt = 0;

    loop {
        let spare = if attempt < retries { pending.try_clone() } else { None };
        let method = pending.method().clone();
        let url = pending.url().clone();
        let response = client.execute(pending).await?;

        if !is_retryable(response.status()) {
            return Ok(response);
        }
        let Some(next) = spare else {
            return Ok(response);
        };

        let delay = retry_after(&response).unwrap_or_else(|| policy.delay_for(attempt));
        tracing::debug!(
            "{} {} returned {}, retry {}/{} in {:?}",
            method,
            url,
            response.status(),
            attempt + 1,
            retries,
            delay
        );
        tokio::time::sleep(delay).await;

        pending = next;
        attempt += 1;
    }
}
