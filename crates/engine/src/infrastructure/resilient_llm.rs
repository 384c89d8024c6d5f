//! Resilient LLM client wrapper with exponential backoff retry
//!
//! Wraps any LlmPort implementation with retry logic to handle transient failures.

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Base delay in milliseconds before first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) for randomizing delays to prevent thundering herd
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
            max_delay_ms: 15000,
            jitter_factor: 0.2,
        }
    }
}

/// Wrapper that adds retry logic to any LLM client
pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    /// Create a new resilient wrapper around an existing LLM client
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Calculate delay for a given attempt number using exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }

    /// Determine if an error is retryable
    fn is_retryable(error: &LlmError) -> bool {
        match error {
            // Network/request failures are typically transient, but auth
            // errors and bad requests will not heal with retries
            LlmError::RequestFailed(msg) => {
                !msg.contains("401")
                    && !msg.contains("403")
                    && !msg.contains("400")
                    && !msg.contains("Invalid")
            }
            // Malformed responses can be transient provider hiccups
            LlmError::InvalidResponse(_) => true,
        }
    }

    async fn retry<F, Fut, T>(&self, operation_name: &str, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, LlmError>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.calculate_delay(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay,
                    "Retrying LLM request"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match op().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !Self::is_retryable(&e) {
                        return Err(e);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::RequestFailed("Retry budget exhausted".to_string())))
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.retry("complete", || self.inner.complete(request.clone()))
            .await
    }

    async fn title_for(&self, first_message: &str) -> Result<String, LlmError> {
        self.retry("title_for", || self.inner.title_for(first_message))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockLlmPort;

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 2,
            jitter_factor: 0.0,
        }
    }

    fn ok_response() -> LlmResponse {
        LlmResponse {
            content: "Greetings, traveler.".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            usage: None,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failure() {
        let mut inner = MockLlmPort::new();
        let mut calls = 0u32;
        inner.expect_complete().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(LlmError::RequestFailed("connection reset".to_string()))
            } else {
                Ok(ok_response())
            }
        });

        let client = ResilientLlmClient::new(Arc::new(inner), fast_config(2));
        let result = client
            .complete(LlmRequest::new(vec![]))
            .await
            .expect("should recover");
        assert_eq!(result.content, "Greetings, traveler.");
    }

    #[tokio::test]
    async fn does_not_retry_auth_errors() {
        let mut inner = MockLlmPort::new();
        inner
            .expect_complete()
            .times(1)
            .returning(|_| Err(LlmError::RequestFailed("401 Unauthorized".to_string())));

        let client = ResilientLlmClient::new(Arc::new(inner), fast_config(3));
        let result = client.complete(LlmRequest::new(vec![])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn gives_up_after_budget_exhausted() {
        let mut inner = MockLlmPort::new();
        inner
            .expect_complete()
            .times(3)
            .returning(|_| Err(LlmError::RequestFailed("timeout".to_string())));

        let client = ResilientLlmClient::new(Arc::new(inner), fast_config(2));
        let result = client.complete(LlmRequest::new(vec![])).await;
        assert!(result.is_err());
    }
}
