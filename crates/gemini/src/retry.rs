//! Bounded retries with exponential backoff around a generation call.
//!
//! Every failure mode of a single call (non-2xx, malformed body,
//! missing image payload) is retryable. After the configured attempt
//! budget is spent the last error is returned as a terminal
//! [`GenerateError::Exhausted`]; nothing above this function retries
//! again. The backoff sleep suspends only the calling task; unrelated
//! generation calls keep running.

use std::time::Duration;

use crate::api::GeminiApiError;
use crate::service::{GenerateRequest, GenerateService, GeneratedImage};

/// Tunable parameters for the retry strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt budget, including the first call. Values below 1
    /// are treated as 1; the service is always called at least once.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Delay before attempt `completed + 1`, given `completed` failed
/// attempts so far: `base * 2^(completed-1)`, clamped to
/// [`RetryConfig::max_delay`]. The sequence is 1s, 2s, 4s, … for the
/// default base.
pub fn backoff_delay(completed: u32, config: &RetryConfig) -> Duration {
    let exponent = completed.saturating_sub(1).min(31);
    let factor = 1u64 << exponent;
    let millis = (config.base_delay.as_millis() as u64).saturating_mul(factor);
    Duration::from_millis(millis).min(config.max_delay)
}

/// Progress notification handed to the retry observer before each
/// backoff sleep. Reporting only: observers cannot affect control
/// flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryNotice {
    /// The attempt that just failed (1-based).
    pub attempt: u32,
    /// Total attempt budget.
    pub max_attempts: u32,
    /// How long the task will sleep before the next attempt.
    pub delay: Duration,
}

/// Terminal failure of a logical generation request.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// All attempts failed; carries the last underlying error.
    #[error("Generation failed after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        #[source]
        last_error: GeminiApiError,
    },
}

/// Call `service` with bounded retries and exponential backoff.
///
/// Makes at most `config.max_attempts` calls; a logical request is
/// never multiplied beyond its budget, since each call may consume
/// quota. `on_retry` is invoked once per failed non-final attempt,
/// before the sleep.
pub async fn generate_with_retry(
    service: &dyn GenerateService,
    request: &GenerateRequest,
    config: &RetryConfig,
    on_retry: Option<&(dyn Fn(RetryNotice) + Send + Sync)>,
) -> Result<GeneratedImage, GenerateError> {
    let max_attempts = config.max_attempts.max(1);
    let mut last_error: Option<GeminiApiError> = None;

    for attempt in 1..=max_attempts {
        tracing::debug!(
            request_id = %request.id,
            attempt,
            max_attempts,
            "Generation attempt",
        );

        match service.generate(request).await {
            Ok(image) => {
                tracing::info!(
                    request_id = %request.id,
                    attempt,
                    "Image generated",
                );
                return Ok(image);
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request.id,
                    attempt,
                    max_attempts,
                    error = %e,
                    "Generation attempt failed",
                );
                last_error = Some(e);
            }
        }

        if attempt < max_attempts {
            let delay = backoff_delay(attempt, config);
            if let Some(observer) = on_retry {
                observer(RetryNotice {
                    attempt,
                    max_attempts,
                    delay,
                });
            }
            tokio::time::sleep(delay).await;
        }
    }

    // Loop ran at least once, so an error is always present here.
    let last_error = last_error.unwrap_or(GeminiApiError::MissingImage);
    tracing::error!(
        request_id = %request.id,
        attempts = max_attempts,
        error = %last_error,
        "All generation attempts failed",
    );
    Err(GenerateError::Exhausted {
        attempts: max_attempts,
        last_error,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;

    /// Fails the first `failures` calls, then succeeds.
    struct FlakyService {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyService {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerateService for FlakyService {
        async fn generate(
            &self,
            _request: &GenerateRequest,
        ) -> Result<GeneratedImage, GeminiApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(GeminiApiError::Api {
                    status: 503,
                    body: "overloaded".to_string(),
                })
            } else {
                Ok(GeneratedImage {
                    mime_type: "image/png".to_string(),
                    data: vec![0xAB],
                })
            }
        }
    }

    // -- backoff_delay --

    #[test]
    fn backoff_doubles_per_completed_attempt() {
        let config = RetryConfig::default();
        assert_eq!(backoff_delay(1, &config), Duration::from_secs(1));
        assert_eq!(backoff_delay(2, &config), Duration::from_secs(2));
        assert_eq!(backoff_delay(3, &config), Duration::from_secs(4));
    }

    #[test]
    fn backoff_clamps_at_max_delay() {
        let config = RetryConfig::default();
        assert_eq!(backoff_delay(10, &config), Duration::from_secs(30));
    }

    #[test]
    fn backoff_with_scaled_base() {
        let config = RetryConfig {
            base_delay: Duration::from_millis(10),
            ..Default::default()
        };
        assert_eq!(backoff_delay(1, &config), Duration::from_millis(10));
        assert_eq!(backoff_delay(3, &config), Duration::from_millis(40));
    }

    // -- generate_with_retry --

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_with_two_notices() {
        let service = FlakyService::new(2);
        let request = GenerateRequest::new("prompt");
        let config = RetryConfig::default();
        let notices: Mutex<Vec<RetryNotice>> = Mutex::new(Vec::new());

        let observer = |notice: RetryNotice| notices.lock().unwrap().push(notice);
        let result =
            generate_with_retry(&service, &request, &config, Some(&observer)).await;

        assert!(result.is_ok());
        assert_eq!(service.calls(), 3);

        let notices = notices.into_inner().unwrap();
        assert_eq!(
            notices,
            vec![
                RetryNotice {
                    attempt: 1,
                    max_attempts: 3,
                    delay: Duration::from_millis(1000),
                },
                RetryNotice {
                    attempt: 2,
                    max_attempts: 3,
                    delay: Duration::from_millis(2000),
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_service_makes_exactly_n_attempts() {
        let service = FlakyService::new(u32::MAX);
        let request = GenerateRequest::new("prompt");
        let config = RetryConfig {
            max_attempts: 4,
            ..Default::default()
        };

        let result = generate_with_retry(&service, &request, &config, None).await;

        assert_eq!(service.calls(), 4);
        assert_matches!(
            result,
            Err(GenerateError::Exhausted { attempts: 4, .. })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_never_notifies() {
        let service = FlakyService::new(0);
        let request = GenerateRequest::new("prompt");
        let notices: Mutex<Vec<RetryNotice>> = Mutex::new(Vec::new());

        let observer = |notice: RetryNotice| notices.lock().unwrap().push(notice);
        let result = generate_with_retry(
            &service,
            &request,
            &RetryConfig::default(),
            Some(&observer),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(service.calls(), 1);
        assert!(notices.into_inner().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempt_budget_still_calls_once() {
        let service = FlakyService::new(u32::MAX);
        let request = GenerateRequest::new("prompt");
        let config = RetryConfig {
            max_attempts: 0,
            ..Default::default()
        };

        let result = generate_with_retry(&service, &request, &config, None).await;
        assert_eq!(service.calls(), 1);
        assert_matches!(result, Err(GenerateError::Exhausted { attempts: 1, .. }));
    }
}
