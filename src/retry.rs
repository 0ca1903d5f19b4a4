use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Initial delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles the delay each time)
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset: CMS content requests (3 attempts)
    /// Delays: 500ms, 1s = 1.5s total wait time
    pub fn cms_request() -> Self {
        Self::new(3, Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(4))
            .with_backoff_multiplier(2.0)
    }

    /// Preset: a single attempt, no retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay before the next try after `attempt` failed attempts
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::cms_request()
    }
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or `config.max_attempts` is used up.
///
/// A missing story or a rejected query fails on the first attempt; network
/// errors and 5xx responses are tried again. A `max_attempts` of 0 still makes
/// one attempt. The last error is returned unchanged.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let attempts = config.max_attempts.max(1);
    let mut failures: u32 = 0;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if failures > 0 {
                    debug!("{}: recovered after {} failed attempts", operation_name, failures);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !should_retry(&error) {
            debug!("{}: not retrying: {}", operation_name, error);
            return Err(error);
        }

        failures += 1;
        if failures >= attempts {
            warn!(
                "{}: giving up after {} attempts, last error: {}",
                operation_name, attempts, error
            );
            return Err(error);
        }

        let delay = config.delay_for_attempt(failures);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            operation_name, failures, attempts, error, delay
        );
        sleep(delay).await;
    }
}
