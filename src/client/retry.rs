use std::time::Duration;

use crate::domain::HttpMethod;

const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(250);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Bounded exponential backoff for transient failures.
///
/// Only network failures and 5xx responses are retried. `GET` requests retry
/// by default; `POST` and `DELETE` retry only after
/// [`RetryPolicy::retry_non_idempotent`] is enabled, because repeating them
/// may repeat their side effects.
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    retry_non_idempotent: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            retry_non_idempotent: false,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` extra attempts and default delays.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Delay before the first retry; doubles on each further retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Upper bound for a single backoff delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Allow retrying `POST` and `DELETE` requests.
    pub fn retry_non_idempotent(mut self, enabled: bool) -> Self {
        self.retry_non_idempotent = enabled;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub(crate) fn set_max_retries(&mut self, max_retries: u32) {
        self.max_retries = max_retries;
    }

    /// Backoff before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Whether a request that already failed `failed_attempts` times may be sent again.
    pub(crate) fn allows(&self, method: HttpMethod, failed_attempts: u32) -> bool {
        (method.is_idempotent() || self.retry_non_idempotent) && failed_attempts <= self.max_retries
    }
}
