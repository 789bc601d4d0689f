//! Transport-level retry policy.

use std::time::Duration;

use reqwest::Method;

/// How one attempt ended, as far as the retry policy cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The server answered with this status.
    Status(u16),
    /// No answer arrived: connect failure, reset, or timeout.
    NetworkFailure,
}

/// When and how often [`HttpTransport`](super::HttpTransport) repeats a
/// request.
///
/// Only verbs that are idempotent under RFC 9110 (GET, HEAD, PUT, DELETE,
/// OPTIONS, TRACE) are ever repeated; a POST or PATCH is sent exactly once
/// whatever happens. Disabled unless `max_retries` is non-zero, which the
/// [`no_retry`](Self::no_retry) policy used by default guarantees.
///
/// ```
/// use checkout_api::RetryConfig;
/// use checkout_api::transport::config::AttemptOutcome;
/// use reqwest::Method;
/// use std::time::Duration;
///
/// let policy = RetryConfig::default().with_initial_backoff(Duration::from_millis(100));
/// assert_eq!(
///     policy.next_backoff(&Method::GET, 1, AttemptOutcome::Status(503)),
///     Some(Duration::from_millis(200))
/// );
/// assert_eq!(policy.next_backoff(&Method::POST, 0, AttemptOutcome::NetworkFailure), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Repeats allowed after the first attempt
    pub max_retries: u32,
    /// Wait before the first repeat; doubled for each further one
    pub initial_backoff: Duration,
    /// Upper bound on any single wait
    pub max_backoff: Duration,
    /// Answers treated as transient
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    /// Three repeats starting at 500ms, on 429 and gateway failures.
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            retry_statuses: vec![429, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Policy that sends every request once.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Allow `max` repeats.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Wait `duration` before the first repeat.
    pub fn with_initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    /// Never wait longer than `duration`.
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Treat exactly these statuses as transient.
    pub fn with_retry_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.retry_statuses = statuses;
        self
    }

    /// Wait before repeat number `attempt + 1`, capped at `max_backoff`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let initial = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let cap = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        let millis = initial.saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(millis.min(cap))
    }

    /// Returns `true` if `status` is one of the transient statuses.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Returns `true` if this policy may repeat a request sent with `method`.
    pub fn is_retryable_method(&self, method: &Method) -> bool {
        self.max_retries > 0 && method.is_idempotent()
    }

    /// The wait before repeating a request whose attempt number `attempt`
    /// (zero-based) ended with `outcome`, or `None` to give up.
    pub fn next_backoff(
        &self,
        method: &Method,
        attempt: u32,
        outcome: AttemptOutcome,
    ) -> Option<Duration> {
        if !self.is_retryable_method(method) || attempt >= self.max_retries {
            return None;
        }
        match outcome {
            AttemptOutcome::Status(status) if !self.should_retry_status(status) => None,
            _ => Some(self.backoff_for_attempt(attempt)),
        }
    }
}
