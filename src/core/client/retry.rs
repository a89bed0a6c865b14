/// Configuration for the automatic retry mechanism.
///
/// `max_attempts` counts every network call, including the first one; the
/// delay inserted after a failed attempt `n` (1-based) is
/// `base_delay * backoff_factor^(n - 1)`.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total number of attempts before the last failure is surfaced.
    pub max_attempts: u32,
    /// The delay after the first failed attempt.
    pub base_delay: std::time::Duration,
    /// The multiplicative factor applied for each subsequent attempt.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: std::time::Duration::from_millis(1000),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Backoff to sleep after failed attempt `attempt` (1-based).
    pub(crate) fn delay_for(&self, attempt: u32) -> std::time::Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.base_delay.mul_f64(self.backoff_factor.powi(exp))
    }
}

/// Defines the behavior of the in-memory cache for an API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache when a fresh entry is present; otherwise fetch
    /// from the network and write the response back. (Default)
    Use,
    /// Always fetch from the network, ignoring any cached entry, and write
    /// the new response to the cache.
    Refresh,
    /// Always fetch from the network; neither read nor write the cache.
    Bypass,
}
