use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per endpoint, counting the first send.
    pub max_attempts: u32,
    /// Generic failures wait `backoff_unit * 2^attempt`.
    pub backoff_unit: Duration,
    /// 429 responses without a hint wait `rate_limit_unit * 2^attempt`.
    pub rate_limit_unit: Duration,
    pub max_rate_limit_delay: Duration,
    pub cold_start_default: Duration,
    pub max_cold_start_wait: Duration,
    /// Cold-start waits allowed per call before a 503 counts as an attempt.
    pub max_cold_start_waits: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
            rate_limit_unit: Duration::from_secs(5),
            max_rate_limit_delay: Duration::from_secs(60),
            cold_start_default: Duration::from_secs(20),
            max_cold_start_wait: Duration::from_secs(60),
            max_cold_start_waits: 5,
        }
    }
}

impl RetryPolicy {
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn rate_limit_delay(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        hint.unwrap_or_else(|| {
            self.rate_limit_unit
                .saturating_mul(2u32.saturating_pow(attempt))
        })
        .min(self.max_rate_limit_delay)
    }

    pub fn cold_start_delay(&self, hint: Option<Duration>) -> Duration {
        hint.unwrap_or(self.cold_start_default)
            .min(self.max_cold_start_wait)
    }
}
