//! Service configuration.

use std::time::Duration;

/// Tunables for the market service.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Platform commission in basis points (1000 = 10%).
    pub platform_fee_bps: u32,
    /// Bounded wait for a per-order lock before failing with `Conflict`.
    pub lock_timeout: Duration,
    /// How many times a retryable failure is retried before propagating.
    pub conflict_retries: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            platform_fee_bps: 1_000,
            lock_timeout: Duration::from_secs(5),
            conflict_retries: 1,
        }
    }
}

impl MarketConfig {
    /// Sets the platform fee in basis points.
    #[must_use]
    pub const fn with_platform_fee_bps(mut self, bps: u32) -> Self {
        self.platform_fee_bps = bps;
        self
    }

    /// Sets the per-order lock acquisition timeout.
    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Sets the bounded retry count for retryable failures.
    #[must_use]
    pub const fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fee_is_ten_percent() {
        let config = MarketConfig::default();
        assert_eq!(config.platform_fee_bps, 1_000);
        assert_eq!(config.conflict_retries, 1);
    }

    #[test]
    fn builder_overrides() {
        let config = MarketConfig::default()
            .with_platform_fee_bps(250)
            .with_lock_timeout(Duration::from_millis(50))
            .with_conflict_retries(3);
        assert_eq!(config.platform_fee_bps, 250);
        assert_eq!(config.lock_timeout, Duration::from_millis(50));
        assert_eq!(config.conflict_retries, 3);
    }
}
