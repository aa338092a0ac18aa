//! Harvest run configuration.
//!
//! One value threaded through every engine run. Defaults mirror the timing
//! the engines were tuned against; the builder methods exist mainly so tests
//! can shrink the waits.

use std::time::Duration;

use crate::engine::types::{
    POLL_INTERVAL, RESULTS_WAIT, SETTLE_DELAY, STAGNATION_LIMIT,
};

/// Settings shared by every engine during a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    headless: bool,
    results_wait: Duration,
    poll_interval: Duration,
    settle_delay: Duration,
    stagnation_limit: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            // Interactive pages (consent walls, CAPTCHAs) make headed the
            // safer default; callers opt in to headless.
            headless: false,
            results_wait: RESULTS_WAIT,
            poll_interval: POLL_INTERVAL,
            settle_delay: SETTLE_DELAY,
            stagnation_limit: STAGNATION_LIMIT,
        }
    }
}

impl HarvestConfig {
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn with_results_wait(mut self, wait: Duration) -> Self {
        self.results_wait = wait;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn with_stagnation_limit(mut self, limit: u32) -> Self {
        self.stagnation_limit = limit;
        self
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Upper bound on waiting for a results container to appear.
    #[must_use]
    pub fn results_wait(&self) -> Duration {
        self.results_wait
    }

    /// Spacing between condition checks inside bounded waits.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Pause after each pagination action before re-reading the page.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Consecutive no-progress cycles tolerated before an engine stops.
    #[must_use]
    pub fn stagnation_limit(&self) -> u32 {
        self.stagnation_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_headed_with_tuned_timings() {
        let config = HarvestConfig::default();
        assert!(!config.headless());
        assert_eq!(config.results_wait(), Duration::from_secs(12));
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.settle_delay(), Duration::from_millis(600));
        assert_eq!(config.stagnation_limit(), 3);
    }

    #[test]
    fn test_builders_override_individual_fields() {
        let config = HarvestConfig::default()
            .with_headless(true)
            .with_results_wait(Duration::from_secs(1))
            .with_stagnation_limit(5);
        assert!(config.headless());
        assert_eq!(config.results_wait(), Duration::from_secs(1));
        assert_eq!(config.stagnation_limit(), 5);
        // Untouched fields keep their defaults.
        assert_eq!(config.settle_delay(), Duration::from_millis(600));
    }
}
