//! Stress test configuration.

use core::time::Duration;

/// Configuration for a [`StressHarness`](super::StressHarness) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressConfig {
    thread_count: usize,
    iterations: usize,
    time_limit: Option<Duration>,
}

impl StressConfig {
    /// Defaults to 4 threads running 1000 iterations each, with no time
    /// limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            thread_count: 4,
            iterations: 1000,
            time_limit: None,
        }
    }

    #[must_use]
    pub const fn threads(mut self, count: usize) -> Self {
        self.thread_count = count;
        self
    }

    #[must_use]
    pub const fn iterations(mut self, count: usize) -> Self {
        self.iterations = count;
        self
    }

    /// Workers stop at their next iteration once `limit` elapsed, the
    /// run then reports fewer operations than
    /// [`StressConfig::planned_operations`].
    #[must_use]
    pub const fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn get_thread_count(&self) -> usize {
        self.thread_count
    }

    #[must_use]
    pub const fn get_iterations(&self) -> usize {
        self.iterations
    }

    #[must_use]
    pub const fn get_time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Operations a run performs when it is not cut short.
    #[must_use]
    pub const fn planned_operations(&self) -> usize {
        self.thread_count.saturating_mul(self.iterations)
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self::new()
    }
}
