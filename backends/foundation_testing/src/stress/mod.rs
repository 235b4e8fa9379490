//! Runs one closure from many threads at once and tallies the outcome.

use core::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Instant;

mod config;

pub use config::StressConfig;

/// Result of a stress test run.
#[derive(Debug, Clone, PartialEq)]
pub struct StressResult {
    /// Operations that returned `true`.
    pub successes: usize,
    /// Operations that returned `false`.
    pub failures: usize,
    /// Workers that panicked, their remaining iterations never ran.
    pub panicked: usize,
    /// Time from releasing the workers until the last one finished.
    pub duration: Duration,
    pub thread_count: usize,
}

impl StressResult {
    #[must_use]
    pub const fn total_operations(&self) -> usize {
        self.successes + self.failures
    }

    /// Ratio of successful operations, between 0.0 and 1.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_operations() == 0 {
            0.0
        } else {
            self.successes as f64 / self.total_operations() as f64
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn operations_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.total_operations() as f64 / secs
        }
    }

    /// True when every operation succeeded and no worker panicked.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures == 0 && self.panicked == 0
    }
}

/// [`StressHarness`] spawns `threads` scoped workers which all wait on a
/// shared barrier before their first iteration, so contention starts at
/// the same instant on every thread.
///
/// Workers are scoped, the operation may borrow state owned by the
/// caller.
pub struct StressHarness {
    config: StressConfig,
}

impl StressHarness {
    #[must_use]
    pub const fn new(config: StressConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Calls `operation(thread_id, iteration)` for every iteration of
    /// every worker, `true` counts as a success.
    ///
    /// A panicking operation ends its worker only, it is reported through
    /// [`StressResult::panicked`].
    pub fn run<F>(&self, operation: F) -> StressResult
    where
        F: Fn(usize, usize) -> bool + Sync,
    {
        let thread_count = self.config.get_thread_count();
        let iterations = self.config.get_iterations();
        let time_limit = self.config.get_time_limit();

        let successes = AtomicUsize::new(0);
        let failures = AtomicUsize::new(0);
        let start_line = Barrier::new(thread_count + 1);

        let (panicked, duration) = thread::scope(|scope| {
            let workers: Vec<_> = (0..thread_count)
                .map(|thread_id| {
                    let operation = &operation;
                    let successes = &successes;
                    let failures = &failures;
                    let start_line = &start_line;

                    scope.spawn(move || {
                        start_line.wait();
                        let started = Instant::now();

                        for iteration in 0..iterations {
                            if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                                break;
                            }

                            if operation(thread_id, iteration) {
                                successes.fetch_add(1, Ordering::Relaxed);
                            } else {
                                failures.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    })
                })
                .collect();

            start_line.wait();
            let started = Instant::now();

            let panicked = workers
                .into_iter()
                .map(thread::ScopedJoinHandle::join)
                .filter(Result::is_err)
                .count();

            (panicked, started.elapsed())
        });

        let result = StressResult {
            successes: successes.into_inner(),
            failures: failures.into_inner(),
            panicked,
            duration,
            thread_count,
        };

        tracing::info!(
            threads = result.thread_count,
            successes = result.successes,
            failures = result.failures,
            panicked = result.panicked,
            elapsed_ms = result.duration.as_millis(),
            "stress run finished"
        );

        result
    }
}
