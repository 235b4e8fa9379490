//! Stress testing infrastructure for the ewe concurrency primitives.
//!
//! - [`StressHarness`] hammers a closure from many threads released at
//!   the same instant and counts how often it reported success.
//! - [`workloads`] ready made contention runs over
//!   [`ewe_concurrency::GuardedCounter`] and bounded channels.
//!
//! ```rust
//! use foundation_testing::{StressConfig, StressHarness};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let counter = AtomicUsize::new(0);
//! let harness = StressHarness::new(StressConfig::new().threads(10).iterations(1000));
//!
//! let result = harness.run(|_thread_id, _iteration| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//!     true
//! });
//!
//! assert_eq!(result.successes, 10_000);
//! assert_eq!(counter.load(Ordering::Relaxed), 10_000);
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod stress;
pub mod workloads;

pub use stress::{StressConfig, StressHarness, StressResult};
