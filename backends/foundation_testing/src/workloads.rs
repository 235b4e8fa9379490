//! Contention workloads over the concurrency primitives.

use std::thread;

use ewe_channels::bounded;
use ewe_concurrency::GuardedCounter;

use crate::{StressConfig, StressHarness, StressResult};

/// Outcome of [`counter_contention`].
#[derive(Debug, Clone)]
pub struct CounterContention {
    pub stress: StressResult,
    /// Sum of all counts once the run finished.
    pub total: u64,
    pub keys: usize,
}

impl CounterContention {
    /// True when no increment got lost.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stress.is_clean() && self.total == self.stress.successes as u64
    }
}

/// Every worker increments one of `keys` keys per iteration on a shared
/// [`GuardedCounter`], picking the key from its thread and iteration.
#[must_use]
pub fn counter_contention(config: StressConfig, keys: usize) -> CounterContention {
    let keys = keys.max(1);
    let names: Vec<String> = (0..keys).map(|index| format!("key-{index}")).collect();
    let counter = GuardedCounter::new();

    let stress = StressHarness::new(config).run(|thread_id, iteration| {
        counter.increment(&names[(thread_id + iteration) % keys]);
        true
    });

    let snapshot = counter.snapshot();
    CounterContention {
        stress,
        total: snapshot.values().sum(),
        keys: snapshot.len(),
    }
}

/// Outcome of [`channel_fan_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanIn {
    pub sent: usize,
    pub received: usize,
    /// Sum of every received value, compare with [`expected_fan_in_sum`].
    pub checksum: u64,
}

/// `producers` threads each send `per_producer` values into one bounded
/// channel of `capacity` while the calling thread drains it until every
/// producer closed its handle.
#[must_use]
pub fn channel_fan_in(producers: usize, per_producer: usize, capacity: usize) -> FanIn {
    let (sender, receiver) = bounded::<u64>(capacity);

    thread::scope(|scope| {
        let senders: Vec<_> = (0..producers)
            .map(|producer| {
                let sender = sender.clone();
                scope.spawn(move || {
                    let mut sent = 0;
                    for value in 0..per_producer {
                        if sender.block_send((producer * per_producer + value) as u64).is_err() {
                            break;
                        }
                        sent += 1;
                    }
                    sender.close();
                    sent
                })
            })
            .collect();
        sender.close();

        let mut received = 0;
        let mut checksum = 0_u64;
        for value in receiver {
            received += 1;
            checksum += value;
        }

        let sent = senders
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .sum();

        tracing::debug!(producers, sent, received, "fan-in drained");
        FanIn {
            sent,
            received,
            checksum,
        }
    })
}

/// Checksum [`channel_fan_in`] reports when nothing got lost, the sum of
/// `0..producers * per_producer`.
#[must_use]
pub fn expected_fan_in_sum(producers: usize, per_producer: usize) -> u64 {
    let n = (producers * per_producer) as u64;
    n * n.saturating_sub(1) / 2
}
