// Implements fan-out/fan-in summation over contiguous partitions.
//
// Every partition is summed by its own worker thread which hands its
// partial result to the coordinator over a shared rendezvous channel.
// The coordinator keeps no sender of its own, so once all workers are
// gone the channel closes and a missing partial result is reported
// instead of waited on forever.

use std::iter::Sum;
use std::ops::Range;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ewe_channels::{rendezvous, ChannelError, ReceiveChannel};
use ewe_config::AggregatorConfig;

use crate::{AggregateError, AggregateResult};

/// Splits `0..len` into `partitions` contiguous ranges that cover every
/// index exactly once. Range sizes differ by at most one, the leading
/// ranges take the remainder. Ranges are empty when `partitions > len`.
#[must_use]
pub fn partition_ranges(len: usize, partitions: usize) -> Vec<Range<usize>> {
    if partitions == 0 {
        return Vec::new();
    }

    let base = len / partitions;
    let remainder = len % partitions;

    let mut start = 0;
    (0..partitions)
        .map(|index| {
            let size = base + usize::from(index < remainder);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

/// Sums `data` with one worker per partition.
///
/// Partial results arrive in any order, the reduction does not depend
/// on it.
///
/// # Errors
///
/// [`AggregateError::NoPartitions`] when `partitions` is zero,
/// [`AggregateError::WorkerLost`] when a worker died before sending.
pub fn sum_concurrently<T, D>(data: D, partitions: usize) -> AggregateResult<T>
where
    T: Copy + Send + Sync + Sum<T> + 'static,
    D: Into<Arc<[T]>>,
{
    ParallelAggregator::new(partitions).sum(data)
}

/// Same as [`sum_concurrently`] but gives up waiting for partial
/// results once `budget` has elapsed.
///
/// # Errors
///
/// Additionally returns [`AggregateError::TimedOut`] when the budget ran
/// out first. Workers still running are left to finish on their own.
pub fn sum_concurrently_within<T, D>(
    data: D,
    partitions: usize,
    budget: Duration,
) -> AggregateResult<T>
where
    T: Copy + Send + Sync + Sum<T> + 'static,
    D: Into<Arc<[T]>>,
{
    ParallelAggregator::new(partitions)
        .with_budget(budget)
        .sum(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelAggregator {
    partitions: usize,
    budget: Option<Duration>,
}

impl Default for ParallelAggregator {
    fn default() -> Self {
        Self::from_config(&AggregatorConfig::default())
    }
}

impl ParallelAggregator {
    #[must_use]
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions,
            budget: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &AggregatorConfig) -> Self {
        Self {
            partitions: config.partitions,
            budget: config.budget,
        }
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    #[must_use]
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// Sums `data` across the configured partitions.
    ///
    /// # Errors
    ///
    /// See [`sum_concurrently`] and [`sum_concurrently_within`].
    pub fn sum<T, D>(&self, data: D) -> AggregateResult<T>
    where
        T: Copy + Send + Sync + Sum<T> + 'static,
        D: Into<Arc<[T]>>,
    {
        if self.partitions == 0 {
            return Err(AggregateError::NoPartitions);
        }

        let data: Arc<[T]> = data.into();
        let deadline = self
            .budget
            .and_then(|budget| Instant::now().checked_add(budget));

        let (sender, receiver) = rendezvous::<T>();
        for (index, range) in partition_ranges(data.len(), self.partitions)
            .into_iter()
            .enumerate()
        {
            let data = Arc::clone(&data);
            let sender = sender.clone();

            thread::Builder::new()
                .name(format!("aggregator-worker-{index}"))
                .spawn(move || {
                    let items = range.len();
                    let partial: T = data[range].iter().copied().sum();
                    tracing::debug!(worker = index, items, "partial sum ready");

                    if sender.block_send(partial).is_err() {
                        tracing::debug!(worker = index, "coordinator stopped receiving");
                    }
                })?;
        }

        // only workers hold senders from here on
        sender.close();

        let partials = collect_partials(receiver, self.partitions, deadline)?;
        Ok(partials.into_iter().sum())
    }
}

fn collect_partials<T>(
    mut receiver: ReceiveChannel<T>,
    expected: usize,
    deadline: Option<Instant>,
) -> AggregateResult<Vec<T>> {
    let mut partials = Vec::with_capacity(expected);

    while partials.len() < expected {
        let received = match deadline {
            Some(deadline) => receiver.receive_deadline(deadline),
            None => receiver.block_receive(),
        };

        match received {
            Ok(partial) => partials.push(partial),
            Err(ChannelError::TimedOut) => {
                tracing::warn!(
                    received = partials.len(),
                    expected,
                    "aggregation budget elapsed"
                );
                return Err(AggregateError::TimedOut {
                    received: partials.len(),
                    expected,
                });
            }
            Err(_) => {
                tracing::warn!(
                    received = partials.len(),
                    expected,
                    "aggregation workers exited without sending"
                );
                return Err(AggregateError::WorkerLost {
                    received: partials.len(),
                    expected,
                });
            }
        }
    }

    Ok(partials)
}
