// Crate implementing thread based concurrency primitives on top of
// [`ewe_channels`].
//
// - [`GuardedCounter`] a keyed counter safe to share between threads.
// - [`ParallelAggregator`] fans a summation out to worker threads and
//   joins their partial sums.
// - [`BoundedGenerator`] a producer thread emitting a fixed number of
//   values into a channel it closes once done.
// - [`multiplexer::Multiplexer`] a select loop over periodic timers,
//   deadlines and channels.

mod aggregator;
mod counter;
mod errors;
mod generator;
pub mod multiplexer;

pub use aggregator::*;
pub use counter::*;
pub use errors::*;
pub use generator::*;
