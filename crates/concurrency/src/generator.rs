// Implements a producer thread that emits a fixed number of values
// of a recurrence and closes its channel afterwards.

use std::thread::{self, JoinHandle};

use ewe_channels::{bounded, ReceiveChannel, SendChannel};
use ewe_config::GeneratorConfig;

use crate::{GeneratorError, GeneratorResult};

/// A deterministic sequence, each call yields the next value.
pub trait Recurrence: Send + 'static {
    type Item: Send + 'static;

    fn next_value(&mut self) -> Self::Item;
}

/// Fibonacci numbers starting from (0, 1): 0, 1, 1, 2, 3, 5, 8, ...
///
/// Values saturate at `u128::MAX` once the sequence outgrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fibonacci {
    current: u128,
    next: u128,
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::starting_from(0, 1)
    }
}

impl Fibonacci {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_from(first: u128, second: u128) -> Self {
        Self {
            current: first,
            next: second,
        }
    }
}

impl Recurrence for Fibonacci {
    type Item = u128;

    fn next_value(&mut self) -> u128 {
        let value = self.current;
        (self.current, self.next) = (self.next, self.current.saturating_add(self.next));
        value
    }
}

/// Adapts any closure into a [`Recurrence`].
pub struct FnRecurrence<F>(pub F);

impl<F, T> Recurrence for FnRecurrence<F>
where
    F: FnMut() -> T + Send + 'static,
    T: Send + 'static,
{
    type Item = T;

    fn next_value(&mut self) -> T {
        (self.0)()
    }
}

/// Spawns a producer sending exactly `n` Fibonacci numbers before it
/// closes the returned channel. The buffer size comes from the default
/// [`GeneratorConfig`].
///
/// # Errors
///
/// Returns [`GeneratorError::SpawnFailed`] when the producer thread could
/// not be started.
pub fn generate(n: usize) -> GeneratorResult<ReceiveChannel<u128>> {
    let generated = BoundedGenerator::from_config(n, &GeneratorConfig::default())
        .spawn(Fibonacci::new())?;

    let (receiver, _producer) = generated.into_parts();
    Ok(receiver)
}

/// [`BoundedGenerator`] describes how many values a producer emits and
/// how far it may run ahead of its consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedGenerator {
    count: usize,
    capacity: usize,
}

impl BoundedGenerator {
    /// A `capacity` of zero makes every send wait for the consumer.
    #[must_use]
    pub fn new(count: usize, capacity: usize) -> Self {
        Self { count, capacity }
    }

    #[must_use]
    pub fn from_config(count: usize, config: &GeneratorConfig) -> Self {
        Self::new(count, config.capacity)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Starts the producer thread. It owns the only sender of the
    /// channel, so it is the only party able to close it and it does so
    /// right after its last send.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::SpawnFailed`] when the thread could not
    /// be started.
    pub fn spawn<R: Recurrence>(self, recurrence: R) -> GeneratorResult<Generated<R::Item>> {
        let (sender, receiver) = bounded::<R::Item>(self.capacity);
        let count = self.count;

        let producer = thread::Builder::new()
            .name(String::from("bounded-generator"))
            .spawn(move || produce(recurrence, count, sender))?;

        Ok(Generated { receiver, producer })
    }
}

fn produce<R: Recurrence>(mut recurrence: R, count: usize, sender: SendChannel<R::Item>) -> usize {
    for sent in 0..count {
        if sender.block_send(recurrence.next_value()).is_err() {
            tracing::warn!(sent, count, "generator consumer went away, stopping early");
            return sent;
        }
    }

    sender.close();
    tracing::debug!(count, "generator closed its channel");
    count
}

/// The consuming side of a running [`BoundedGenerator`].
///
/// Iterating yields values in generation order until the producer
/// closed the channel.
pub struct Generated<T> {
    receiver: ReceiveChannel<T>,
    producer: JoinHandle<usize>,
}

impl<T> Generated<T> {
    pub fn receiver(&mut self) -> &mut ReceiveChannel<T> {
        &mut self.receiver
    }

    /// Splits into the receiver and the producer's handle, dropping the
    /// handle detaches the producer.
    #[must_use]
    pub fn into_parts(self) -> (ReceiveChannel<T>, JoinHandle<usize>) {
        (self.receiver, self.producer)
    }

    /// Stops consuming and waits for the producer, returning how many
    /// values it sent. Unread values are discarded and a producer still
    /// sending stops at its next send.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::ProducerPanicked`] when the recurrence
    /// panicked.
    pub fn join(self) -> GeneratorResult<usize> {
        let Self { receiver, producer } = self;
        drop(receiver);

        producer.join().map_err(|_| GeneratorError::ProducerPanicked)
    }
}

impl<T> Iterator for Generated<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.next()
    }
}
