use std::time::{Duration, Instant};

use ewe_channels::ReceiveChannel;

use super::timers::Timer;

/// Something a [`Multiplexer`](super::Multiplexer) can wait on.
///
/// `try_poll` must never block: it either hands out the pending event,
/// consuming it, or returns `None` when nothing is pending.
pub trait EventSource {
    type Event;

    fn try_poll(&mut self) -> Option<Self::Event>;

    /// How long until the source may become ready on its own, `None`
    /// when that depends on another thread (channels) or never happens.
    fn ready_in(&self) -> Option<Duration> {
        None
    }
}

/// Fires every `interval`, the event carries the instant it was polled.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    timer: Timer,
}

impl Ticker {
    /// A zero interval makes the ticker ready on every poll.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: Timer::from_now(interval),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.timer.how_long
    }
}

impl EventSource for Ticker {
    type Event = Instant;

    fn try_poll(&mut self) -> Option<Instant> {
        if !self.timer.is_ready() {
            return None;
        }

        let now = Instant::now();
        self.timer.rearm(now);
        Some(now)
    }

    fn ready_in(&self) -> Option<Duration> {
        Some(self.timer.remaining())
    }
}

/// Fires exactly once, after its duration elapsed.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    timer: Timer,
    fired: bool,
}

impl Deadline {
    #[must_use]
    pub fn new(after: Duration) -> Self {
        Self {
            timer: Timer::from_now(after),
            fired: false,
        }
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl EventSource for Deadline {
    type Event = Instant;

    fn try_poll(&mut self) -> Option<Instant> {
        if self.fired || !self.timer.is_ready() {
            return None;
        }

        self.fired = true;
        Some(Instant::now())
    }

    fn ready_in(&self) -> Option<Duration> {
        if self.fired {
            return None;
        }
        Some(self.timer.remaining())
    }
}

/// Ready whenever its channel holds a message. Once the channel is
/// closed and drained the signal is never ready again.
#[derive(Debug)]
pub struct Signal<T> {
    receiver: ReceiveChannel<T>,
}

impl<T> Signal<T> {
    #[must_use]
    pub fn new(receiver: ReceiveChannel<T>) -> Self {
        Self { receiver }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.receiver.closed()
    }

    #[must_use]
    pub fn into_inner(self) -> ReceiveChannel<T> {
        self.receiver
    }
}

impl<T> EventSource for Signal<T> {
    type Event = T;

    fn try_poll(&mut self) -> Option<T> {
        self.receiver.try_receive().ok()
    }
}
