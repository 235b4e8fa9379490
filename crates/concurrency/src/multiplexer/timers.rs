// Timer backing the periodic and deadline event sources.

use std::time::{Duration, Instant};

/// [`Timer`] matures `how_long` after `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub from: Instant,
    pub how_long: Duration,
}

impl Timer {
    #[must_use]
    pub fn new(from: Instant, how_long: Duration) -> Self {
        Self { from, how_long }
    }

    #[must_use]
    pub fn from_now(how_long: Duration) -> Self {
        Self::new(Instant::now(), how_long)
    }

    /// The instant the timer matures, `None` when it lies beyond what
    /// [`Instant`] can represent.
    #[must_use]
    pub fn when_ready(&self) -> Option<Instant> {
        self.from.checked_add(self.how_long)
    }

    /// Time left until the timer matures, zero once it has.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        match self.when_ready() {
            Some(when_ready) => when_ready.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }

    #[must_use]
    pub fn try_is_ready(&self) -> Option<bool> {
        let now = Instant::now();
        self.when_ready().map(|when_ready| when_ready <= now)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.try_is_ready().unwrap_or(false)
    }

    /// Starts the next period from the instant this one matured. A
    /// period that would already be over restarts from `now` instead,
    /// so periods missed by a slow poller are dropped and not replayed.
    pub fn rearm(&mut self, now: Instant) {
        let next_from = self.when_ready().unwrap_or(now);
        let next = Self::new(next_from, self.how_long);

        self.from = match next.when_ready() {
            Some(when_ready) if when_ready > now => next_from,
            _ => now,
        };
    }
}
