use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::EventSource;

/// Indicates the stop was requested.
const SET: usize = 1;

/// Indicates the stop was not requested.
const UNSET: usize = 0;

/// [`StopSignal`] lets another thread end a running
/// [`Multiplexer`](super::Multiplexer) loop. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    state: Arc<AtomicUsize>,
}

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `stop` flips the state from UNSET to SET, returns false when it
    /// was already set.
    #[inline]
    pub fn stop(&self) -> bool {
        self.state
            .compare_exchange(UNSET, SET, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
    }

    /// `is_stopped` returns true when the state is SET.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.load(Ordering::Acquire) == SET
    }
}

/// Ready, and stays ready, once the stop was requested.
impl EventSource for StopSignal {
    type Event = ();

    fn try_poll(&mut self) -> Option<()> {
        self.is_stopped().then_some(())
    }
}
