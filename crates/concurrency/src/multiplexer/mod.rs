// Implements a select loop over timers and channels.
//
// Each step polls every source once in a freshly shuffled order and runs
// the handler of the first ready one. Shuffling makes the winner uniform
// among the ready sources, and the sources after the winner are never
// polled so whatever they hold stays pending for the next step.

mod sources;
mod stop;
pub mod timers;

use std::cell::RefCell;
use std::thread;
use std::time::{Duration, Instant};

use ewe_channels::ReceiveChannel;
use ewe_config::MultiplexerConfig;

pub use sources::*;
pub use stop::*;

/// What the loop should do after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Break,
}

/// Result of a single [`Multiplexer::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The branch registered at `branch` was ready and its handler ran.
    Fired { branch: usize, flow: Flow },

    /// Nothing was ready and the default handler ran.
    Default(Flow),

    /// Nothing was ready and there is no default handler.
    Idle,
}

/// Counts of what a [`Multiplexer::run`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps: usize,
    pub defaults: usize,
    pub idles: usize,
    /// Firings per branch, indexed in registration order.
    pub fired: Vec<usize>,
    /// True when the loop ended through its [`StopSignal`].
    pub stopped: bool,
}

trait Branch {
    fn try_fire(&mut self) -> Option<Flow>;
    fn ready_in(&self) -> Option<Duration>;
}

struct Arm<S, H> {
    source: S,
    handler: H,
}

impl<S, H> Branch for Arm<S, H>
where
    S: EventSource,
    H: FnMut(S::Event) -> Flow,
{
    fn try_fire(&mut self) -> Option<Flow> {
        self.source.try_poll().map(&mut self.handler)
    }

    fn ready_in(&self) -> Option<Duration> {
        self.source.ready_in()
    }
}

/// [`Multiplexer`] waits on several event sources at once.
///
/// ```
/// use std::time::Duration;
/// use ewe_concurrency::multiplexer::{Flow, Multiplexer};
///
/// let mut ticks = 0;
///
/// let report = Multiplexer::new()
///     .periodic(Duration::from_millis(10), |_| {
///         ticks += 1;
///         Flow::Continue
///     })
///     .deadline(Duration::from_millis(50), |_| Flow::Break)
///     .on_default(|| {
///         std::thread::sleep(Duration::from_millis(5));
///         Flow::Continue
///     })
///     .run();
///
/// assert!(ticks >= 1);
/// assert_eq!(report.fired[1], 1);
/// ```
pub struct Multiplexer<'a> {
    branches: Vec<Box<dyn Branch + 'a>>,
    on_default: Option<Box<dyn FnMut() -> Flow + 'a>>,
    stop: Option<StopSignal>,
    idle_poll: Duration,
    rng: fastrand::Rng,
    order: Vec<usize>,
}

impl Default for Multiplexer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Multiplexer<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&MultiplexerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &MultiplexerConfig) -> Self {
        Self {
            branches: Vec::new(),
            on_default: None,
            stop: None,
            idle_poll: config.idle_poll,
            rng: fastrand::Rng::new(),
            order: Vec::new(),
        }
    }

    /// Fixes the tie-breaking sequence, mostly useful in tests.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    #[must_use]
    pub fn source<S, H>(mut self, source: S, handler: H) -> Self
    where
        S: EventSource + 'a,
        H: FnMut(S::Event) -> Flow + 'a,
    {
        self.branches.push(Box::new(Arm { source, handler }));
        self
    }

    #[must_use]
    pub fn periodic<H>(self, interval: Duration, handler: H) -> Self
    where
        H: FnMut(Instant) -> Flow + 'a,
    {
        self.source(Ticker::new(interval), handler)
    }

    #[must_use]
    pub fn deadline<H>(self, after: Duration, handler: H) -> Self
    where
        H: FnMut(Instant) -> Flow + 'a,
    {
        self.source(Deadline::new(after), handler)
    }

    #[must_use]
    pub fn signal<T, H>(self, receiver: ReceiveChannel<T>, handler: H) -> Self
    where
        T: 'a,
        H: FnMut(T) -> Flow + 'a,
    {
        self.source(Signal::new(receiver), handler)
    }

    /// Runs whenever no source is ready, which makes every step
    /// non-blocking.
    #[must_use]
    pub fn on_default<H>(mut self, handler: H) -> Self
    where
        H: FnMut() -> Flow + 'a,
    {
        self.on_default = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn stop_on(mut self, signal: StopSignal) -> Self {
        self.stop = Some(signal);
        self
    }

    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Polls the sources once and runs at most one handler. Never blocks
    /// beyond the time the chosen handler takes.
    pub fn step(&mut self) -> StepOutcome {
        self.order.clear();
        self.order.extend(0..self.branches.len());
        self.rng.shuffle(&mut self.order);

        for &branch in &self.order {
            if let Some(flow) = self.branches[branch].try_fire() {
                tracing::trace!(branch, ?flow, "multiplexer branch fired");
                return StepOutcome::Fired { branch, flow };
            }
        }

        match self.on_default.as_mut() {
            Some(handler) => StepOutcome::Default(handler()),
            None => StepOutcome::Idle,
        }
    }

    /// Steps until a handler returns [`Flow::Break`] or the stop signal
    /// is raised. Without a default handler an idle step parks the thread
    /// until the nearest timer is due, at most for the configured idle
    /// poll interval.
    pub fn run(&mut self) -> RunReport {
        let mut report = RunReport {
            fired: vec![0; self.branches.len()],
            ..RunReport::default()
        };

        loop {
            if self.stop.as_ref().is_some_and(StopSignal::is_stopped) {
                tracing::debug!(steps = report.steps, "multiplexer stopped by signal");
                report.stopped = true;
                break;
            }

            report.steps += 1;
            let flow = match self.step() {
                StepOutcome::Fired { branch, flow } => {
                    report.fired[branch] += 1;
                    flow
                }
                StepOutcome::Default(flow) => {
                    report.defaults += 1;
                    flow
                }
                StepOutcome::Idle => {
                    report.idles += 1;
                    thread::sleep(self.idle_wait());
                    Flow::Continue
                }
            };

            if flow == Flow::Break {
                tracing::debug!(steps = report.steps, "multiplexer loop finished");
                break;
            }
        }

        report
    }

    fn idle_wait(&self) -> Duration {
        self.branches
            .iter()
            .filter_map(|branch| branch.ready_in())
            .fold(self.idle_poll, Duration::min)
    }
}

/// A source description for [`run`].
pub enum EventSpec<T> {
    Periodic(Duration),
    Deadline(Duration),
    Signal(ReceiveChannel<T>),
    /// Ends the loop once the signal is raised, never reaches `on_event`.
    Stop(StopSignal),
}

/// What [`run`] hands to its event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired<T> {
    Tick(Instant),
    Deadline(Instant),
    Signal(T),
}

/// Runs a select loop over `sources`.
///
/// `on_event` receives the index of the source in `sources` along with
/// its event. `on_default` runs whenever nothing is ready, so the loop
/// never blocks. The loop ends only when an [`EventSpec::Deadline`] fires,
/// right after `on_event` ran for it, or when an [`EventSpec::Stop`]
/// signal is raised. Exhausted signals do not end it: with neither a
/// deadline nor a stop source it runs forever.
pub fn run<T, H, D>(sources: Vec<EventSpec<T>>, on_event: H, mut on_default: D) -> RunReport
where
    H: FnMut(usize, Fired<T>),
    D: FnMut(),
{
    let on_event = RefCell::new(on_event);
    let on_event = &on_event;

    let mut multiplexer = Multiplexer::new().on_default(move || {
        on_default();
        Flow::Continue
    });

    for (index, event) in sources.into_iter().enumerate() {
        multiplexer = match event {
            EventSpec::Periodic(interval) => multiplexer.periodic(interval, move |at| {
                (&mut *on_event.borrow_mut())(index, Fired::Tick(at));
                Flow::Continue
            }),
            EventSpec::Deadline(after) => multiplexer.deadline(after, move |at| {
                (&mut *on_event.borrow_mut())(index, Fired::Deadline(at));
                Flow::Break
            }),
            EventSpec::Signal(receiver) => multiplexer.signal(receiver, move |value| {
                (&mut *on_event.borrow_mut())(index, Fired::Signal(value));
                Flow::Continue
            }),
            // the branch keeps `RunReport::fired` indexed like `sources`
            EventSpec::Stop(signal) => multiplexer
                .source(signal.clone(), |()| Flow::Break)
                .stop_on(signal),
        };
    }

    multiplexer.run()
}
