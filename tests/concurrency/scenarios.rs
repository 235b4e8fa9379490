use std::cell::RefCell;
use std::thread;
use std::time::Duration;

use ewe_channels::unbounded;
use ewe_concurrency::multiplexer::{run, EventSpec, Fired, StopSignal};
use ewe_concurrency::{generate, sum_concurrently, GuardedCounter};
use ntest::timeout;
use serial_test::serial;

/// WHY: the classic ticker/bomb loop, periodic ticks interleave with the
/// default branch and the deadline ends everything.
/// WHAT: tick every 10ms, BOOM after 55ms, the default prints a dot and
/// naps for 5ms.
#[test]
#[serial]
#[timeout(5000)]
fn tick_tick_boom() {
    let output = RefCell::new(Vec::<String>::new());

    let report = run::<(), _, _>(
        vec![
            EventSpec::Periodic(Duration::from_millis(10)),
            EventSpec::Deadline(Duration::from_millis(55)),
        ],
        |_, fired| {
            let line = match fired {
                Fired::Tick(_) => "tick.",
                Fired::Deadline(_) => "BOOM!",
                Fired::Signal(()) => "signal",
            };
            output.borrow_mut().push(line.to_owned());
        },
        || {
            output.borrow_mut().push(String::from("    ."));
            thread::sleep(Duration::from_millis(5));
        },
    );

    let output = output.into_inner();
    let ticks = output.iter().filter(|line| *line == "tick.").count();

    assert_eq!(output.last().map(String::as_str), Some("BOOM!"));
    assert_eq!(output.iter().filter(|line| *line == "BOOM!").count(), 1);
    assert!(ticks >= 2, "ticks = {ticks}");
    assert!(output.iter().any(|line| line == "    ."));
    assert_eq!(report.fired[0], ticks);
}

/// WHY: signals and timers compose in one loop, signal payloads reach
/// the handler with the index of their source.
/// WHAT: a generator feeding the multiplexer until a deadline.
#[test]
#[serial]
#[timeout(5000)]
fn generator_values_flow_through_multiplexer() {
    let received = RefCell::new(Vec::new());

    run(
        vec![
            EventSpec::Signal(generate(10).expect("should spawn")),
            EventSpec::Deadline(Duration::from_millis(100)),
        ],
        |index, fired| {
            if let Fired::Signal(value) = fired {
                assert_eq!(index, 0);
                received.borrow_mut().push(value);
            }
        },
        || thread::sleep(Duration::from_millis(1)),
    );

    assert_eq!(received.into_inner(), vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34]);
}

/// WHY: the primitives combine, per-key counts computed by many threads
/// can be summed in parallel afterwards.
/// WHAT: producers count words into a counter, the counts are aggregated.
#[test]
#[timeout(5000)]
fn counted_words_aggregate() {
    let counter = GuardedCounter::new();
    let words = ["alpha", "beta", "gamma", "delta"];

    thread::scope(|scope| {
        for offset in 0..4 {
            let counter = &counter;
            scope.spawn(move || {
                for index in 0..100 {
                    counter.increment(words[(offset + index) % words.len()]);
                }
            });
        }
    });

    let counts: Vec<u64> = counter.snapshot().into_values().collect();
    assert_eq!(counts.len(), 4);
    assert_eq!(sum_concurrently(counts, 3).expect("should sum"), 400);
}

/// WHY: a signal fed from another thread is picked up while timers run.
/// WHAT: a producer sends three values then closes, the deadline ends
/// the loop afterwards.
#[test]
#[serial]
#[timeout(5000)]
fn remote_signal_with_deadline() {
    let (sender, receiver) = unbounded::<u8>();
    let producer = thread::spawn(move || {
        for value in 1..=3 {
            thread::sleep(Duration::from_millis(5));
            sender.block_send(value).expect("open");
        }
        sender.close();
    });

    let sum = RefCell::new(0_u8);
    let report = run(
        vec![
            EventSpec::Signal(receiver),
            EventSpec::Deadline(Duration::from_millis(80)),
        ],
        |_, fired| {
            if let Fired::Signal(value) = fired {
                *sum.borrow_mut() += value;
            }
        },
        || thread::sleep(Duration::from_millis(1)),
    );

    producer.join().expect("producer should not panic");
    assert_eq!(sum.into_inner(), 6);
    assert_eq!(report.fired, vec![3, 1]);
}

/// WHY: exhausted signals never end a loop on their own, a stop source
/// raised from another thread must.
/// WHAT: the only signal is closed and drained, the loop runs on a helper
/// thread until a stop is raised 20ms later.
#[test]
#[serial]
#[timeout(5000)]
fn stop_ends_loop_over_exhausted_signals() {
    let (sender, receiver) = unbounded::<u8>();
    sender.close();

    let stop = StopSignal::new();
    let remote = stop.clone();
    let (done_sender, mut done) = unbounded();

    let looper = thread::spawn(move || {
        let report = run(
            vec![EventSpec::Signal(receiver), EventSpec::Stop(stop)],
            |_, _| {},
            || thread::sleep(Duration::from_millis(1)),
        );
        done_sender.block_send(report).expect("test is waiting");
    });

    thread::sleep(Duration::from_millis(20));
    assert!(remote.stop());

    let report = done
        .receive_timeout(Duration::from_secs(2))
        .expect("loop should end once stopped");
    looper.join().expect("loop thread should not panic");

    assert!(report.stopped);
    assert_eq!(report.fired, vec![0, 0]);
    assert!(report.defaults > 0);
}
