use ewe_channels::ChannelError;
use ewe_concurrency::{generate, BoundedGenerator, Fibonacci};
use ewe_config::GeneratorConfig;
use ntest::timeout;
use tracing_test::traced_test;

/// WHY: the producer must send exactly `n` values and then close, a
/// consumer draining the channel has to terminate on its own.
/// WHAT: ten Fibonacci numbers collected through the iterator.
#[test]
#[timeout(5000)]
fn ten_values_then_closed() {
    let values: Vec<u128> = generate(10).expect("should spawn").collect();

    assert_eq!(values, vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34]);
}

/// WHY: the explicit two-value receive form must see closure as an error
/// and never block once the channel is closed and drained.
/// WHAT: receive three times from a two value generator.
#[test]
#[traced_test]
fn receive_reports_closure() {
    let mut receiver = generate(2).expect("should spawn");

    assert_eq!(receiver.block_receive(), Ok(0));
    assert_eq!(receiver.block_receive(), Ok(1));
    assert_eq!(receiver.block_receive(), Err(ChannelError::Closed));
    assert!(receiver.closed());
    assert!(logs_contain("receive channel observed closure"));
}

/// WHY: `n == 0` closes the channel without sending anything.
/// WHAT: the first receive already reports closure.
#[test]
#[timeout(5000)]
fn zero_count_closes_immediately() {
    let generated = BoundedGenerator::new(0, 4)
        .spawn(Fibonacci::new())
        .expect("should spawn");

    let (mut receiver, producer) = generated.into_parts();

    assert!(receiver.block_receive().is_err());
    assert_eq!(producer.join().expect("producer should not panic"), 0);
}

/// WHY: the buffer lets the producer finish ahead of a slow consumer and
/// buffered values stay drainable after closure.
/// WHAT: capacity covers every value, the producer exits before any
/// receive happens.
#[test]
#[timeout(5000)]
fn buffered_values_survive_close() {
    let generated = BoundedGenerator::from_config(5, &GeneratorConfig { capacity: 5 })
        .spawn(Fibonacci::new())
        .expect("should spawn");

    let (receiver, producer) = generated.into_parts();
    assert_eq!(producer.join().expect("producer should not panic"), 5);

    let values: Vec<u128> = receiver.collect();
    assert_eq!(values, vec![0, 1, 1, 2, 3]);
}

/// WHY: an abandoned generator must not block forever on a send nobody
/// will receive.
/// WHAT: consumer takes two values of a hundred, then joins.
#[test]
#[timeout(5000)]
fn abandoned_generator_stops() {
    let mut generated = BoundedGenerator::new(100, 0)
        .spawn(Fibonacci::new())
        .expect("should spawn");

    assert_eq!(generated.next(), Some(0));
    assert_eq!(generated.next(), Some(1));

    assert_eq!(generated.join().expect("should join"), 2);
}
