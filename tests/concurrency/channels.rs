use std::thread;
use std::time::Duration;

use ewe_channels::{bounded, rendezvous, unbounded, ChannelError};
use foundation_testing::workloads::{channel_fan_in, expected_fan_in_sum};
use ntest::timeout;

/// WHY: a buffered channel accepts sends up to its capacity without a
/// concurrent receiver.
/// WHAT: `bounded(2)`, send twice and receive twice on one thread.
#[test]
#[timeout(2000)]
fn buffered_channel_without_peer() {
    let (sender, mut receiver) = bounded::<&str>(2);

    sender.block_send("buffered").expect("first send fits");
    sender.block_send("channel").expect("second send fits");
    assert_eq!(sender.try_send("overflow"), Err(ChannelError::Full));

    assert_eq!(receiver.block_receive(), Ok("buffered"));
    assert_eq!(receiver.block_receive(), Ok("channel"));
}

/// WHY: a rendezvous send completes only when a receiver takes the value.
/// WHAT: `try_send` fails without a waiting receiver, a blocked receiver
/// gets the value of a blocking send.
#[test]
#[timeout(2000)]
fn rendezvous_needs_a_receiver() {
    let (sender, mut receiver) = rendezvous::<u8>();
    assert_eq!(sender.try_send(1), Err(ChannelError::Full));

    let consumer = thread::spawn(move || receiver.block_receive());
    sender.block_send(2).expect("receiver is waiting");

    assert_eq!(consumer.join().expect("consumer should not panic"), Ok(2));
}

/// WHY: closure must only be observed once every sender is gone and
/// buffered values were drained.
/// WHAT: one of two cloned senders closes, the other keeps sending.
#[test]
#[timeout(2000)]
fn closure_waits_for_every_sender() {
    let (sender, mut receiver) = unbounded::<u8>();
    let other = sender.clone();

    sender.block_send(1).expect("open");
    sender.close();
    assert!(!receiver.closed());

    other.block_send(2).expect("still open");
    other.close();

    assert_eq!(receiver.block_receive(), Ok(1));
    assert_eq!(receiver.block_receive(), Ok(2));
    assert_eq!(receiver.block_receive(), Err(ChannelError::Closed));
    assert!(receiver.closed());
}

/// WHY: a bounded receive wait reports a timeout rather than closure.
/// WHAT: nothing is ever sent on an open channel.
#[test]
#[timeout(2000)]
fn receive_timeout_on_open_channel() {
    let (_sender, mut receiver) = unbounded::<u8>();

    assert_eq!(
        receiver.receive_timeout(Duration::from_millis(20)),
        Err(ChannelError::TimedOut)
    );
}

/// WHY: many producers on one bounded channel must neither lose nor
/// duplicate values.
/// WHAT: 6 producers, capacity 4.
#[test]
#[timeout(10000)]
fn fan_in_over_bounded_channel() {
    let outcome = channel_fan_in(6, 500, 4);

    assert_eq!(outcome.sent, 3000);
    assert_eq!(outcome.received, 3000);
    assert_eq!(outcome.checksum, expected_fan_in_sum(6, 500));
}
