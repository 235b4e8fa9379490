use std::sync::Arc;
use std::thread;

use ewe_concurrency::GuardedCounter;
use foundation_testing::{StressConfig, StressHarness};
use ntest::timeout;

/// WHY: N increments spread over M threads must all land, the lock is the
/// only thing standing between them and lost updates.
/// WHAT: 1000 detached threads each increment the same key once.
#[test]
#[timeout(10000)]
fn thousand_threads_increment_one_key() {
    let counter = Arc::new(GuardedCounter::new());

    let handles: Vec<_> = (0..1000)
        .map(|_| {
            let counter = Arc::clone(&counter);
            thread::spawn(move || counter.increment("somekey"))
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker should not panic");
    }

    assert_eq!(counter.get("somekey"), 1000);
    assert_eq!(counter.len(), 1);
}

/// WHY: unrelated keys share one lock but must keep separate counts.
/// WHAT: every worker increments its own key plus a shared one.
#[test]
#[timeout(10000)]
fn per_thread_keys_stay_separate() {
    let counter = GuardedCounter::new();
    let config = StressConfig::new().threads(6).iterations(200);

    let result = StressHarness::new(config).run(|thread_id, _| {
        counter.increment(&format!("worker-{thread_id}"));
        counter.increment("shared");
        true
    });

    assert!(result.is_clean());
    assert_eq!(counter.get("shared"), 1200);
    for thread_id in 0..6 {
        assert_eq!(counter.get(&format!("worker-{thread_id}")), 200);
    }
    assert_eq!(counter.len(), 7);
}

/// WHY: a key nobody touched reads as zero and does not appear in the map.
/// WHAT: `get` on a missing key.
#[test]
fn missing_key_reads_zero() {
    let counter = GuardedCounter::new();
    counter.increment_by("present", 3);

    assert_eq!(counter.get("absent"), 0);
    assert_eq!(counter.snapshot().len(), 1);
}
