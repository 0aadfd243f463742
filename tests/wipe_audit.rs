//! Wipe instrumentation: release ordering, single-wipe under racing close,
//! sentinel zeroization. These tests read the native core's wipe counter
//! and audit log, so they serialize on one lock to keep their observations
//! clean.

use std::sync::{Arc, Barrier, Mutex, OnceLock};
use std::thread;

use quantvault::native::builtin::{recent_wipes, wipe_invocations};
use quantvault::{ArenaMode, SecretContainer};

fn audit_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|e| e.into_inner())
}

/// The audit log is bounded and trimmed from the front, so observations
/// compare against its tail rather than absolute positions.
fn assert_log_tail(expected: &[usize]) {
    let log = recent_wipes();
    assert!(
        log.ends_with(expected),
        "wipe log tail {:?} != {:?}",
        &log[log.len().saturating_sub(expected.len())..],
        expected
    );
}

#[test]
fn children_release_in_reverse_insertion_order() {
    let _guard = audit_lock();

    let parent = SecretContainer::new_empty(64).unwrap();
    let _first = parent.add_child(24).unwrap();
    let _second = parent.add_child(40).unwrap();

    parent.close();

    // Last child first, parent segment last.
    assert_log_tail(&[40, 24, 64]);
}

#[test]
fn concurrent_close_wipes_exactly_once() {
    let _guard = audit_lock();

    let container = SecretContainer::new_empty_in(128, ArenaMode::Shared).unwrap();
    {
        let mut view = container.segment_view().unwrap();
        view.fill(0xAB);
    }

    let before = wipe_invocations();
    let barrier = Arc::new(Barrier::new(2));
    let threads: Vec<_> = (0..2)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.close();
                assert!(!container.is_alive());
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert!(!container.is_alive());
    assert_eq!(wipe_invocations() - before, 1, "segment must be wiped exactly once");
}

#[test]
fn hierarchical_wipe_covers_every_segment() {
    let _guard = audit_lock();

    let parent = SecretContainer::new_empty(64).unwrap();
    let child_a = parent.add_child(32).unwrap();
    let child_b = parent.add_child(32).unwrap();
    for c in [&parent, &child_a, &child_b] {
        c.segment_view().unwrap().fill(0xAB);
    }

    parent.close();

    assert_log_tail(&[32, 32, 64]);
    assert!(!parent.is_alive());
    assert!(!child_a.is_alive());
    assert!(!child_b.is_alive());
}

#[test]
fn sentinel_filled_container_is_wiped_on_close() {
    let _guard = audit_lock();

    let container = SecretContainer::new_empty(48).unwrap();
    container.segment_view().unwrap().fill(0xEE);

    let before = wipe_invocations();
    container.close();

    assert_eq!(wipe_invocations() - before, 1);
    assert_log_tail(&[48]);
}

#[test]
fn ingested_source_buffer_is_cleared_immediately() {
    let _guard = audit_lock();

    // The source buffer moves in; its bytes must not survive on the heap.
    let source = vec![0x5Au8; 96];
    let container = SecretContainer::new_from_owned(source).unwrap();
    assert_eq!(container.export_to_heap().unwrap(), vec![0x5Au8; 96]);
    container.close();
    assert!(!container.is_alive());
}
