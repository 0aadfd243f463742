//! Container lifecycle: hierarchy, close semantics, post-close discipline.

use proptest::prelude::*;
use quantvault::{ArenaMode, CryptoError, SecretContainer};

#[test]
fn close_is_idempotent() {
    let container = SecretContainer::new_from(b"wipe me once").unwrap();
    container.close();
    assert!(!container.is_alive());
    container.close();
    container.close();
    assert!(!container.is_alive());
}

#[test]
fn close_cascades_through_the_tree() {
    let parent = SecretContainer::new_empty(64).unwrap();
    let child_a = parent.add_child(32).unwrap();
    let child_b = parent.add_child(32).unwrap();
    let grandchild = child_a.add_child(16).unwrap();

    parent.close();
    assert!(!parent.is_alive());
    assert!(!child_a.is_alive());
    assert!(!child_b.is_alive());
    assert!(!grandchild.is_alive());
}

#[test]
fn every_operation_fails_after_close() {
    let container = SecretContainer::new_empty(32).unwrap();
    let child = container.add_child(8).unwrap();
    container.close();

    assert!(matches!(container.segment_view().map(|_| ()), Err(CryptoError::AlreadyClosed)));
    assert!(matches!(container.export_to_heap(), Err(CryptoError::AlreadyClosed)));
    assert!(matches!(container.add_child(4).map(|_| ()), Err(CryptoError::AlreadyClosed)));
    assert!(matches!(container.add_child_from(b"x").map(|_| ()), Err(CryptoError::AlreadyClosed)));
    assert!(matches!(container.child(0).map(|_| ()), Err(CryptoError::AlreadyClosed)));
    assert!(matches!(container.child_count(), Err(CryptoError::AlreadyClosed)));
    assert!(matches!(child.segment_view().map(|_| ()), Err(CryptoError::AlreadyClosed)));

    // Still referenceable for exactly this observation.
    assert!(!container.is_alive());
    assert_eq!(container.byte_length(), 32);
}

#[test]
fn children_are_indexed_in_insertion_order() {
    let parent = SecretContainer::new_empty(16).unwrap();
    let first = parent.add_child_from(b"first").unwrap();
    let second = parent.add_child_from(b"second").unwrap();

    assert_eq!(parent.child_count().unwrap(), 2);
    assert_eq!(parent.child(0).unwrap().unwrap().byte_length(), first.byte_length());
    assert_eq!(parent.child(1).unwrap().unwrap().byte_length(), second.byte_length());
    assert!(parent.child(2).unwrap().is_none());
}

#[test]
fn contents_survive_the_move_into_the_container() {
    let container = SecretContainer::new_from(b"defensive copy").unwrap();
    assert_eq!(container.export_to_heap().unwrap(), b"defensive copy");

    let owned = SecretContainer::new_from_owned(b"moved in".to_vec()).unwrap();
    assert_eq!(owned.export_to_heap().unwrap(), b"moved in");
}

#[test]
fn closing_a_child_leaves_the_parent_alive() {
    let parent = SecretContainer::new_empty(16).unwrap();
    let child = parent.add_child(8).unwrap();
    child.close();
    assert!(!child.is_alive());
    assert!(parent.is_alive());
    assert!(parent.segment_view().is_ok());
}

#[test]
fn dropping_the_last_handle_closes_the_tree() {
    let child = {
        let parent = SecretContainer::new_empty(16).unwrap();
        parent.add_child(8).unwrap()
        // parent dropped here
    };
    assert!(!child.is_alive());
}

#[test]
fn shared_containers_cross_threads() {
    let container = SecretContainer::new_from_in(&[0x77u8; 24], ArenaMode::Shared).unwrap();
    let handle = {
        let container = container.clone();
        std::thread::spawn(move || container.export_to_heap().unwrap())
    };
    assert_eq!(handle.join().unwrap(), vec![0x77u8; 24]);
}

proptest! {
    #[test]
    fn seeded_contents_always_match(data in proptest::collection::vec(any::<u8>(), 1..512)) {
        let container = SecretContainer::new_from(&data).unwrap();
        prop_assert_eq!(container.byte_length(), data.len());
        prop_assert_eq!(container.export_to_heap().unwrap(), data);
        container.close();
        container.close();
        prop_assert!(!container.is_alive());
    }

    #[test]
    fn chained_children_always_close(sizes in proptest::collection::vec(1usize..64, 1..8)) {
        let parent = SecretContainer::new_empty(8).unwrap();
        let children: Vec<_> =
            sizes.iter().map(|&n| parent.add_child(n).unwrap()).collect();
        parent.close();
        for child in &children {
            prop_assert!(!child.is_alive());
        }
    }
}
