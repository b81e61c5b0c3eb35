//! Races and lease behavior across threads.

use crate::common::{doc, store};
use flowstore::{
    DocumentStore, LockManager, MemoryDriver, PutOptions, StoreConfig, WriteOutcome,
};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn racing_updates_from_the_same_rev_pick_one_winner() {
    let store = store();
    let mut base = doc(serde_json::json!({"id": "a", "type": "t", "v": 0}));
    assert!(store.put(&mut base, PutOptions::default()).unwrap().is_applied());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let mut attempt =
                    doc(serde_json::json!({"id": "a", "type": "t", "v": i, "rev": 0}));
                store.put(&mut attempt, PutOptions::default()).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<WriteOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = outcomes.iter().filter(|o| o.is_applied()).count();
    assert_eq!(wins, 1);
    for outcome in &outcomes {
        if let WriteOutcome::Conflict(current) = outcome {
            assert_eq!(current.rev(), Some(1));
        }
    }
    assert_eq!(store.get("t", "a").unwrap().unwrap().rev(), Some(1));
}

#[test]
fn racing_first_creates_pick_one_winner() {
    let store = store();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let mut attempt = doc(serde_json::json!({"id": "fresh", "type": "t", "v": i}));
                store.put(&mut attempt, PutOptions::default()).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<WriteOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_applied()).count(), 1);
    // every loser saw the winner's revision 0
    for outcome in &outcomes {
        if let WriteOutcome::Conflict(current) = outcome {
            assert_eq!(current.rev(), Some(0));
        }
    }
}

#[test]
fn a_crashed_holder_does_not_wedge_the_key() {
    let driver = Arc::new(MemoryDriver::new());
    let config = StoreConfig {
        lock_lease: Duration::from_millis(50),
        lock_backoff: Duration::from_millis(5),
        ..StoreConfig::default()
    };

    // "crash": acquire and never release
    let dead = LockManager::new(Arc::clone(&driver), &config);
    assert!(dead.try_acquire("a").unwrap());

    // a contender with the same config gets through once the lease expires
    let store = DocumentStore::new(Arc::clone(&driver), config);
    let mut d = doc(serde_json::json!({"id": "a", "type": "t"}));
    assert!(store.put(&mut d, PutOptions::default()).unwrap().is_applied());
}

#[test]
fn serialized_counter_increments_are_never_lost() {
    // read-modify-write with retry-on-conflict must converge to the exact
    // number of increments when writers go through put's rev check
    let store = store();
    let mut base = doc(serde_json::json!({"id": "ctr", "type": "variables", "n": 0}));
    assert!(store.put(&mut base, PutOptions::default()).unwrap().is_applied());

    let per_thread = 10;
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..per_thread {
                    loop {
                        let mut current = store.get("variables", "ctr").unwrap().unwrap();
                        let n = current.get("n").unwrap().as_int().unwrap();
                        current.set("n", n + 1);
                        if store
                            .put(&mut current, PutOptions::default())
                            .unwrap()
                            .is_applied()
                        {
                            break;
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let final_doc = store.get("variables", "ctr").unwrap().unwrap();
    assert_eq!(final_doc.get("n").unwrap().as_int(), Some(40));
    assert_eq!(final_doc.rev(), Some(40));
}
