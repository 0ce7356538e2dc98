use std::collections::BTreeMap;
use std::sync::Arc;

use nexus_storage::{MemoryStore, Storage, StorageChangeSet};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u8),
    Delete(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, any::<u8>()).prop_map(|(k, v)| Op::Put(k, v)),
        (0u8..8).prop_map(Op::Delete),
    ]
}

fn apply(changes: &mut StorageChangeSet, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Put(k, v) => changes.put(vec![*k], vec![*v]),
            Op::Delete(k) => changes.delete(vec![*k]),
        }
    }
}

fn snapshot(changes: &StorageChangeSet) -> BTreeMap<Vec<u8>, Vec<u8>> {
    changes.scan_prefix(&[]).unwrap().into_iter().collect()
}

proptest! {
    /// Rolling back to a checkpoint restores exactly the view at that point.
    #[test]
    fn rollback_restores_view(before in prop::collection::vec(op(), 0..20),
                              after in prop::collection::vec(op(), 0..20)) {
        let store = Arc::new(MemoryStore::new());
        store.put(vec![0], vec![0]).unwrap();
        let mut changes = StorageChangeSet::new(store);

        apply(&mut changes, &before);
        let expected = snapshot(&changes);
        let checkpoint = changes.checkpoint();
        apply(&mut changes, &after);
        changes.rollback(checkpoint).unwrap();

        prop_assert_eq!(snapshot(&changes), expected);
    }

    /// Committing makes the backend match the overlay view.
    #[test]
    fn commit_matches_view(ops in prop::collection::vec(op(), 0..30)) {
        let store = Arc::new(MemoryStore::new());
        let mut changes = StorageChangeSet::new(store.clone());
        apply(&mut changes, &ops);
        let expected = snapshot(&changes);
        changes.commit().unwrap();

        let stored: BTreeMap<_, _> = store.scan_prefix(&[]).unwrap().into_iter().collect();
        prop_assert_eq!(stored, expected);
    }
}
