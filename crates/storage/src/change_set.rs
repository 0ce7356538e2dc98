use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::{StorageError, StorageResult};
use crate::traits::{Storage, WriteBatch};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Put(Vec<u8>),
    Delete,
}

#[derive(Debug)]
struct JournalEntry {
    key: Vec<u8>,
    previous: Option<Change>,
}

/// Position in a change set's journal that writes can be rolled back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

/// Write overlay on top of a [`Storage`] backend.
///
/// Reads see pending writes first. Every write is journaled so that a
/// [`Checkpoint`] taken earlier can undo everything written after it. Nothing
/// reaches the backend until [`StorageChangeSet::commit`].
pub struct StorageChangeSet {
    base: Arc<dyn Storage>,
    changes: BTreeMap<Vec<u8>, Change>,
    journal: Vec<JournalEntry>,
}

impl StorageChangeSet {
    pub fn new(base: Arc<dyn Storage>) -> Self {
        Self {
            base,
            changes: BTreeMap::new(),
            journal: Vec::new(),
        }
    }

    pub fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        match self.changes.get(key) {
            Some(Change::Put(value)) => Ok(Some(value.clone())),
            Some(Change::Delete) => Ok(None),
            None => self.base.get(key),
        }
    }

    pub fn has(&self, key: &[u8]) -> StorageResult<bool> {
        match self.changes.get(key) {
            Some(Change::Put(_)) => Ok(true),
            Some(Change::Delete) => Ok(false),
            None => self.base.has(key),
        }
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.record(key.into(), Change::Put(value));
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.record(key.into(), Change::Delete);
    }

    /// Whether any write is pending.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.changes.len()
    }

    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    /// Undoes every write made after `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> StorageResult<()> {
        if checkpoint.0 > self.journal.len() {
            return Err(StorageError::InvalidCheckpoint {
                checkpoint: checkpoint.0,
                journal: self.journal.len(),
            });
        }

        let undone = self.journal.len() - checkpoint.0;
        while self.journal.len() > checkpoint.0 {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry.previous {
                Some(change) => {
                    self.changes.insert(entry.key, change);
                }
                None => {
                    self.changes.remove(&entry.key);
                }
            }
        }
        trace!(undone, "rolled back storage writes");
        Ok(())
    }

    /// Entries whose key starts with `prefix` as seen through the overlay.
    pub fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.base.scan_prefix(prefix)?.into_iter().collect();
        for (key, change) in self
            .changes
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            match change {
                Change::Put(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                Change::Delete => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }

    /// Drops every pending write.
    pub fn discard(&mut self) {
        self.changes.clear();
        self.journal.clear();
    }

    /// Flushes pending writes to the backend as one batch.
    pub fn commit(&mut self) -> StorageResult<()> {
        let mut batch = WriteBatch::new();
        for (key, change) in std::mem::take(&mut self.changes) {
            match change {
                Change::Put(value) => batch.put(key, value),
                Change::Delete => batch.delete(key),
            }
        }
        self.journal.clear();
        if batch.is_empty() {
            return Ok(());
        }
        trace!(writes = batch.len(), "committing storage change set");
        self.base.write_batch(batch)
    }

    fn record(&mut self, key: Vec<u8>, change: Change) {
        let previous = self.changes.insert(key.clone(), change);
        self.journal.push(JournalEntry { key, previous });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn change_set() -> (Arc<MemoryStore>, StorageChangeSet) {
        let store = Arc::new(MemoryStore::new());
        store.put(b"base".to_vec(), b"v0".to_vec()).unwrap();
        let changes = StorageChangeSet::new(store.clone());
        (store, changes)
    }

    #[test]
    fn overlay_shadows_backend() {
        let (store, mut changes) = change_set();
        changes.put(b"base".to_vec(), b"v1".to_vec());
        assert_eq!(changes.get(b"base").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.get(b"base").unwrap(), Some(b"v0".to_vec()));

        changes.delete(b"base".to_vec());
        assert!(!changes.has(b"base").unwrap());
        assert!(changes.is_dirty());
    }

    #[test]
    fn rollback_restores_earlier_values() {
        let (_, mut changes) = change_set();
        changes.put(b"a".to_vec(), vec![1]);
        let checkpoint = changes.checkpoint();
        changes.put(b"a".to_vec(), vec![2]);
        changes.put(b"b".to_vec(), vec![3]);
        changes.delete(b"base".to_vec());

        changes.rollback(checkpoint).unwrap();
        assert_eq!(changes.get(b"a").unwrap(), Some(vec![1]));
        assert_eq!(changes.get(b"b").unwrap(), None);
        assert_eq!(changes.get(b"base").unwrap(), Some(b"v0".to_vec()));
        assert_eq!(changes.pending(), 1);
    }

    #[test]
    fn rollback_to_start_leaves_set_clean() {
        let (_, mut changes) = change_set();
        let start = changes.checkpoint();
        changes.put(b"x".to_vec(), vec![0]);
        changes.rollback(start).unwrap();
        assert!(!changes.is_dirty());
    }

    #[test]
    fn stale_checkpoint_is_rejected() {
        let (_, mut changes) = change_set();
        changes.put(b"x".to_vec(), vec![0]);
        let late = changes.checkpoint();
        changes.discard();
        assert!(matches!(
            changes.rollback(late),
            Err(StorageError::InvalidCheckpoint { .. })
        ));
    }

    #[test]
    fn commit_flushes_to_backend() {
        let (store, mut changes) = change_set();
        changes.put(b"new".to_vec(), vec![7]);
        changes.delete(b"base".to_vec());
        changes.commit().unwrap();

        assert!(!changes.is_dirty());
        assert_eq!(store.get(b"new").unwrap(), Some(vec![7]));
        assert_eq!(store.get(b"base").unwrap(), None);
    }

    #[test]
    fn scan_merges_overlay() {
        let (store, mut changes) = change_set();
        store.put(b"p.1".to_vec(), vec![1]).unwrap();
        store.put(b"p.2".to_vec(), vec![2]).unwrap();
        changes.delete(b"p.1".to_vec());
        changes.put(b"p.3".to_vec(), vec![3]);

        let entries = changes.scan_prefix(b"p.").unwrap();
        assert_eq!(
            entries,
            vec![(b"p.2".to_vec(), vec![2]), (b"p.3".to_vec(), vec![3])]
        );
    }
}
