use dashmap::DashMap;

use crate::error::StorageResult;
use crate::traits::{BatchOp, Storage, WriteBatch};

/// Storage backed by a concurrent in-memory map.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|value| value.value().clone()))
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        self.entries.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> StorageResult<()> {
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => {
                    self.put(key, value)?;
                }
                BatchOp::Delete { key } => {
                    self.delete(key.as_slice())?;
                }
            }
        }

        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries: Vec<(Vec<u8>, Vec<u8>)> = self
            .entries
            .iter()
            .filter_map(|kv| {
                let key = kv.key();
                if key.starts_with(prefix) {
                    Some((key.clone(), kv.value().clone()))
                } else {
                    None
                }
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
