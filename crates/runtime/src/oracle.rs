use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("oracle: no data for {0}")]
    NotFound(String),

    #[error("oracle: {0}")]
    Backend(String),
}

/// Source of off-chain data, addressed by an opaque key.
///
/// Implementations must return the same bytes to every node replaying a
/// transaction.
pub trait Oracle: Send + Sync {
    fn read(&self, url: &str) -> Result<Vec<u8>, OracleError>;
}

/// Oracle answering from a preloaded table.
#[derive(Default)]
pub struct MemoryOracle {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, data: Vec<u8>) {
        self.entries.insert(url.into(), data);
    }
}

impl Oracle for MemoryOracle {
    fn read(&self, url: &str) -> Result<Vec<u8>, OracleError> {
        self.entries
            .get(url)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| OracleError::NotFound(url.to_string()))
    }
}
