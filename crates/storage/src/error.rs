use thiserror::Error;

/// Errors raised by storage backends and change sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage: backend failure: {0}")]
    Backend(String),

    #[error("storage: checkpoint {checkpoint} is beyond journal length {journal}")]
    InvalidCheckpoint { checkpoint: usize, journal: usize },
}

impl StorageError {
    #[inline]
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend(message.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
