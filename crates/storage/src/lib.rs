//! Storage abstractions backing the Nexus execution runtime.
//!
//! Backends implement [`Storage`]. The runtime never writes to a backend
//! directly; it works against a [`StorageChangeSet`] whose journal allows
//! nested executions to roll back their writes before the set is committed.

mod change_set;
mod error;
mod memory;
mod traits;

pub use change_set::{Checkpoint, StorageChangeSet};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use traits::{BatchOp, Storage, WriteBatch};
