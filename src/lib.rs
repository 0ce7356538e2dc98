//! # Nexus
//!
//! A deterministic execution runtime for a versioned blockchain ledger.
//!
//! Every node replaying a transaction through this runtime reaches the same
//! state, gas figures and event log. The workspace is split into:
//!
//! - [`config`]: protocol constants and [`RuntimeSettings`]
//! - [`core`]: addresses, hashes, transactions, events and their wire codec
//! - [`storage`]: the storage trait, an in-memory store and the journaling
//!   change set
//! - [`vm`]: the stack machine and its gas cost table
//! - [`runtime`]: the execution engine, native contracts and token ledger
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nexus_rs::prelude::*;
//!
//! let chain = ChainInfo::new("main");
//! let oracle = MemoryOracle::new();
//! let natives = NativeRegistry::with_defaults();
//! let settings = RuntimeSettings::default();
//! let env = ExecutionEnvironment::new(&chain, &oracle, &natives, &settings, Timestamp::new(0));
//!
//! let mut storage = StorageChangeSet::new(Arc::new(MemoryStore::new()));
//! let mut builder = ScriptBuilder::new();
//! builder.emit_extcall("Runtime.Random");
//! let mut engine = ExecutionEngine::new(env, &mut storage, builder.build()).with_delay_payment(true);
//! assert_eq!(engine.execute(), ExecutionState::Halt);
//! ```

pub mod logging;

pub use nexus_config as config;
pub use nexus_core as core;
pub use nexus_runtime as runtime;
pub use nexus_storage as storage;
pub use nexus_vm as vm;

pub use nexus_config::RuntimeSettings;

/// Common imports for embedding the runtime.
pub mod prelude {
    pub use crate::config::RuntimeSettings;
    pub use crate::core::{Address, Event, EventKind, Hash, Timestamp, Transaction};
    pub use crate::logging::{init_logging, LogConfig, LogFormat};
    pub use crate::runtime::{
        Chain, ChainInfo, ExecutionEngine, ExecutionEnvironment, MemoryOracle, NativeRegistry,
        RuntimeError,
    };
    pub use crate::storage::{MemoryStore, Storage, StorageChangeSet};
    pub use crate::vm::{ExecutionState, ScriptBuilder, VmObject};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
