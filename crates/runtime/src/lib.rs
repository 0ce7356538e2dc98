//! # Nexus Runtime
//!
//! The execution engine that runs transaction scripts against a ledger
//! change set.
//!
//! The [`ExecutionEngine`] wraps the `nexus-vm` interpreter with the ledger's
//! rules:
//!
//! - **Gas**: every opcode and native call is metered by a [`GasMeter`]; the
//!   native `gas` contract escrows and settles the fee
//! - **Dispatch**: contexts are switched by name, native contracts expose a
//!   registration-time method table
//! - **Authorization**: witnesses come from the entry address, the signer set
//!   or an account script's `onWitness` trigger
//! - **Events**: an append-only log with per-kind emission permissions
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nexus_config::RuntimeSettings;
//! use nexus_core::Timestamp;
//! use nexus_runtime::{ChainInfo, ExecutionEngine, ExecutionEnvironment, MemoryOracle, NativeRegistry};
//! use nexus_storage::{MemoryStore, StorageChangeSet};
//! use nexus_vm::ScriptBuilder;
//!
//! let chain = ChainInfo::new("main").with_genesis(false);
//! let oracle = MemoryOracle::new();
//! let natives = NativeRegistry::with_defaults();
//! let settings = RuntimeSettings::default();
//! let env = ExecutionEnvironment::new(&chain, &oracle, &natives, &settings, Timestamp::new(0));
//!
//! let mut storage = StorageChangeSet::new(Arc::new(MemoryStore::new()));
//! let script = ScriptBuilder::new().emit_load_number(42).to_bytes();
//! let mut engine = ExecutionEngine::new(env, &mut storage, script);
//! assert!(engine.execute().is_halt());
//! ```

pub mod abi;
pub mod chain;
pub mod engine;
pub mod environment;
pub mod error;
pub mod gas;
pub mod ledger;
pub mod native;
pub mod oracle;
pub mod randomness;

pub use abi::{ContractEvent, ContractInterface, ContractMethod, ContractParameter};
pub use chain::{Chain, ChainInfo};
pub use engine::{interop_methods, AccountTrigger, ExecutionContext, ExecutionEngine};
pub use environment::ExecutionEnvironment;
pub use error::{RuntimeError, RuntimeResult};
pub use gas::GasMeter;
pub use ledger::{AccountRecord, AccountRegistry, ContractRecord, ContractRegistry};
pub use native::{
    split_gas, AccountContract, BlockContract, GasContract, GasSplit, NativeContract,
    NativeMethod, NativeRegistry,
};
pub use oracle::{MemoryOracle, Oracle, OracleError};
pub use randomness::RandomnessOracle;
