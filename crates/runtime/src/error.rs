//! Error types for engine operations.

use nexus_core::DecodeError;
use nexus_storage::StorageError;
use nexus_vm::VmError;
use thiserror::Error;

use crate::oracle::OracleError;

/// Errors that end an execution in the `Fault` state.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A contract-level check failed.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// A context, method or interop service could not be resolved.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("out of gas: used {used}, limit {max}")]
    OutOfGas { used: u64, max: u64 },

    #[error("invalid gas amount {0}")]
    InvalidGas(i64),

    /// A terminal check on a halted execution failed.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error(transparent)]
    Vm(#[from] VmError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("record serialization failed: {0}")]
    Serialization(#[from] bincode::Error),
}

impl RuntimeError {
    #[inline]
    pub fn assertion(message: impl Into<String>) -> Self {
        RuntimeError::Assertion(message.into())
    }

    #[inline]
    pub fn dispatch(message: impl Into<String>) -> Self {
        RuntimeError::Dispatch(message.into())
    }

    #[inline]
    pub fn invariant(message: impl Into<String>) -> Self {
        RuntimeError::Invariant(message.into())
    }
}

/// Result type for engine operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Fails with an assertion carrying `message` unless `condition` holds.
#[inline]
pub fn ensure(condition: bool, message: &str) -> RuntimeResult<()> {
    if condition {
        Ok(())
    } else {
        Err(RuntimeError::assertion(message))
    }
}
