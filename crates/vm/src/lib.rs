//! # Nexus Virtual Machine
//!
//! A compact stack machine for transaction and contract scripts.
//!
//! The interpreter knows nothing about ledgers: gas, storage, interop
//! services and context switching are reached through the [`VmHost`] trait,
//! implemented by the runtime's execution engine.

mod error;
mod execution_state;
mod interpreter;
mod opcode;
mod operand;
mod operand_stack;
mod script_builder;
mod vm_object;

pub use error::{VmError, VmResult};
pub use execution_state::ExecutionState;
pub use interpreter::{execute, VmHost, MAX_LOCAL_CALLS};
pub use opcode::Opcode;
pub use operand_stack::OperandStack;
pub use script_builder::ScriptBuilder;
pub use vm_object::{VmObject, VmType};
