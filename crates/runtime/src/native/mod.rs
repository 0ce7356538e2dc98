//! Native contracts: engine-side code exposed to scripts as contexts.

mod account;
mod block;
mod gas;
mod registry;

use nexus_core::Address;
use nexus_vm::{VmObject, VmType};

use crate::abi::{ContractInterface, ContractMethod};
use crate::engine::ExecutionEngine;
use crate::error::RuntimeResult;

pub use account::AccountContract;
pub use block::BlockContract;
pub use gas::{reward_pool_of, split_gas, GasContract, GasSplit};
pub use registry::NativeRegistry;

/// Handler invoked with arguments already popped and type-checked.
pub type NativeHandler = fn(&mut ExecutionEngine<'_>, &[VmObject]) -> RuntimeResult<VmObject>;

/// One entry of a native contract's method table.
#[derive(Clone)]
pub struct NativeMethod {
    pub name: &'static str,
    pub parameters: Vec<(&'static str, VmType)>,
    pub return_type: VmType,
    /// Charged before the arguments are popped.
    pub gas_cost: i64,
    pub handler: NativeHandler,
}

impl NativeMethod {
    pub fn new(name: &'static str, return_type: VmType, gas_cost: i64, handler: NativeHandler) -> Self {
        Self {
            name,
            parameters: Vec::new(),
            return_type,
            gas_cost,
            handler,
        }
    }

    pub fn param(mut self, name: &'static str, kind: VmType) -> Self {
        self.parameters.push((name, kind));
        self
    }

    fn to_abi(&self) -> ContractMethod {
        self.parameters.iter().fold(
            ContractMethod::new(self.name, self.return_type, 0),
            |method, (name, kind)| method.with_parameter(*name, *kind),
        )
    }
}

impl std::fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeMethod")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .field("gas_cost", &self.gas_cost)
            .finish()
    }
}

/// Builds the interface scripts see from a method table.
pub fn interface_of(methods: &[NativeMethod]) -> ContractInterface {
    ContractInterface::new(methods.iter().map(NativeMethod::to_abi).collect())
}

pub trait NativeContract: Send + Sync {
    fn name(&self) -> &'static str;

    fn methods(&self) -> &[NativeMethod];

    fn interface(&self) -> &ContractInterface;

    fn address(&self) -> Address {
        Address::from_name(self.name())
    }

    fn find_method(&self, name: &str) -> Option<&NativeMethod> {
        self.methods().iter().find(|method| method.name == name)
    }
}
