use std::fmt;
use std::sync::Arc;

use nexus_core::Address;

use crate::abi::ContractInterface;
use crate::native::NativeContract;

/// A named unit of code that `SWITCH` and `call_context` can enter.
///
/// Contexts are created once per execution and shared through `Rc`; they are
/// never mutated afterwards.
pub enum ExecutionContext {
    Native(Arc<dyn NativeContract>),
    Script {
        name: String,
        script: Vec<u8>,
        interface: ContractInterface,
    },
}

impl ExecutionContext {
    pub fn script(name: impl Into<String>, script: Vec<u8>, interface: ContractInterface) -> Self {
        ExecutionContext::Script {
            name: name.into(),
            script,
            interface,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ExecutionContext::Native(contract) => contract.name(),
            ExecutionContext::Script { name, .. } => name,
        }
    }

    /// System address derived from the context name.
    pub fn address(&self) -> Address {
        Address::from_name(self.name())
    }

    pub fn interface(&self) -> &ContractInterface {
        match self {
            ExecutionContext::Native(contract) => contract.interface(),
            ExecutionContext::Script { interface, .. } => interface,
        }
    }

    /// Script bytes; empty for native contexts.
    pub fn code(&self) -> &[u8] {
        match self {
            ExecutionContext::Native(_) => &[],
            ExecutionContext::Script { script, .. } => script,
        }
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self, ExecutionContext::Native(_))
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::Native(contract) => {
                f.debug_tuple("Native").field(&contract.name()).finish()
            }
            ExecutionContext::Script { name, script, .. } => f
                .debug_struct("Script")
                .field("name", name)
                .field("script_len", &script.len())
                .finish(),
        }
    }
}
