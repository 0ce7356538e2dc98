//! Contract interfaces: the methods a context exposes and where they start.

use nexus_core::EventKind;
use nexus_vm::VmType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParameter {
    pub name: String,
    pub kind: VmType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMethod {
    pub name: String,
    pub return_type: VmType,
    pub parameters: Vec<ContractParameter>,
    /// Script offset of the method body. Zero for native methods.
    pub offset: usize,
}

impl ContractMethod {
    pub fn new(name: impl Into<String>, return_type: VmType, offset: usize) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            offset,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, kind: VmType) -> Self {
        self.parameters.push(ContractParameter {
            name: name.into(),
            kind,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEvent {
    pub name: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInterface {
    pub methods: Vec<ContractMethod>,
    pub events: Vec<ContractEvent>,
}

impl ContractInterface {
    pub fn new(methods: Vec<ContractMethod>) -> Self {
        Self {
            methods,
            events: Vec::new(),
        }
    }

    pub fn find_method(&self, name: &str) -> Option<&ContractMethod> {
        self.methods.iter().find(|method| method.name == name)
    }

    #[inline]
    pub fn has_method(&self, name: &str) -> bool {
        self.find_method(name).is_some()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
