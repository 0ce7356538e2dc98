use std::sync::Arc;

use dashmap::DashMap;
use nexus_core::Address;

use super::{AccountContract, BlockContract, GasContract, NativeContract};

/// Registry of the native contracts available to every execution.
#[derive(Default)]
pub struct NativeRegistry {
    contracts: DashMap<&'static str, Arc<dyn NativeContract>>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self {
            contracts: DashMap::new(),
        }
    }

    /// Registry holding the `gas`, `block` and `account` contracts.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(GasContract::new());
        registry.register(BlockContract::new());
        registry.register(AccountContract::new());
        registry
    }

    pub fn register<C>(&self, contract: C)
    where
        C: NativeContract + 'static,
    {
        self.contracts.insert(contract.name(), Arc::new(contract));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn NativeContract>> {
        self.contracts.get(name).map(|c| Arc::clone(&c))
    }

    pub fn find_by_address(&self, address: &Address) -> Option<Arc<dyn NativeContract>> {
        self.contracts
            .iter()
            .find(|entry| entry.value().address() == *address)
            .map(|entry| Arc::clone(entry.value()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_by_name_and_address() {
        let registry = NativeRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        let gas = registry.get("gas").expect("gas registered");
        assert_eq!(gas.address(), Address::from_name("gas"));
        let by_address = registry
            .find_by_address(&Address::from_name("block"))
            .expect("block registered");
        assert_eq!(by_address.name(), "block");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn interfaces_mirror_method_tables() {
        let registry = NativeRegistry::with_defaults();
        let gas = registry.get("gas").expect("gas registered");
        let allow = gas.interface().find_method("allowGas").expect("declared");
        assert_eq!(allow.parameters.len(), 4);
        assert_eq!(gas.find_method("allowGas").map(|m| m.gas_cost), Some(0));
    }
}
