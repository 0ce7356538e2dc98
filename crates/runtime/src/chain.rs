use nexus_config::LATEST_PROTOCOL_VERSION;
use nexus_core::Address;
use serde::{Deserialize, Serialize};

/// Read-only view of the chain a transaction executes on.
pub trait Chain {
    fn name(&self) -> &str;

    /// System address of the chain itself. Never a valid witness.
    fn address(&self) -> Address {
        Address::from_name(self.name())
    }

    /// Whether the genesis block has been produced. Gas is not metered before.
    fn has_genesis(&self) -> bool;

    fn protocol_version(&self) -> u32;

    fn height(&self) -> u64;
}

/// Plain chain description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub name: String,
    pub has_genesis: bool,
    pub protocol_version: u32,
    pub height: u64,
}

impl ChainInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_genesis: true,
            protocol_version: LATEST_PROTOCOL_VERSION,
            height: 1,
        }
    }

    pub fn with_genesis(mut self, has_genesis: bool) -> Self {
        self.has_genesis = has_genesis;
        self
    }

    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }
}

impl Chain for ChainInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_genesis(&self) -> bool {
        self.has_genesis
    }

    fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    fn height(&self) -> u64 {
        self.height
    }
}
