use nexus_config::MAX_CONTRACT_NAME_LENGTH;
use nexus_core::{Address, DecodeError};
use nexus_storage::StorageChangeSet;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::abi::ContractInterface;
use crate::error::{ensure, RuntimeResult};

const CONTRACT_PREFIX: &[u8] = b"contract.code.";
const CONTRACT_NAME_PREFIX: &[u8] = b"contract.name.";
const ACCOUNT_PREFIX: &[u8] = b"account.script.";

fn prefixed(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + suffix.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(suffix);
    key
}

fn load<T: DeserializeOwned>(storage: &StorageChangeSet, key: &[u8]) -> RuntimeResult<Option<T>> {
    match storage.get(key)? {
        Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
        None => Ok(None),
    }
}

/// A deployed script contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub name: String,
    pub script: Vec<u8>,
    pub interface: ContractInterface,
}

impl ContractRecord {
    #[inline]
    pub fn address(&self) -> Address {
        Address::from_name(&self.name)
    }
}

/// Script contracts by name, with a reverse index by address.
pub struct ContractRegistry;

impl ContractRegistry {
    pub fn deploy(storage: &mut StorageChangeSet, record: &ContractRecord) -> RuntimeResult<()> {
        ensure(
            !record.name.is_empty() && record.name.len() <= MAX_CONTRACT_NAME_LENGTH,
            "invalid contract name length",
        )?;
        storage.put(
            prefixed(CONTRACT_PREFIX, record.name.as_bytes()),
            bincode::serialize(record)?,
        );
        storage.put(
            prefixed(CONTRACT_NAME_PREFIX, &record.address().to_bytes()),
            record.name.as_bytes().to_vec(),
        );
        Ok(())
    }

    pub fn load(storage: &StorageChangeSet, name: &str) -> RuntimeResult<Option<ContractRecord>> {
        load(storage, &prefixed(CONTRACT_PREFIX, name.as_bytes()))
    }

    pub fn name_of(storage: &StorageChangeSet, address: &Address) -> RuntimeResult<Option<String>> {
        match storage.get(&prefixed(CONTRACT_NAME_PREFIX, &address.to_bytes()))? {
            Some(bytes) => Ok(Some(
                String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?,
            )),
            None => Ok(None),
        }
    }
}

/// Script attached to a user address, consulted for witnesses and token hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub script: Vec<u8>,
    /// When present, only the triggers it declares are run.
    pub interface: Option<ContractInterface>,
}

pub struct AccountRegistry;

impl AccountRegistry {
    pub fn register(
        storage: &mut StorageChangeSet,
        address: &Address,
        record: &AccountRecord,
    ) -> RuntimeResult<()> {
        storage.put(
            prefixed(ACCOUNT_PREFIX, &address.to_bytes()),
            bincode::serialize(record)?,
        );
        Ok(())
    }

    pub fn load(storage: &StorageChangeSet, address: &Address) -> RuntimeResult<Option<AccountRecord>> {
        load(storage, &prefixed(ACCOUNT_PREFIX, &address.to_bytes()))
    }
}
