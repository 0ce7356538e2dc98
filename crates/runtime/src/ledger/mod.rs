//! Ledger state kept in the storage change set: token balances and the
//! contract and account registries.

mod registry;
mod token;

pub use registry::{AccountRecord, AccountRegistry, ContractRecord, ContractRegistry};
pub use token::{balance_of, credit_genesis, supply_of};

use nexus_storage::StorageChangeSet;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::RuntimeResult;

pub(crate) fn read_amount(storage: &StorageChangeSet, key: &[u8]) -> RuntimeResult<BigUint> {
    Ok(storage
        .get(key)?
        .map(|bytes| BigUint::from_bytes_le(&bytes))
        .unwrap_or_default())
}

/// Writes `amount`, deleting the key when it reaches zero.
pub(crate) fn write_amount(storage: &mut StorageChangeSet, key: Vec<u8>, amount: &BigUint) {
    if amount.is_zero() {
        storage.delete(key);
    } else {
        storage.put(key, amount.to_bytes_le());
    }
}
