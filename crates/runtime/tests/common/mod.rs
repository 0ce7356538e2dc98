#![allow(dead_code)]

use std::sync::Arc;

use nexus_config::{RuntimeSettings, FUEL_TOKEN_SYMBOL};
use nexus_core::{Address, Timestamp, Transaction};
use nexus_runtime::{
    ledger, ChainInfo, ExecutionEngine, ExecutionEnvironment, MemoryOracle, NativeRegistry,
};
use nexus_storage::{MemoryStore, StorageChangeSet};
use num_bigint::BigUint;

pub const CHAIN: &str = "main";

/// Everything an engine borrows, owned in one place.
pub struct Fixture {
    pub chain: ChainInfo,
    pub oracle: MemoryOracle,
    pub natives: NativeRegistry,
    pub settings: RuntimeSettings,
    pub storage: StorageChangeSet,
    pub transaction: Option<Transaction>,
    pub time: Timestamp,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            chain: ChainInfo::new(CHAIN),
            oracle: MemoryOracle::new(),
            natives: NativeRegistry::with_defaults(),
            settings: RuntimeSettings::default(),
            storage: StorageChangeSet::new(Arc::new(MemoryStore::new())),
            transaction: None,
            time: Timestamp::new(1_700_000_000),
        }
    }

    pub fn pre_genesis() -> Self {
        let mut fixture = Self::new();
        fixture.chain = fixture.chain.clone().with_genesis(false);
        fixture
    }

    /// Attaches a transaction signed by `signers`.
    pub fn signed_by(mut self, signers: &[Address]) -> Self {
        let tx = signers.iter().fold(
            Transaction::new("nexus", CHAIN, vec![0x00], self.time.saturating_add(60)),
            |tx, signer| tx.with_signer(*signer),
        );
        self.transaction = Some(tx);
        self
    }

    pub fn fund(&mut self, address: &Address, amount: u64) {
        ledger::credit_genesis(
            &mut self.storage,
            FUEL_TOKEN_SYMBOL,
            address,
            &BigUint::from(amount),
        )
        .expect("genesis credit");
    }

    pub fn balance(&self, address: &Address) -> BigUint {
        ledger::balance_of(&self.storage, FUEL_TOKEN_SYMBOL, address).expect("balance")
    }

    pub fn supply(&self) -> BigUint {
        ledger::supply_of(&self.storage, FUEL_TOKEN_SYMBOL).expect("supply")
    }

    pub fn engine(&mut self, script: Vec<u8>) -> ExecutionEngine<'_> {
        let mut env = ExecutionEnvironment::new(
            &self.chain,
            &self.oracle,
            &self.natives,
            &self.settings,
            self.time,
        );
        if let Some(tx) = &self.transaction {
            env = env.with_transaction(tx);
        }
        ExecutionEngine::new(env, &mut self.storage, script)
    }
}

pub fn user(name: &str) -> Address {
    Address::from_key(name.as_bytes())
}

pub fn fuel(amount: u64) -> BigUint {
    BigUint::from(amount)
}
