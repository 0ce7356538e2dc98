use nexus_config::RuntimeSettings;
use nexus_core::{Timestamp, Transaction};

use crate::chain::Chain;
use crate::native::NativeRegistry;
use crate::oracle::Oracle;

/// Everything an execution reads but never writes.
///
/// Nested trigger executions receive a copy, so they observe the same chain,
/// time and transaction as their parent.
#[derive(Clone, Copy)]
pub struct ExecutionEnvironment<'a> {
    pub chain: &'a dyn Chain,
    pub transaction: Option<&'a Transaction>,
    pub oracle: &'a dyn Oracle,
    pub natives: &'a NativeRegistry,
    pub settings: &'a RuntimeSettings,
    pub time: Timestamp,
}

impl<'a> ExecutionEnvironment<'a> {
    pub fn new(
        chain: &'a dyn Chain,
        oracle: &'a dyn Oracle,
        natives: &'a NativeRegistry,
        settings: &'a RuntimeSettings,
        time: Timestamp,
    ) -> Self {
        Self {
            chain,
            transaction: None,
            oracle,
            natives,
            settings,
            time,
        }
    }

    pub fn with_transaction(mut self, transaction: &'a Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }
}
