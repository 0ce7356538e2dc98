use nexus_core::Address;
use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

/// Gas account of one execution.
///
/// Whether a charge applies at all (block operations, read-only and
/// pre-genesis executions are free) is decided by the engine; the meter only
/// keeps the books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasMeter {
    used: u64,
    paid: u64,
    max: u64,
    price: u64,
    target: Address,
    delay_payment: bool,
}

impl GasMeter {
    pub fn new(max: u64) -> Self {
        Self {
            used: 0,
            paid: 0,
            max,
            price: 0,
            target: Address::NULL,
            delay_payment: false,
        }
    }

    /// Adds `cost` to the used gas, failing once the limit is passed unless
    /// payment is delayed.
    pub fn charge(&mut self, cost: i64) -> RuntimeResult<()> {
        if cost < 0 {
            return Err(RuntimeError::InvalidGas(cost));
        }
        self.used = self.used.saturating_add(cost as u64);
        if self.used > self.max && !self.delay_payment {
            return Err(RuntimeError::OutOfGas {
                used: self.used,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Adds gas spent by a nested execution. Never fails.
    #[inline]
    pub fn absorb(&mut self, used: u64) {
        self.used = self.used.saturating_add(used);
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.max.saturating_sub(self.used)
    }

    #[inline]
    pub fn used(&self) -> u64 {
        self.used
    }

    #[inline]
    pub fn paid(&self) -> u64 {
        self.paid
    }

    #[inline]
    pub fn max(&self) -> u64 {
        self.max
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.price
    }

    #[inline]
    pub fn target(&self) -> Address {
        self.target
    }

    #[inline]
    pub fn delay_payment(&self) -> bool {
        self.delay_payment
    }

    pub(crate) fn set_escrow(&mut self, max: u64, price: u64, target: Address) {
        self.max = max;
        self.price = price;
        self.target = target;
    }

    pub(crate) fn record_payment(&mut self, amount: u64, target: Address) {
        self.paid = self.paid.saturating_add(amount);
        if !target.is_null() {
            self.target = target;
        }
    }

    pub(crate) fn set_used(&mut self, used: u64) {
        self.used = used;
    }

    pub(crate) fn set_price(&mut self, price: u64) {
        self.price = price;
    }

    pub(crate) fn set_delay_payment(&mut self, delay: bool) {
        self.delay_payment = delay;
    }
}
