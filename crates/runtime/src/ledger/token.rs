use nexus_core::{Address, BinEncode, SystemEventKind, TokenEventData};
use nexus_storage::StorageChangeSet;
use nexus_vm::VmObject;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

use super::{read_amount, write_amount};
use crate::engine::{AccountTrigger, ExecutionEngine};
use crate::error::{ensure, RuntimeResult};

const BALANCE_PREFIX: &[u8] = b"token.balance.";
const SUPPLY_PREFIX: &[u8] = b"token.supply.";

fn balance_key(symbol: &str, address: &Address) -> Vec<u8> {
    let mut key = BALANCE_PREFIX.to_vec();
    key.extend_from_slice(symbol.as_bytes());
    key.push(b'.');
    key.extend_from_slice(&address.to_bytes());
    key
}

fn supply_key(symbol: &str) -> Vec<u8> {
    let mut key = SUPPLY_PREFIX.to_vec();
    key.extend_from_slice(symbol.as_bytes());
    key
}

pub fn balance_of(
    storage: &StorageChangeSet,
    symbol: &str,
    address: &Address,
) -> RuntimeResult<BigUint> {
    read_amount(storage, &balance_key(symbol, address))
}

pub fn supply_of(storage: &StorageChangeSet, symbol: &str) -> RuntimeResult<BigUint> {
    read_amount(storage, &supply_key(symbol))
}

/// Allocates tokens outside of any execution, as genesis does. Runs no
/// triggers and raises no events.
pub fn credit_genesis(
    storage: &mut StorageChangeSet,
    symbol: &str,
    address: &Address,
    amount: &BigUint,
) -> RuntimeResult<()> {
    let balance = balance_of(storage, symbol, address)? + amount;
    write_amount(storage, balance_key(symbol, address), &balance);
    let supply = supply_of(storage, symbol)? + amount;
    write_amount(storage, supply_key(symbol), &supply);
    Ok(())
}

impl<'a> ExecutionEngine<'a> {
    fn token_event(&self, symbol: &str, amount: &BigUint) -> Vec<u8> {
        TokenEventData {
            symbol: symbol.to_string(),
            value: amount.to_bytes_le(),
            chain: self.env.chain.name().to_string(),
        }
        .to_bin()
    }

    fn trigger_args(symbol: &str, from: &Address, to: &Address, amount: &BigUint) -> Vec<VmObject> {
        vec![
            VmObject::Address(*from),
            VmObject::Address(*to),
            VmObject::from(symbol),
            VmObject::Number(amount.clone().into()),
        ]
    }

    pub fn balance_of(&self, symbol: &str, address: &Address) -> RuntimeResult<BigUint> {
        balance_of(&*self.storage, symbol, address)
    }

    /// Moves `amount` tokens, running the sender's `OnSend` and the
    /// receiver's `OnReceive` hooks.
    pub fn transfer_tokens(
        &mut self,
        symbol: &str,
        from: &Address,
        to: &Address,
        amount: &BigUint,
    ) -> RuntimeResult<()> {
        ensure(!amount.is_zero(), "transfer amount must be positive")?;
        ensure(from != to, "cannot transfer to self")?;
        ensure(!to.is_null(), "cannot transfer to the null address")?;

        let from_balance = self.balance_of(symbol, from)?;
        ensure(from_balance >= *amount, "insufficient balance")?;
        let to_balance = self.balance_of(symbol, to)?;
        write_amount(&mut *self.storage, balance_key(symbol, from), &(from_balance - amount));
        write_amount(&mut *self.storage, balance_key(symbol, to), &(to_balance + amount));

        let args = Self::trigger_args(symbol, from, to, amount);
        ensure(
            self.invoke_trigger_on_account(from, AccountTrigger::OnSend, args.clone())?,
            "send rejected by account trigger",
        )?;
        ensure(
            self.invoke_trigger_on_account(to, AccountTrigger::OnReceive, args)?,
            "receive rejected by account trigger",
        )?;

        let data = self.token_event(symbol, amount);
        self.notify(SystemEventKind::TokenSend, *from, data.clone())?;
        self.notify(SystemEventKind::TokenReceive, *to, data)?;
        debug!(symbol, %from, %to, %amount, "tokens transferred");
        Ok(())
    }

    pub fn mint_tokens(&mut self, symbol: &str, to: &Address, amount: &BigUint) -> RuntimeResult<()> {
        ensure(!amount.is_zero(), "mint amount must be positive")?;
        ensure(!to.is_null(), "cannot mint to the null address")?;

        let balance = self.balance_of(symbol, to)? + amount;
        write_amount(&mut *self.storage, balance_key(symbol, to), &balance);
        let supply = supply_of(&*self.storage, symbol)? + amount;
        write_amount(&mut *self.storage, supply_key(symbol), &supply);

        let args = Self::trigger_args(symbol, &Address::NULL, to, amount);
        ensure(
            self.invoke_trigger_on_account(to, AccountTrigger::OnMint, args)?,
            "mint rejected by account trigger",
        )?;
        let data = self.token_event(symbol, amount);
        self.notify(SystemEventKind::TokenMint, *to, data)
    }

    pub fn burn_tokens(&mut self, symbol: &str, from: &Address, amount: &BigUint) -> RuntimeResult<()> {
        ensure(!amount.is_zero(), "burn amount must be positive")?;

        let balance = self.balance_of(symbol, from)?;
        ensure(balance >= *amount, "insufficient balance to burn")?;
        let supply = supply_of(&*self.storage, symbol)?;
        ensure(supply >= *amount, "burn exceeds supply")?;
        write_amount(&mut *self.storage, balance_key(symbol, from), &(balance - amount));
        write_amount(&mut *self.storage, supply_key(symbol), &(supply - amount));

        let args = Self::trigger_args(symbol, from, &Address::NULL, amount);
        ensure(
            self.invoke_trigger_on_account(from, AccountTrigger::OnBurn, args)?,
            "burn rejected by account trigger",
        )?;
        let data = self.token_event(symbol, amount);
        self.notify(SystemEventKind::TokenBurn, *from, data)
    }
}
