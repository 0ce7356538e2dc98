//! The `gas` contract: escrow of fuel tokens for the gas a transaction spends.
//!
//! A transaction first calls `allowGas`, which moves `price * limit` tokens
//! into the contract and raises `GasEscrow` to set the engine's gas limit.
//! Its last call is `spendGas`, which settles the gas actually used, refunds
//! the rest and raises `GasPayment`.

use nexus_config::{FUEL_TOKEN_SYMBOL, GAS_BURN_FIX_VERSION, GAS_CONTRACT_NAME};
use nexus_core::{Address, BinEncode, GasEventData, SystemEventKind, Timestamp};
use nexus_vm::{VmObject, VmType};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use tracing::{debug, info};

use super::{interface_of, NativeContract, NativeMethod};
use crate::abi::ContractInterface;
use crate::engine::ExecutionEngine;
use crate::error::{ensure, RuntimeError, RuntimeResult};
use crate::ledger::{read_amount, write_amount};

const ALLOWANCE_PREFIX: &[u8] = b"gas.allowance.";
const POOL_KEY: &[u8] = b"gas.pool";
const INFLATION_KEY: &[u8] = b"gas.inflation";

/// How the gas of a settled transaction is divided, in gas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSplit {
    pub burn: u64,
    pub target: u64,
    pub validator: u64,
}

/// Half is burned, half of the rest goes to the gas target and the remainder
/// to validators. Rounding always favours the later shares.
pub fn split_gas(used: u64) -> GasSplit {
    let burn = used / 2;
    let target = (used - burn) / 2;
    GasSplit {
        burn,
        target,
        validator: used - burn - target,
    }
}

fn allowance_key(from: &Address) -> Vec<u8> {
    let mut key = ALLOWANCE_PREFIX.to_vec();
    key.extend_from_slice(&from.to_bytes());
    key
}

fn read_u64(engine: &ExecutionEngine<'_>, key: &[u8]) -> RuntimeResult<Option<u64>> {
    match engine.storage().get(key)? {
        Some(bytes) => {
            let raw: [u8; 8] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| RuntimeError::invariant("corrupt gas allowance"))?;
            Ok(Some(u64::from_le_bytes(raw)))
        }
        None => Ok(None),
    }
}

fn last_inflation(engine: &ExecutionEngine<'_>) -> RuntimeResult<Option<Timestamp>> {
    match engine.storage().get(INFLATION_KEY)? {
        Some(bytes) => {
            let raw: [u8; 4] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| RuntimeError::invariant("corrupt inflation timestamp"))?;
            Ok(Some(Timestamp::new(u32::from_le_bytes(raw))))
        }
        None => Ok(None),
    }
}

fn inflation_ready(engine: &ExecutionEngine<'_>) -> RuntimeResult<bool> {
    let period = engine.environment().settings.inflation_period;
    Ok(last_inflation(engine)?
        .map_or(false, |last| engine.time() >= last.saturating_add(period)))
}

pub struct GasContract {
    methods: Vec<NativeMethod>,
    interface: ContractInterface,
}

impl GasContract {
    pub fn new() -> Self {
        let methods = vec![
            NativeMethod::new("allowGas", VmType::None, 0, allow_gas)
                .param("from", VmType::Object)
                .param("target", VmType::Object)
                .param("price", VmType::Number)
                .param("limit", VmType::Number),
            NativeMethod::new("spendGas", VmType::None, 0, spend_gas)
                .param("from", VmType::Object),
            NativeMethod::new("allowedGas", VmType::Number, 1, allowed_gas)
                .param("from", VmType::Object),
            NativeMethod::new("rewardPool", VmType::Number, 1, reward_pool),
            NativeMethod::new("isInflationReady", VmType::Bool, 1, is_inflation_ready),
        ];
        let interface = interface_of(&methods);
        Self { methods, interface }
    }
}

impl Default for GasContract {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeContract for GasContract {
    fn name(&self) -> &'static str {
        GAS_CONTRACT_NAME
    }

    fn methods(&self) -> &[NativeMethod] {
        &self.methods
    }

    fn interface(&self) -> &ContractInterface {
        &self.interface
    }
}

fn allow_gas(engine: &mut ExecutionEngine<'_>, args: &[VmObject]) -> RuntimeResult<VmObject> {
    let from = args[0].as_address()?;
    let target = args[1].as_address()?;
    let price = args[2].as_u64()?;
    let limit = args[3].as_u64()?;

    ensure(
        engine.current_context_name() == GAS_CONTRACT_NAME,
        "allowGas must run in the gas context",
    )?;
    ensure(engine.is_root_context(), "allowGas must be called from the entry context")?;
    ensure(engine.is_witness(&from)?, "invalid witness")?;
    let key = allowance_key(&from);
    ensure(read_u64(engine, &key)?.is_none(), "gas allowance already pending")?;
    ensure(price > 0, "gas price must be positive")?;
    ensure(limit > 0, "gas limit must be positive")?;
    let max = price
        .checked_mul(limit)
        .ok_or_else(|| RuntimeError::assertion("gas allowance overflows"))?;

    let contract = Address::from_name(GAS_CONTRACT_NAME);
    engine.transfer_tokens(FUEL_TOKEN_SYMBOL, &from, &contract, &BigUint::from(max))?;
    engine.storage.put(key, max.to_le_bytes().to_vec());

    let escrow = GasEventData {
        address: target,
        price,
        amount: limit,
    };
    engine.notify(SystemEventKind::GasEscrow, from, escrow.to_bin())?;
    Ok(VmObject::Null)
}

fn spend_gas(engine: &mut ExecutionEngine<'_>, args: &[VmObject]) -> RuntimeResult<VmObject> {
    let from = args[0].as_address()?;
    ensure(engine.is_root_context(), "spendGas must be called from the entry context")?;
    let key = allowance_key(&from);
    let allowance =
        read_u64(engine, &key)?.ok_or_else(|| RuntimeError::assertion("no gas allowance"))?;

    let used = engine.gas().used();
    let price = engine.gas().price();
    let required = used
        .checked_mul(price)
        .ok_or_else(|| RuntimeError::assertion("gas cost overflows"))?;
    ensure(allowance >= required, "gas allowance exceeded")?;

    let contract = Address::from_name(GAS_CONTRACT_NAME);
    let leftover = allowance - required;
    if leftover > 0 {
        engine.transfer_tokens(FUEL_TOKEN_SYMBOL, &contract, &from, &BigUint::from(leftover))?;
    }

    let split = split_gas(used);
    let target = engine.gas().target();
    let pooled = target == engine.environment().chain.address() || target.is_null();
    let validator = Address::from_name(&engine.environment().settings.validator_reward_contract);
    let amount = |units: u64| BigUint::from(units) * price;

    if engine.environment().chain.protocol_version() >= GAS_BURN_FIX_VERSION {
        if split.burn > 0 {
            engine.burn_tokens(FUEL_TOKEN_SYMBOL, &contract, &amount(split.burn))?;
        }
        pay_target_share(engine, &contract, &target, pooled, &amount(split.target))?;
        pay(engine, &contract, &validator, &amount(split.validator))?;
    } else {
        // Legacy settlement charges the payer a second time.
        if split.burn > 0 {
            engine.burn_tokens(FUEL_TOKEN_SYMBOL, &from, &BigUint::from(split.burn))?;
        }
        pay_target_share(engine, &from, &target, pooled, &amount(split.target))?;
        pay(engine, &from, &validator, &amount(split.validator))?;
    }
    // Account hooks run by the transfers above are not billed.
    engine.gas.set_used(used);

    engine.storage.delete(key);
    let payment = GasEventData {
        address: target,
        price,
        amount: used,
    };
    engine.notify(SystemEventKind::GasPayment, from, payment.to_bin())?;
    debug!(payer = %from, used, price, refunded = leftover, "gas settled");

    check_inflation(engine)?;
    Ok(VmObject::Null)
}

fn pay(
    engine: &mut ExecutionEngine<'_>,
    from: &Address,
    to: &Address,
    amount: &BigUint,
) -> RuntimeResult<()> {
    if amount.is_zero() || from == to {
        return Ok(());
    }
    engine.transfer_tokens(FUEL_TOKEN_SYMBOL, from, to, amount)
}

fn pay_target_share(
    engine: &mut ExecutionEngine<'_>,
    from: &Address,
    target: &Address,
    pooled: bool,
    amount: &BigUint,
) -> RuntimeResult<()> {
    if !pooled {
        return pay(engine, from, target, amount);
    }
    let contract = Address::from_name(GAS_CONTRACT_NAME);
    pay(engine, from, &contract, amount)?;
    let pool = read_amount(engine.storage(), POOL_KEY)? + amount;
    write_amount(&mut *engine.storage, POOL_KEY.to_vec(), &pool);
    Ok(())
}

fn check_inflation(engine: &mut ExecutionEngine<'_>) -> RuntimeResult<()> {
    let now = engine.time();
    match last_inflation(engine)? {
        None => {
            engine.storage.put(INFLATION_KEY.to_vec(), now.to_le_bytes().to_vec());
        }
        Some(last) if inflation_ready(engine)? => {
            engine.storage.put(INFLATION_KEY.to_vec(), now.to_le_bytes().to_vec());
            info!(%last, %now, "inflation period elapsed");
            engine.notify(
                SystemEventKind::Inflation,
                Address::from_name(GAS_CONTRACT_NAME),
                now.to_le_bytes().to_vec(),
            )?;
        }
        Some(_) => {}
    }
    Ok(())
}

fn allowed_gas(engine: &mut ExecutionEngine<'_>, args: &[VmObject]) -> RuntimeResult<VmObject> {
    let from = args[0].as_address()?;
    let allowance = read_u64(engine, &allowance_key(&from))?.unwrap_or(0);
    Ok(VmObject::from(allowance))
}

fn reward_pool(engine: &mut ExecutionEngine<'_>, _args: &[VmObject]) -> RuntimeResult<VmObject> {
    let pool = read_amount(engine.storage(), POOL_KEY)?;
    Ok(VmObject::Number(BigInt::from(pool)))
}

fn is_inflation_ready(
    engine: &mut ExecutionEngine<'_>,
    _args: &[VmObject],
) -> RuntimeResult<VmObject> {
    Ok(VmObject::from(inflation_ready(engine)?))
}

/// Current reward pool, read outside any execution.
pub fn reward_pool_of(storage: &nexus_storage::StorageChangeSet) -> RuntimeResult<BigUint> {
    read_amount(storage, POOL_KEY)
}
