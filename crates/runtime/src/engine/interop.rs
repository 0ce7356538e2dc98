//! Services scripts reach through `EXTCALL`.
//!
//! Arguments are popped in declaration order, so callers push them in
//! reverse. A service that returns something pushes exactly one value.

use nexus_core::EventKind;
use nexus_vm::{OperandStack, VmObject};
use num_bigint::{BigInt, Sign};
use tracing::{info, trace};

use super::ExecutionEngine;
use crate::error::{ensure, RuntimeError, RuntimeResult};

type InteropHandler = fn(&mut ExecutionEngine<'_>, &mut OperandStack) -> RuntimeResult<()>;

static SERVICES: &[(&str, InteropHandler)] = &[
    ("Runtime.Log", runtime_log),
    ("Runtime.Notify", runtime_notify),
    ("Runtime.IsWitness", runtime_is_witness),
    ("Runtime.Random", runtime_random),
    ("Runtime.Time", runtime_time),
    ("Runtime.TransactionHash", runtime_transaction_hash),
    ("Runtime.Context", runtime_context),
    ("Runtime.PreviousContext", runtime_previous_context),
    ("Runtime.GasTarget", runtime_gas_target),
    ("Runtime.Version", runtime_version),
    ("Runtime.GetBalance", runtime_get_balance),
    ("Runtime.TransferTokens", runtime_transfer_tokens),
    ("Oracle.Read", oracle_read),
];

/// Names of every registered service.
pub fn interop_methods() -> impl Iterator<Item = &'static str> {
    SERVICES.iter().map(|(name, _)| *name)
}

pub(crate) fn invoke(
    engine: &mut ExecutionEngine<'_>,
    method: &str,
    stack: &mut OperandStack,
) -> RuntimeResult<()> {
    let handler = SERVICES
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, handler)| *handler)
        .ok_or_else(|| RuntimeError::dispatch(format!("unknown interop method {method}")))?;
    trace!(method, context = engine.current_context_name(), "interop call");
    handler(engine, stack)
}

fn unsigned_amount(value: BigInt) -> RuntimeResult<num_bigint::BigUint> {
    match value.sign() {
        Sign::Minus => Err(RuntimeError::assertion("amount must not be negative")),
        _ => Ok(value.magnitude().clone()),
    }
}

fn runtime_log(engine: &mut ExecutionEngine<'_>, stack: &mut OperandStack) -> RuntimeResult<()> {
    let message = stack.pop_string()?;
    info!(context = engine.current_context_name(), "{message}");
    Ok(())
}

fn runtime_notify(engine: &mut ExecutionEngine<'_>, stack: &mut OperandStack) -> RuntimeResult<()> {
    let raw = stack.pop()?.as_u64()?;
    let kind = u8::try_from(raw)
        .map_err(|_| RuntimeError::assertion(format!("event kind {raw} out of range")))
        .and_then(|value| EventKind::from_u8(value).map_err(RuntimeError::from))?;
    let address = stack.pop_address()?;
    let data = stack.pop_bytes()?;
    engine.notify(kind, address, data)
}

fn runtime_is_witness(
    engine: &mut ExecutionEngine<'_>,
    stack: &mut OperandStack,
) -> RuntimeResult<()> {
    let address = stack.pop_address()?;
    let witness = engine.is_witness(&address)?;
    stack.push(witness)?;
    Ok(())
}

fn runtime_random(engine: &mut ExecutionEngine<'_>, stack: &mut OperandStack) -> RuntimeResult<()> {
    let value = engine.next_random();
    stack.push(VmObject::Number(BigInt::from(value)))?;
    Ok(())
}

fn runtime_time(engine: &mut ExecutionEngine<'_>, stack: &mut OperandStack) -> RuntimeResult<()> {
    stack.push(u64::from(engine.time().value()))?;
    Ok(())
}

fn runtime_transaction_hash(
    engine: &mut ExecutionEngine<'_>,
    stack: &mut OperandStack,
) -> RuntimeResult<()> {
    let hash = engine
        .env
        .transaction
        .map(|tx| VmObject::Bytes(tx.hash().as_bytes().to_vec()))
        .unwrap_or(VmObject::Null);
    stack.push(hash)?;
    Ok(())
}

fn runtime_context(engine: &mut ExecutionEngine<'_>, stack: &mut OperandStack) -> RuntimeResult<()> {
    stack.push(engine.current_context_name().to_string())?;
    Ok(())
}

fn runtime_previous_context(
    engine: &mut ExecutionEngine<'_>,
    stack: &mut OperandStack,
) -> RuntimeResult<()> {
    stack.push(engine.previous_context_name().to_string())?;
    Ok(())
}

fn runtime_gas_target(
    engine: &mut ExecutionEngine<'_>,
    stack: &mut OperandStack,
) -> RuntimeResult<()> {
    stack.push(engine.gas.target())?;
    Ok(())
}

fn runtime_version(engine: &mut ExecutionEngine<'_>, stack: &mut OperandStack) -> RuntimeResult<()> {
    stack.push(u64::from(engine.env.chain.protocol_version()))?;
    Ok(())
}

fn runtime_get_balance(
    engine: &mut ExecutionEngine<'_>,
    stack: &mut OperandStack,
) -> RuntimeResult<()> {
    let symbol = stack.pop_string()?;
    let address = stack.pop_address()?;
    let balance = engine.balance_of(&symbol, &address)?;
    stack.push(VmObject::Number(BigInt::from(balance)))?;
    Ok(())
}

fn runtime_transfer_tokens(
    engine: &mut ExecutionEngine<'_>,
    stack: &mut OperandStack,
) -> RuntimeResult<()> {
    let symbol = stack.pop_string()?;
    let from = stack.pop_address()?;
    let to = stack.pop_address()?;
    let amount = unsigned_amount(stack.pop_number()?)?;
    ensure(engine.is_witness(&from)?, "invalid witness")?;
    engine.transfer_tokens(&symbol, &from, &to, &amount)
}

fn oracle_read(engine: &mut ExecutionEngine<'_>, stack: &mut OperandStack) -> RuntimeResult<()> {
    let url = stack.pop_string()?;
    let data = engine.env.oracle.read(&url)?;
    stack.push(data)?;
    Ok(())
}
