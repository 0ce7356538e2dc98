//! Instruction loop and the host interface it calls into.

use tracing::trace;

use crate::error::{VmError, VmResult};
use crate::execution_state::ExecutionState;
use crate::opcode::Opcode;
use crate::operand;
use crate::operand_stack::OperandStack;
use crate::vm_object::VmObject;

/// Maximum nesting of local `CALL` instructions within one script run.
pub const MAX_LOCAL_CALLS: usize = 1024;

/// Services the interpreter delegates to the embedding engine.
///
/// Every method may fail with the host's own error type; the interpreter
/// propagates such failures unchanged.
pub trait VmHost {
    type Error: From<VmError>;

    /// Called once before every instruction executes.
    fn validate_opcode(&mut self, opcode: Opcode) -> Result<(), Self::Error>;

    /// Runs the interop service `method` against the stack.
    fn extcall(&mut self, method: &str, stack: &mut OperandStack) -> Result<(), Self::Error>;

    /// Resolves `name` so that a later `SWITCH` can enter it.
    fn load_context(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Enters the named context, sharing the caller's stack.
    fn switch_context(
        &mut self,
        name: &str,
        stack: &mut OperandStack,
    ) -> Result<ExecutionState, Self::Error>;

    fn read(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error>;

    fn write(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), Self::Error>;
}

fn read_target(script: &[u8], ip: usize) -> VmResult<usize> {
    match script.get(ip + 1..ip + 3) {
        Some(bytes) => Ok(u16::from_le_bytes([bytes[0], bytes[1]]) as usize),
        None => Err(VmError::operand(ip, "truncated jump target")),
    }
}

fn checked_target(script: &[u8], target: usize) -> VmResult<usize> {
    // Jumping to the end is allowed and halts.
    if target > script.len() {
        return Err(VmError::InvalidJump { target });
    }
    Ok(target)
}

/// Runs `script` from `offset` until it halts or yields a terminal state.
///
/// Falling off the end of the script, or `RET` with no pending local call,
/// halts. A `SWITCH` whose callee halts resumes this script; any other callee
/// state ends this run with that state.
pub fn execute<H: VmHost>(
    script: &[u8],
    offset: usize,
    host: &mut H,
    stack: &mut OperandStack,
) -> Result<ExecutionState, H::Error> {
    let mut ip = checked_target(script, offset)?;
    let mut calls: Vec<usize> = Vec::new();

    while ip < script.len() {
        let byte = script[ip];
        let op = Opcode::from_u8(byte).ok_or(VmError::InvalidOpcode {
            opcode: byte,
            offset: ip,
        })?;
        host.validate_opcode(op)?;

        let mut next = ip + 1 + op.fixed_operand_size();
        match op {
            Opcode::NOP => {}
            Opcode::RET => match calls.pop() {
                Some(ret) => next = ret,
                None => return Ok(ExecutionState::Halt),
            },
            Opcode::LOAD => {
                let (value, len) = operand::decode(&script[ip + 1..])
                    .map_err(|err| VmError::operand(ip, err.to_string()))?;
                stack.push(value)?;
                next = ip + 1 + len;
            }
            Opcode::POP => {
                stack.pop()?;
            }
            Opcode::DUP => {
                let top = stack.peek(0)?.clone();
                stack.push(top)?;
            }
            Opcode::SWAP => stack.swap()?,
            Opcode::CALL => {
                if calls.len() >= MAX_LOCAL_CALLS {
                    return Err(VmError::StackOverflow {
                        limit: MAX_LOCAL_CALLS,
                    }
                    .into());
                }
                calls.push(next);
                next = checked_target(script, read_target(script, ip)?)?;
            }
            Opcode::EXTCALL => {
                let method = stack.pop_string()?;
                host.extcall(&method, stack)?;
            }
            Opcode::JMP => next = checked_target(script, read_target(script, ip)?)?,
            Opcode::JMPIF | Opcode::JMPNOT => {
                let target = checked_target(script, read_target(script, ip)?)?;
                let condition = stack.pop_bool()?;
                if condition == (op == Opcode::JMPIF) {
                    next = target;
                }
            }
            Opcode::THROW => {
                let message = match stack.pop()? {
                    VmObject::String(text) => text,
                    other => other.to_string(),
                };
                return Err(VmError::Thrown(message).into());
            }
            Opcode::GET => {
                let key = stack.pop_bytes()?;
                let value = host.read(&key)?;
                stack.push(value.map(VmObject::Bytes).unwrap_or(VmObject::Null))?;
            }
            Opcode::PUT => {
                let key = stack.pop_bytes()?;
                let value = stack.pop_bytes()?;
                host.write(&key, value)?;
            }
            Opcode::CTX => {
                let name = stack.pop_string()?;
                host.load_context(&name)?;
                stack.push(VmObject::Context(name))?;
            }
            Opcode::SWITCH => {
                let name = match stack.pop()? {
                    VmObject::Context(name) => name,
                    other => return Err(VmError::mismatch("context", other.type_name()).into()),
                };
                trace!(context = %name, "switching context");
                let state = host.switch_context(&name, stack)?;
                if !state.is_halt() {
                    return Ok(state);
                }
            }
            Opcode::NOT => {
                let value = stack.pop_bool()?;
                stack.push(!value)?;
            }
            Opcode::EQUAL => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(a == b)?;
            }
            Opcode::ADD | Opcode::SUB => {
                let b = stack.pop_number()?;
                let a = stack.pop_number()?;
                let result = if op == Opcode::ADD { a + b } else { a - b };
                stack.push(VmObject::Number(result))?;
            }
            Opcode::CAT => {
                let b = stack.pop_bytes()?;
                let mut a = stack.pop_bytes()?;
                a.extend_from_slice(&b);
                stack.push(VmObject::Bytes(a))?;
            }
            Opcode::SIZE => {
                let len = match stack.pop()? {
                    VmObject::String(text) => text.len(),
                    other => other.as_bytes()?.len(),
                };
                stack.push(len as u64)?;
            }
        }
        ip = next;
    }

    Ok(ExecutionState::Halt)
}
