//! Context resolution, switching and cross-contract calls.

use std::rc::Rc;

use nexus_config::ENTRY_CONTEXT_NAME;
use nexus_core::Address;
use nexus_vm::{ExecutionState, Opcode, OperandStack, VmError, VmHost, VmObject, VmType};
use tracing::{debug, trace};

use super::{interop, ExecutionContext, ExecutionEngine};
use crate::error::{RuntimeError, RuntimeResult};
use crate::ledger::ContractRegistry;
use crate::native::NativeContract;

const SCRIPT_DATA_PREFIX: &[u8] = b"data.";

/// State saved when entering a context and restored when leaving it.
pub(crate) struct CallFrame {
    pub(crate) previous_context: Rc<ExecutionContext>,
    pub(crate) previous_entry_address: Address,
    pub(crate) saved_gas: u64,
}

impl<'a> ExecutionEngine<'a> {
    /// Whether the current context was entered directly from the entry script.
    pub fn is_root_context(&self) -> bool {
        self.frames
            .last()
            .map_or(false, |frame| frame.previous_context.name() == ENTRY_CONTEXT_NAME)
    }

    pub fn previous_context_name(&self) -> &str {
        match self.frames.last() {
            Some(frame) => frame.previous_context.name(),
            None => self.current.name(),
        }
    }

    /// Frames entered so far, counting those of every parent engine.
    #[inline]
    pub fn call_depth(&self) -> usize {
        self.base_depth + self.frames.len()
    }

    /// Resolves a context by name: cache, then natives, then deployed contracts.
    pub fn load_context(&mut self, name: &str) -> RuntimeResult<Rc<ExecutionContext>> {
        if self.block_operation && self.env.chain.has_genesis() {
            return Err(RuntimeError::dispatch(format!(
                "context {name} is not available during a block operation"
            )));
        }
        if let Some(context) = self.contexts.get(name) {
            return Ok(Rc::clone(context));
        }

        let context = if let Some(native) = self.env.natives.get(name) {
            ExecutionContext::Native(native)
        } else if let Some(record) = ContractRegistry::load(&*self.storage, name)? {
            ExecutionContext::script(record.name, record.script, record.interface)
        } else {
            return Err(RuntimeError::dispatch(format!("unknown context {name}")));
        };

        debug!(context = name, native = context.is_native(), "context loaded");
        let context = Rc::new(context);
        self.contexts.insert(name.to_string(), Rc::clone(&context));
        Ok(context)
    }

    /// Enters `target` for the duration of `body`.
    ///
    /// The previous context and entry address are restored whatever `body`
    /// returns. With `restore_gas`, gas used inside is forgotten as well.
    fn with_frame<T>(
        &mut self,
        target: Rc<ExecutionContext>,
        entry_address: Option<Address>,
        restore_gas: bool,
        body: impl FnOnce(&mut Self) -> RuntimeResult<T>,
    ) -> RuntimeResult<T> {
        let limit = self.env.settings.max_call_depth;
        if self.call_depth() >= limit {
            return Err(RuntimeError::CallDepthExceeded(limit));
        }

        trace!(
            from = self.current.name(),
            to = target.name(),
            depth = self.call_depth() + 1,
            "entering context"
        );
        self.frames.push(CallFrame {
            previous_context: Rc::clone(&self.current),
            previous_entry_address: self.entry_address,
            saved_gas: self.gas.used(),
        });
        self.current = target;
        if let Some(address) = entry_address {
            self.entry_address = address;
        }

        let result = body(self);

        if let Some(frame) = self.frames.pop() {
            self.current = frame.previous_context;
            self.entry_address = frame.previous_entry_address;
            if restore_gas {
                self.gas.set_used(frame.saved_gas);
            }
        }
        result
    }

    /// Switches into `name` on the caller's stack, as the `SWITCH` opcode does.
    pub fn switch_context(
        &mut self,
        name: &str,
        stack: &mut OperandStack,
    ) -> RuntimeResult<ExecutionState> {
        let context = self.load_context(name)?;
        self.with_frame(Rc::clone(&context), None, false, |engine| {
            engine.execute_context(context, stack)
        })
    }

    /// Calls `method` of `name` on a fresh stack and returns its result.
    ///
    /// The callee sees the caller's context address as entry address. Any
    /// outcome other than a halt fails with an assertion.
    pub fn call_context(
        &mut self,
        name: &str,
        method: &str,
        args: Vec<VmObject>,
    ) -> RuntimeResult<Option<VmObject>> {
        let context = self.load_context(name)?;
        let caller = self.current.address();
        let restore_gas = context.name() == self.env.settings.gas_neutral_contract;

        let mut stack = OperandStack::new(self.env.settings.max_stack_size);
        for arg in args.into_iter().rev() {
            stack.push(arg)?;
        }
        stack.push(method)?;

        let outcome = self.with_frame(Rc::clone(&context), Some(caller), restore_gas, |engine| {
            engine.execute_context(context, &mut stack)
        });
        match outcome {
            Ok(state) if state.is_halt() => Ok(stack.pop().ok()),
            Ok(state) => {
                debug!(context = name, method, ?state, "call did not halt");
                Err(RuntimeError::assertion("expected call success"))
            }
            Err(err @ (RuntimeError::OutOfGas { .. } | RuntimeError::CallDepthExceeded(_))) => {
                Err(err)
            }
            Err(err) => {
                debug!(context = name, method, error = %err, "call failed");
                Err(RuntimeError::assertion("expected call success"))
            }
        }
    }

    pub(crate) fn execute_context(
        &mut self,
        context: Rc<ExecutionContext>,
        stack: &mut OperandStack,
    ) -> RuntimeResult<ExecutionState> {
        match &*context {
            ExecutionContext::Native(contract) => self.execute_native(contract.as_ref(), stack),
            ExecutionContext::Script {
                name,
                script,
                interface,
            } => {
                let offset = if interface.is_empty() {
                    0
                } else {
                    let method = stack.pop_string()?;
                    interface
                        .find_method(&method)
                        .ok_or_else(|| {
                            RuntimeError::dispatch(format!("{name} has no method {method}"))
                        })?
                        .offset
                };
                nexus_vm::execute(script, offset, self, stack)
            }
        }
    }

    fn execute_native(
        &mut self,
        contract: &dyn NativeContract,
        stack: &mut OperandStack,
    ) -> RuntimeResult<ExecutionState> {
        let name = contract.name();
        let method_name = stack.pop_string()?;
        if contract.interface().is_empty() {
            return Err(RuntimeError::dispatch(format!("{name} exposes no methods")));
        }
        let declared = contract.interface().find_method(&method_name).ok_or_else(|| {
            RuntimeError::dispatch(format!("{name} has no method {method_name}"))
        })?;
        if stack.len() < declared.parameters.len() {
            return Err(RuntimeError::dispatch(format!(
                "{name}.{method_name} expects {} arguments, stack holds {}",
                declared.parameters.len(),
                stack.len()
            )));
        }
        let method = contract.find_method(&method_name).ok_or_else(|| {
            RuntimeError::dispatch(format!("{name}.{method_name} has no implementation"))
        })?;

        self.consume_gas(method.gas_cost)?;
        let mut args = Vec::with_capacity(method.parameters.len());
        for (_, kind) in &method.parameters {
            let value = stack.pop()?;
            if !kind.accepts(&value) {
                return Err(VmError::mismatch(kind.name(), value.type_name()).into());
            }
            args.push(value);
        }

        trace!(contract = name, method = method.name, "invoking native method");
        let result = (method.handler)(self, &args)?;
        if method.return_type != VmType::None {
            stack.push(result)?;
        }
        Ok(ExecutionState::Halt)
    }

    fn storage_key(&self, key: &[u8]) -> Vec<u8> {
        let name = self.current.name().as_bytes();
        let mut full = Vec::with_capacity(SCRIPT_DATA_PREFIX.len() + name.len() + 1 + key.len());
        full.extend_from_slice(SCRIPT_DATA_PREFIX);
        full.extend_from_slice(name);
        full.push(b'.');
        full.extend_from_slice(key);
        full
    }
}

impl<'a> VmHost for ExecutionEngine<'a> {
    type Error = RuntimeError;

    fn validate_opcode(&mut self, opcode: Opcode) -> RuntimeResult<()> {
        self.consume_gas(opcode.gas_cost())
    }

    fn extcall(&mut self, method: &str, stack: &mut OperandStack) -> RuntimeResult<()> {
        interop::invoke(self, method, stack)
    }

    fn load_context(&mut self, name: &str) -> RuntimeResult<()> {
        ExecutionEngine::load_context(self, name).map(|_| ())
    }

    fn switch_context(
        &mut self,
        name: &str,
        stack: &mut OperandStack,
    ) -> RuntimeResult<ExecutionState> {
        ExecutionEngine::switch_context(self, name, stack)
    }

    fn read(&mut self, key: &[u8]) -> RuntimeResult<Option<Vec<u8>>> {
        let key = self.storage_key(key);
        Ok(self.storage.get(&key)?)
    }

    fn write(&mut self, key: &[u8], value: Vec<u8>) -> RuntimeResult<()> {
        let key = self.storage_key(key);
        self.storage.put(key, value);
        Ok(())
    }
}
