//! The per-transaction execution engine.

mod context;
mod dispatch;
mod events;
mod interop;
mod trigger;
mod witness;

use std::collections::HashMap;
use std::rc::Rc;

use nexus_config::ENTRY_CONTEXT_NAME;
use nexus_core::{Address, Event, Timestamp};
use nexus_storage::{Checkpoint, StorageChangeSet};
use nexus_vm::{ExecutionState, OperandStack, VmObject};
use num_bigint::BigUint;
use tracing::debug;

use crate::abi::ContractInterface;
use crate::environment::ExecutionEnvironment;
use crate::error::{RuntimeError, RuntimeResult};
use crate::gas::GasMeter;
use crate::randomness::RandomnessOracle;

pub use context::ExecutionContext;
pub(crate) use dispatch::CallFrame;
pub use interop::interop_methods;
pub use trigger::AccountTrigger;

/// Runs one script against the shared change set.
///
/// An engine is created per transaction, or per account trigger by a parent
/// engine. It owns the gas account and event log of that execution; storage
/// writes go to the borrowed change set and are committed by the caller.
pub struct ExecutionEngine<'a> {
    pub(crate) env: ExecutionEnvironment<'a>,
    pub(crate) storage: &'a mut StorageChangeSet,
    pub(crate) gas: GasMeter,
    pub(crate) events: Vec<Event>,
    entry_context: Rc<ExecutionContext>,
    pub(crate) entry_address: Address,
    pub(crate) current: Rc<ExecutionContext>,
    pub(crate) frames: Vec<CallFrame>,
    pub(crate) contexts: HashMap<String, Rc<ExecutionContext>>,
    read_only: bool,
    pub(crate) block_operation: bool,
    is_trigger: bool,
    /// Nesting depth of the engine that spawned this one.
    base_depth: usize,
    start: Checkpoint,
    randomness: RandomnessOracle,
    state: ExecutionState,
    fault: Option<RuntimeError>,
    result: Vec<VmObject>,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(
        env: ExecutionEnvironment<'a>,
        storage: &'a mut StorageChangeSet,
        script: Vec<u8>,
    ) -> Self {
        let entry_address = Address::from_script(&script);
        let entry = Rc::new(ExecutionContext::script(
            ENTRY_CONTEXT_NAME,
            script,
            ContractInterface::default(),
        ));
        let mut contexts = HashMap::new();
        contexts.insert(ENTRY_CONTEXT_NAME.to_string(), Rc::clone(&entry));
        let start = storage.checkpoint();

        Self {
            gas: GasMeter::new(env.settings.default_gas_limit),
            env,
            storage,
            events: Vec::new(),
            current: Rc::clone(&entry),
            entry_context: entry,
            entry_address,
            frames: Vec::new(),
            contexts,
            read_only: false,
            block_operation: false,
            is_trigger: false,
            base_depth: 0,
            start,
            randomness: RandomnessOracle::new(),
            state: ExecutionState::Running,
            fault: None,
            result: Vec::new(),
        }
    }

    pub fn with_gas_limit(mut self, max: u64) -> Self {
        self.gas = GasMeter::new(max);
        self
    }

    pub fn with_gas_price(mut self, price: u64) -> Self {
        self.gas.set_price(price);
        self
    }

    pub fn with_delay_payment(mut self, delay: bool) -> Self {
        self.gas.set_delay_payment(delay);
        self
    }

    /// Read-only executions are not metered and must not write.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_entry_address(mut self, address: Address) -> Self {
        self.entry_address = address;
        self
    }

    /// Runs the entry script to a terminal state.
    pub fn execute(&mut self) -> ExecutionState {
        self.run(0, Vec::new())
    }

    pub(crate) fn run(&mut self, offset: usize, initial: Vec<VmObject>) -> ExecutionState {
        let mut stack = OperandStack::new(self.env.settings.max_stack_size);
        let state = match self.run_entry(offset, initial, &mut stack) {
            Ok(ExecutionState::Halt) => match self.validate_halt() {
                Ok(()) => ExecutionState::Halt,
                Err(err) => self.record_fault(err),
            },
            Ok(state) => state,
            Err(err) => self.record_fault(err),
        };
        self.result = stack.items().to_vec();
        self.state = state;
        state
    }

    fn run_entry(
        &mut self,
        offset: usize,
        initial: Vec<VmObject>,
        stack: &mut OperandStack,
    ) -> RuntimeResult<ExecutionState> {
        for item in initial {
            stack.push(item)?;
        }
        let entry = Rc::clone(&self.entry_context);
        nexus_vm::execute(entry.code(), offset, self, stack)
    }

    fn validate_halt(&self) -> RuntimeResult<()> {
        if self.read_only && self.storage.checkpoint() != self.start {
            return Err(RuntimeError::invariant("read-only invariant violated"));
        }
        // Triggers are paid for by the execution that invoked them.
        if !self.is_trigger
            && self.gas.paid() < self.gas.used()
            && self.env.chain.has_genesis()
            && !self.gas.delay_payment()
        {
            return Err(RuntimeError::invariant("unpaid gas"));
        }
        Ok(())
    }

    fn record_fault(&mut self, err: RuntimeError) -> ExecutionState {
        debug!(
            error = %err,
            context = self.current.name(),
            trigger = self.is_trigger,
            gas_used = self.gas.used(),
            "execution faulted"
        );
        self.fault = Some(err);
        ExecutionState::Fault
    }

    /// Charges `cost` against the gas account.
    ///
    /// Block operations, read-only executions and executions before genesis
    /// are free.
    pub fn consume_gas(&mut self, cost: i64) -> RuntimeResult<()> {
        if cost == 0 || self.block_operation {
            return Ok(());
        }
        if cost < 0 {
            return Err(RuntimeError::InvalidGas(cost));
        }
        if self.read_only || !self.env.chain.has_genesis() {
            return Ok(());
        }
        self.gas.charge(cost)
    }

    /// Next value of the execution's deterministic random sequence.
    pub fn next_random(&mut self) -> BigUint {
        let tx_hash = self.env.transaction.map(|tx| tx.hash());
        let entry = Rc::clone(&self.entry_context);
        self.randomness.next(tx_hash, entry.code(), self.env.time)
    }

    #[inline]
    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Error that ended the execution, if it faulted with one.
    #[inline]
    pub fn fault(&self) -> Option<&RuntimeError> {
        self.fault.as_ref()
    }

    #[inline]
    pub fn gas(&self) -> &GasMeter {
        &self.gas
    }

    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Value left on top of the stack by the entry script.
    #[inline]
    pub fn result(&self) -> Option<&VmObject> {
        self.result.last()
    }

    /// Final operand stack, bottom to top.
    #[inline]
    pub fn result_stack(&self) -> &[VmObject] {
        &self.result
    }

    #[inline]
    pub fn entry_address(&self) -> Address {
        self.entry_address
    }

    #[inline]
    pub fn entry_script(&self) -> &[u8] {
        self.entry_context.code()
    }

    #[inline]
    pub fn current_context_name(&self) -> &str {
        self.current.name()
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    pub fn is_block_operation(&self) -> bool {
        self.block_operation
    }

    #[inline]
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    #[inline]
    pub fn time(&self) -> Timestamp {
        self.env.time
    }

    #[inline]
    pub fn environment(&self) -> &ExecutionEnvironment<'a> {
        &self.env
    }

    #[inline]
    pub fn storage(&self) -> &StorageChangeSet {
        &*self.storage
    }
}
