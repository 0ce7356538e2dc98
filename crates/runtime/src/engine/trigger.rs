use std::fmt;

use nexus_core::{Address, AddressKind};
use nexus_vm::VmObject;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ExecutionEngine;
use crate::abi::ContractInterface;
use crate::error::{RuntimeError, RuntimeResult};
use crate::ledger::{AccountRegistry, ContractRegistry};

/// Hooks an account script may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountTrigger {
    OnMint,
    OnBurn,
    OnSend,
    OnReceive,
    OnWitness,
    OnUpgrade,
    OnMigrate,
    OnKill,
}

impl AccountTrigger {
    /// Method name the hook is looked up and invoked by.
    pub fn name(self) -> &'static str {
        match self {
            AccountTrigger::OnMint => "onMint",
            AccountTrigger::OnBurn => "onBurn",
            AccountTrigger::OnSend => "onSend",
            AccountTrigger::OnReceive => "onReceive",
            AccountTrigger::OnWitness => "onWitness",
            AccountTrigger::OnUpgrade => "onUpgrade",
            AccountTrigger::OnMigrate => "onMigrate",
            AccountTrigger::OnKill => "onKill",
        }
    }
}

impl fmt::Display for AccountTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'a> ExecutionEngine<'a> {
    /// Runs `script` as a trigger in a nested engine and reports whether it
    /// accepted.
    ///
    /// The nested engine shares this engine's change set and environment and
    /// may spend at most the remaining gas; whatever it spends is charged here
    /// whatever the outcome. A fault inside the trigger is not an error of
    /// this execution: it is reported as `false`.
    pub fn invoke_trigger(
        &mut self,
        script: &[u8],
        interface: Option<&ContractInterface>,
        trigger: AccountTrigger,
        args: Vec<VmObject>,
    ) -> RuntimeResult<bool> {
        if script.is_empty() {
            return Ok(true);
        }
        let offset = match interface {
            Some(interface) if !interface.is_empty() => match interface.find_method(trigger.name()) {
                Some(method) => method.offset,
                None => return Ok(true),
            },
            _ => 0,
        };

        let limit = self.env.settings.max_call_depth;
        if self.call_depth() >= limit {
            return Err(RuntimeError::CallDepthExceeded(limit));
        }

        let mut initial: Vec<VmObject> = args.into_iter().rev().collect();
        initial.push(VmObject::from(trigger.name()));

        let checkpoint = self.storage.checkpoint();
        let depth = self.call_depth();
        let (state, used, accepted, events) = {
            let mut nested = ExecutionEngine::new(self.env, &mut *self.storage, script.to_vec())
                .with_gas_limit(self.gas.remaining())
                .with_gas_price(self.gas.price())
                .with_delay_payment(self.gas.delay_payment())
                .with_read_only(self.read_only);
            nested.is_trigger = true;
            nested.base_depth = depth + 1;
            nested.block_operation = self.block_operation;

            let state = nested.run(offset, initial);
            let accepted = !matches!(nested.result(), Some(VmObject::Bool(false)));
            if let Some(fault) = nested.fault() {
                warn!(%trigger, error = %fault, "trigger faulted");
            }
            (
                state,
                nested.gas.used(),
                accepted,
                std::mem::take(&mut nested.events),
            )
        };

        self.gas.absorb(used);
        if state.is_halt() {
            self.events.extend(events);
            debug!(%trigger, accepted, gas_used = used, "trigger finished");
            return Ok(accepted);
        }

        warn!(%trigger, ?state, gas_used = used, "trigger did not halt");
        if self.env.settings.rollback_failed_triggers {
            self.storage.rollback(checkpoint)?;
        }
        Ok(false)
    }

    /// Runs `trigger` for whatever hook `address` has.
    ///
    /// The null address never accepts. Users are resolved to their account
    /// script, system addresses to the contract they name; a missing hook
    /// accepts.
    pub fn invoke_trigger_on_account(
        &mut self,
        address: &Address,
        trigger: AccountTrigger,
        args: Vec<VmObject>,
    ) -> RuntimeResult<bool> {
        match address.kind() {
            AddressKind::Null => Ok(false),
            AddressKind::Interop => Ok(true),
            AddressKind::User => match AccountRegistry::load(&*self.storage, address)? {
                Some(account) => {
                    self.invoke_trigger(&account.script, account.interface.as_ref(), trigger, args)
                }
                None => Ok(true),
            },
            AddressKind::System => {
                let name = match self.env.natives.find_by_address(address) {
                    Some(native) => native.name().to_string(),
                    None => match ContractRegistry::name_of(&*self.storage, address)? {
                        Some(name) => name,
                        None => return Ok(true),
                    },
                };
                let context = self.load_context(&name)?;
                if !context.interface().has_method(trigger.name()) {
                    return Ok(true);
                }
                let checkpoint = self.storage.checkpoint();
                match self.call_context(&name, trigger.name(), args) {
                    Ok(_) => Ok(true),
                    Err(RuntimeError::Assertion(_)) => {
                        warn!(%trigger, contract = %name, "contract hook rejected");
                        if self.env.settings.rollback_failed_triggers {
                            self.storage.rollback(checkpoint)?;
                        }
                        Ok(false)
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }
}
