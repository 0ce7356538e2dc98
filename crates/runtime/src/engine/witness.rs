use nexus_core::{Address, AddressKind};
use nexus_vm::VmObject;
use tracing::trace;

use super::{AccountTrigger, ExecutionEngine};
use crate::error::RuntimeResult;
use crate::ledger::AccountRegistry;

impl<'a> ExecutionEngine<'a> {
    /// Whether `address` has authorized the current operation.
    ///
    /// Checked in order: the chain itself never is, the entry address always
    /// is, a system address only while it is the current context, interop
    /// addresses never are. Without a transaction nothing else is. A user
    /// account with a registered script decides through its `onWitness`
    /// trigger once genesis exists; everyone else must have signed.
    pub fn is_witness(&mut self, address: &Address) -> RuntimeResult<bool> {
        if *address == self.env.chain.address() {
            return Ok(false);
        }
        if *address == self.entry_address {
            return Ok(true);
        }
        match address.kind() {
            AddressKind::System => return Ok(*address == self.current.address()),
            AddressKind::Interop => return Ok(false),
            AddressKind::Null | AddressKind::User => {}
        }
        let Some(transaction) = self.env.transaction else {
            return Ok(false);
        };

        if address.is_user() && self.env.chain.has_genesis() {
            if let Some(account) = AccountRegistry::load(&*self.storage, address)? {
                let accepted = self.invoke_trigger(
                    &account.script,
                    account.interface.as_ref(),
                    AccountTrigger::OnWitness,
                    vec![VmObject::Address(*address)],
                )?;
                trace!(%address, accepted, "witness decided by account script");
                return Ok(accepted);
            }
        }
        Ok(transaction.is_signed_by(address))
    }
}
