use nexus_config::{ACCOUNT_CONTRACT_NAME, MAX_SCRIPT_SIZE};
use nexus_core::{BinEncode, SystemEventKind};
use nexus_vm::{VmObject, VmType};

use super::{interface_of, NativeContract, NativeMethod};
use crate::abi::ContractInterface;
use crate::engine::{AccountTrigger, ExecutionEngine};
use crate::error::{ensure, RuntimeResult};
use crate::ledger::{AccountRecord, AccountRegistry};

/// Attaches scripts to user accounts.
pub struct AccountContract {
    methods: Vec<NativeMethod>,
    interface: ContractInterface,
}

impl AccountContract {
    pub fn new() -> Self {
        let methods = vec![
            NativeMethod::new("registerScript", VmType::None, 5, register_script)
                .param("target", VmType::Object)
                .param("script", VmType::Bytes),
            NativeMethod::new("hasScript", VmType::Bool, 1, has_script)
                .param("target", VmType::Object),
        ];
        let interface = interface_of(&methods);
        Self { methods, interface }
    }
}

impl Default for AccountContract {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeContract for AccountContract {
    fn name(&self) -> &'static str {
        ACCOUNT_CONTRACT_NAME
    }

    fn methods(&self) -> &[NativeMethod] {
        &self.methods
    }

    fn interface(&self) -> &ContractInterface {
        &self.interface
    }
}

fn register_script(engine: &mut ExecutionEngine<'_>, args: &[VmObject]) -> RuntimeResult<VmObject> {
    let target = args[0].as_address()?;
    let script = args[1].as_bytes()?;

    ensure(target.is_user(), "scripts can only be attached to user addresses")?;
    ensure(engine.is_witness(&target)?, "invalid witness")?;
    ensure(!script.is_empty(), "account script is empty")?;
    ensure(script.len() <= MAX_SCRIPT_SIZE, "account script too large")?;

    // A replaced script must agree to its own upgrade.
    if let Some(previous) = AccountRegistry::load(engine.storage(), &target)? {
        let accepted = engine.invoke_trigger(
            &previous.script,
            previous.interface.as_ref(),
            AccountTrigger::OnUpgrade,
            vec![VmObject::Address(target)],
        )?;
        ensure(accepted, "upgrade rejected by account trigger")?;
    }

    let record = AccountRecord {
        script,
        interface: None,
    };
    AccountRegistry::register(&mut *engine.storage, &target, &record)?;
    engine.notify(SystemEventKind::AddressRegister, target, target.to_bin())?;
    Ok(VmObject::Null)
}

fn has_script(engine: &mut ExecutionEngine<'_>, args: &[VmObject]) -> RuntimeResult<VmObject> {
    let target = args[0].as_address()?;
    let registered = AccountRegistry::load(engine.storage(), &target)?.is_some();
    Ok(VmObject::from(registered))
}
