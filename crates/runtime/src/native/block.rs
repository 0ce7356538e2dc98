use nexus_config::BLOCK_CONTRACT_NAME;
use nexus_core::SystemEventKind;
use nexus_vm::{VmObject, VmType};
use tracing::debug;

use super::{interface_of, NativeContract, NativeMethod};
use crate::abi::ContractInterface;
use crate::engine::ExecutionEngine;
use crate::error::{ensure, RuntimeResult};

/// Opens and closes blocks on behalf of the producing validator.
///
/// Both methods switch the engine into block-operation mode: gas is no
/// longer metered and no further context may be loaded.
pub struct BlockContract {
    methods: Vec<NativeMethod>,
    interface: ContractInterface,
}

impl BlockContract {
    pub fn new() -> Self {
        let methods = vec![
            NativeMethod::new("openBlock", VmType::None, 0, open_block)
                .param("validator", VmType::Object),
            NativeMethod::new("closeBlock", VmType::None, 0, close_block)
                .param("validator", VmType::Object),
        ];
        let interface = interface_of(&methods);
        Self { methods, interface }
    }
}

impl Default for BlockContract {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeContract for BlockContract {
    fn name(&self) -> &'static str {
        BLOCK_CONTRACT_NAME
    }

    fn methods(&self) -> &[NativeMethod] {
        &self.methods
    }

    fn interface(&self) -> &ContractInterface {
        &self.interface
    }
}

fn block_event(
    engine: &mut ExecutionEngine<'_>,
    args: &[VmObject],
    kind: SystemEventKind,
) -> RuntimeResult<VmObject> {
    let validator = args[0].as_address()?;
    ensure(engine.is_witness(&validator)?, "invalid witness")?;
    let height = engine.environment().chain.height();
    engine.notify(kind, validator, height.to_le_bytes().to_vec())?;
    debug!(%validator, height, ?kind, "block operation");
    Ok(VmObject::Null)
}

fn open_block(engine: &mut ExecutionEngine<'_>, args: &[VmObject]) -> RuntimeResult<VmObject> {
    block_event(engine, args, SystemEventKind::BlockCreate)
}

fn close_block(engine: &mut ExecutionEngine<'_>, args: &[VmObject]) -> RuntimeResult<VmObject> {
    block_event(engine, args, SystemEventKind::BlockClose)
}
