//! Programmatic construction of scripts.

use nexus_core::Address;
use num_bigint::BigInt;

use crate::opcode::Opcode;
use crate::operand;
use crate::vm_object::VmObject;

/// Helps construct scripts programmatically.
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self { script: Vec::new() }
    }

    /// Current length, usable as a jump or ABI offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.script.len()
    }

    pub fn emit(&mut self, op: Opcode) -> &mut Self {
        self.script.push(op as u8);
        self
    }

    /// Emits a jump or local call to an absolute offset.
    pub fn emit_jump(&mut self, op: Opcode, target: u16) -> &mut Self {
        debug_assert_eq!(op.fixed_operand_size(), 2);
        self.script.push(op as u8);
        self.script.extend_from_slice(&target.to_le_bytes());
        self
    }

    /// Overwrites the target of the jump emitted at `at`.
    pub fn patch_jump(&mut self, at: usize, target: u16) -> &mut Self {
        if at + 3 <= self.script.len() {
            self.script[at + 1..at + 3].copy_from_slice(&target.to_le_bytes());
        }
        self
    }

    /// Emits `LOAD` for `value`. Context handles are loaded as their name.
    pub fn emit_load(&mut self, value: impl Into<VmObject>) -> &mut Self {
        self.script.push(Opcode::LOAD as u8);
        operand::encode(&value.into(), &mut self.script);
        self
    }

    pub fn emit_load_null(&mut self) -> &mut Self {
        self.emit_load(VmObject::Null)
    }

    pub fn emit_load_number(&mut self, value: impl Into<BigInt>) -> &mut Self {
        self.emit_load(VmObject::Number(value.into()))
    }

    pub fn emit_load_address(&mut self, address: Address) -> &mut Self {
        self.emit_load(VmObject::Address(address))
    }

    /// Calls an interop service by name.
    pub fn emit_extcall(&mut self, method: &str) -> &mut Self {
        self.emit_load(method).emit(Opcode::EXTCALL)
    }

    /// Switches into `context`, which pops `method` and its arguments.
    ///
    /// Arguments are pushed in reverse so that the callee pops them in order.
    pub fn emit_context_call(
        &mut self,
        context: &str,
        method: &str,
        args: impl IntoIterator<Item = VmObject>,
    ) -> &mut Self {
        let args: Vec<VmObject> = args.into_iter().collect();
        for arg in args.into_iter().rev() {
            self.emit_load(arg);
        }
        self.emit_load(method)
            .emit_load(context)
            .emit(Opcode::CTX)
            .emit(Opcode::SWITCH)
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.script.clone()
    }

    #[inline]
    pub fn build(self) -> Vec<u8> {
        self.script
    }
}
