//! Instruction set of the Nexus stack machine and its gas table.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opcodes {
    ($($name:ident = $value:expr),+ $(,)?) => {
        /// Single-byte instruction codes.
        #[allow(clippy::upper_case_acronyms)]
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Opcode {
            $($name = $value),+
        }

        impl Opcode {
            #[inline]
            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($value => Some(Opcode::$name),)+
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$name => stringify!($name),)+
                }
            }
        }
    };
}

opcodes! {
    NOP = 0x00,
    RET = 0x01,
    LOAD = 0x02,
    POP = 0x03,
    DUP = 0x04,
    SWAP = 0x05,
    CALL = 0x06,
    EXTCALL = 0x07,
    JMP = 0x08,
    JMPIF = 0x09,
    JMPNOT = 0x0A,
    THROW = 0x0B,
    GET = 0x0C,
    PUT = 0x0D,
    CTX = 0x0E,
    SWITCH = 0x0F,
    NOT = 0x10,
    EQUAL = 0x11,
    ADD = 0x12,
    SUB = 0x13,
    CAT = 0x14,
    SIZE = 0x15,
}

impl Opcode {
    /// Fee charged before the instruction executes. Part of the protocol.
    pub const fn gas_cost(self) -> i64 {
        match self {
            Opcode::GET | Opcode::PUT | Opcode::CALL | Opcode::LOAD => 2,
            Opcode::EXTCALL => 3,
            Opcode::CTX => 5,
            Opcode::SWITCH => 10,
            Opcode::NOP | Opcode::RET => 0,
            _ => 1,
        }
    }

    /// Size in bytes of the fixed operand following the opcode.
    ///
    /// `LOAD` carries a tagged, variable-length operand and reports zero.
    pub const fn fixed_operand_size(self) -> usize {
        match self {
            Opcode::CALL | Opcode::JMP | Opcode::JMPIF | Opcode::JMPNOT => 2,
            _ => 0,
        }
    }
}

impl From<Opcode> for u8 {
    #[inline]
    fn from(op: Opcode) -> Self {
        op as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
