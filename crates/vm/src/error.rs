use thiserror::Error;

/// Errors raised by the interpreter itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("vm: stack underflow, needed {needed} items but {available} remain")]
    StackUnderflow { needed: usize, available: usize },

    #[error("vm: stack overflow, limit is {limit}")]
    StackOverflow { limit: usize },

    #[error("vm: invalid opcode 0x{opcode:02X} at offset {offset}")]
    InvalidOpcode { opcode: u8, offset: usize },

    #[error("vm: invalid operand at offset {offset}: {reason}")]
    InvalidOperand { offset: usize, reason: String },

    #[error("vm: jump target {target} is outside the script")]
    InvalidJump { target: usize },

    #[error("vm: type mismatch, expected {expected} but found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("vm: script threw: {0}")]
    Thrown(String),
}

impl VmError {
    #[inline]
    pub fn underflow(needed: usize, available: usize) -> Self {
        VmError::StackUnderflow { needed, available }
    }

    #[inline]
    pub fn mismatch(expected: &'static str, found: &'static str) -> Self {
        VmError::TypeMismatch { expected, found }
    }

    #[inline]
    pub fn operand(offset: usize, reason: impl Into<String>) -> Self {
        VmError::InvalidOperand {
            offset,
            reason: reason.into(),
        }
    }
}

pub type VmResult<T> = Result<T, VmError>;
