//! Values manipulated by scripts.

use std::fmt;

use nexus_core::Address;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{VmError, VmResult};

/// A value on the operand stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VmObject {
    #[default]
    Null,
    Bool(bool),
    Number(BigInt),
    String(String),
    Bytes(Vec<u8>),
    Address(Address),
    /// Handle produced by `CTX`, consumed by `SWITCH`.
    Context(String),
}

/// Declared type of a native method parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VmType {
    None,
    Bool,
    Number,
    String,
    Bytes,
    Object,
    Any,
}

impl VmType {
    /// Whether `value` may be passed where this type is declared.
    pub fn accepts(self, value: &VmObject) -> bool {
        match (self, value) {
            (VmType::Any, _) => true,
            (VmType::None, VmObject::Null) => true,
            (VmType::Bool, VmObject::Bool(_)) => true,
            (VmType::Number, VmObject::Number(_)) => true,
            (VmType::String, VmObject::String(_)) => true,
            (VmType::Bytes, VmObject::Bytes(_) | VmObject::String(_)) => true,
            (VmType::Object, VmObject::Address(_) | VmObject::Context(_)) => true,
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VmType::None => "none",
            VmType::Bool => "bool",
            VmType::Number => "number",
            VmType::String => "string",
            VmType::Bytes => "bytes",
            VmType::Object => "object",
            VmType::Any => "any",
        }
    }
}

impl VmObject {
    pub fn type_name(&self) -> &'static str {
        match self {
            VmObject::Null => "null",
            VmObject::Bool(_) => "bool",
            VmObject::Number(_) => "number",
            VmObject::String(_) => "string",
            VmObject::Bytes(_) => "bytes",
            VmObject::Address(_) => "address",
            VmObject::Context(_) => "context",
        }
    }

    #[inline]
    pub fn number(value: impl Into<BigInt>) -> Self {
        VmObject::Number(value.into())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, VmObject::Null)
    }

    /// Truthiness used by conditional jumps.
    pub fn as_bool(&self) -> bool {
        match self {
            VmObject::Null => false,
            VmObject::Bool(value) => *value,
            VmObject::Number(value) => !value.is_zero(),
            VmObject::String(value) => !value.is_empty(),
            VmObject::Bytes(value) => value.iter().any(|b| *b != 0),
            VmObject::Address(address) => !address.is_null(),
            VmObject::Context(_) => true,
        }
    }

    pub fn as_number(&self) -> VmResult<BigInt> {
        match self {
            VmObject::Number(value) => Ok(value.clone()),
            VmObject::Bool(value) => Ok(BigInt::from(*value as u8)),
            VmObject::Bytes(bytes) => Ok(BigInt::from_signed_bytes_le(bytes)),
            other => Err(VmError::mismatch("number", other.type_name())),
        }
    }

    /// Number that must be non-negative and fit in a `u64`.
    pub fn as_u64(&self) -> VmResult<u64> {
        let value = self.as_number()?;
        if value.is_negative() {
            return Err(VmError::mismatch("unsigned number", "negative number"));
        }
        value
            .to_u64()
            .ok_or(VmError::mismatch("64-bit number", "oversized number"))
    }

    pub fn as_string(&self) -> VmResult<String> {
        match self {
            VmObject::String(value) | VmObject::Context(value) => Ok(value.clone()),
            VmObject::Bytes(bytes) => String::from_utf8(bytes.clone())
                .map_err(|_| VmError::mismatch("utf-8 string", "bytes")),
            other => Err(VmError::mismatch("string", other.type_name())),
        }
    }

    /// Byte representation used for storage values and concatenation.
    pub fn as_bytes(&self) -> VmResult<Vec<u8>> {
        match self {
            VmObject::Null => Ok(Vec::new()),
            VmObject::Bool(value) => Ok(vec![*value as u8]),
            VmObject::Number(value) => Ok(value.to_signed_bytes_le()),
            VmObject::String(value) => Ok(value.as_bytes().to_vec()),
            VmObject::Bytes(value) => Ok(value.clone()),
            VmObject::Address(address) => Ok(address.to_bytes().to_vec()),
            VmObject::Context(_) => Err(VmError::mismatch("bytes", "context")),
        }
    }

    pub fn as_address(&self) -> VmResult<Address> {
        match self {
            VmObject::Address(address) => Ok(*address),
            VmObject::Null => Ok(Address::NULL),
            VmObject::Bytes(bytes) => {
                Address::from_bytes(bytes).map_err(|_| VmError::mismatch("address", "bytes"))
            }
            other => Err(VmError::mismatch("address", other.type_name())),
        }
    }
}

impl From<bool> for VmObject {
    #[inline]
    fn from(value: bool) -> Self {
        VmObject::Bool(value)
    }
}

impl From<BigInt> for VmObject {
    #[inline]
    fn from(value: BigInt) -> Self {
        VmObject::Number(value)
    }
}

impl From<u64> for VmObject {
    #[inline]
    fn from(value: u64) -> Self {
        VmObject::Number(value.into())
    }
}

impl From<&str> for VmObject {
    #[inline]
    fn from(value: &str) -> Self {
        VmObject::String(value.to_string())
    }
}

impl From<String> for VmObject {
    #[inline]
    fn from(value: String) -> Self {
        VmObject::String(value)
    }
}

impl From<Vec<u8>> for VmObject {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        VmObject::Bytes(value)
    }
}

impl From<Address> for VmObject {
    #[inline]
    fn from(value: Address) -> Self {
        VmObject::Address(value)
    }
}

impl fmt::Display for VmObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmObject::Null => f.write_str("null"),
            VmObject::Bool(value) => write!(f, "{}", value),
            VmObject::Number(value) => write!(f, "{}", value),
            VmObject::String(value) => write!(f, "{:?}", value),
            VmObject::Bytes(value) => write!(f, "0x{}", hex::encode(value)),
            VmObject::Address(address) => write!(f, "{}", address),
            VmObject::Context(name) => write!(f, "<context {}>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_acceptance() {
        assert!(VmType::Bytes.accepts(&VmObject::String("x".into())));
        assert!(VmType::Object.accepts(&VmObject::Address(Address::NULL)));
        assert!(!VmType::Number.accepts(&VmObject::Bool(true)));
        assert!(VmType::Any.accepts(&VmObject::Null));
    }

    #[test]
    fn numbers_round_trip_through_bytes() {
        let value = VmObject::number(-1234);
        let bytes = value.as_bytes().unwrap();
        assert_eq!(VmObject::Bytes(bytes).as_number().unwrap(), BigInt::from(-1234));
    }

    #[test]
    fn unsigned_conversion_rejects_negatives() {
        assert!(VmObject::number(-1).as_u64().is_err());
        assert_eq!(VmObject::number(42u64).as_u64().unwrap(), 42);
    }

    #[test]
    fn truthiness() {
        assert!(!VmObject::Null.as_bool());
        assert!(!VmObject::Bytes(vec![0, 0]).as_bool());
        assert!(VmObject::number(3).as_bool());
        assert!(VmObject::Bool(true).as_bool());
    }
}
