use std::fmt;

use nexus_config::{ADDRESS_SIZE, HASH_SIZE};
use serde::{Deserialize, Serialize};

use crate::{
    encoding::{BinDecode, BinEncode, BinRead, BinWrite, DecodeError},
    hash::Sha256,
};

/// What kind of entity an address identifies.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressKind {
    Null = 0,
    User = 1,
    System = 2,
    Interop = 3,
}

impl AddressKind {
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AddressKind::Null),
            1 => Some(AddressKind::User),
            2 => Some(AddressKind::System),
            3 => Some(AddressKind::Interop),
            _ => None,
        }
    }
}

/// Fixed-width ledger address: a kind byte followed by a 32 byte hash.
///
/// System addresses are derived from contract names, so a contract's address
/// never needs to be stored.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    kind: AddressKind,
    hash: [u8; HASH_SIZE],
}

impl Address {
    pub const NULL: Address = Address {
        kind: AddressKind::Null,
        hash: [0u8; HASH_SIZE],
    };

    #[inline]
    pub const fn new(kind: AddressKind, hash: [u8; HASH_SIZE]) -> Self {
        Self { kind, hash }
    }

    /// System address of the contract called `name`.
    pub fn from_name(name: &str) -> Self {
        Self::new(AddressKind::System, name.as_bytes().sha256())
    }

    /// User address owning `public_key`.
    pub fn from_key(public_key: &[u8]) -> Self {
        Self::new(AddressKind::User, public_key.sha256())
    }

    /// User address identifying a script by its content.
    pub fn from_script(script: &[u8]) -> Self {
        Self::new(AddressKind::User, script.sha256())
    }

    /// Address standing for an account on a foreign platform.
    pub fn interop(platform: &str, data: &[u8]) -> Self {
        let mut preimage = Vec::with_capacity(platform.len() + data.len());
        preimage.extend_from_slice(platform.as_bytes());
        preimage.extend_from_slice(data);
        Self::new(AddressKind::Interop, preimage.sha256())
    }

    #[inline]
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    #[inline]
    pub fn hash(&self) -> &[u8; HASH_SIZE] {
        &self.hash
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.kind == AddressKind::Null
    }

    #[inline]
    pub fn is_user(&self) -> bool {
        self.kind == AddressKind::User
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.kind == AddressKind::System
    }

    #[inline]
    pub fn is_interop(&self) -> bool {
        self.kind == AddressKind::Interop
    }

    pub fn to_bytes(&self) -> [u8; ADDRESS_SIZE] {
        let mut buf = [0u8; ADDRESS_SIZE];
        buf[0] = self.kind as u8;
        buf[1..].copy_from_slice(&self.hash);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != ADDRESS_SIZE {
            return Err(DecodeError::LengthOutOfRange {
                len: bytes.len() as u64,
                max: ADDRESS_SIZE as u64,
            });
        }
        let kind = AddressKind::from_u8(bytes[0]).ok_or(DecodeError::InvalidValue {
            field: "address kind",
            value: bytes[0] as u64,
        })?;
        let mut hash = [0u8; HASH_SIZE];
        hash.copy_from_slice(&bytes[1..]);
        if kind == AddressKind::Null && hash.iter().any(|b| *b != 0) {
            return Err(DecodeError::InvalidValue {
                field: "null address",
                value: 1,
            });
        }
        Ok(Self { kind, hash })
    }
}

impl Default for Address {
    #[inline]
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            AddressKind::Null => "N",
            AddressKind::User => "U",
            AddressKind::System => "S",
            AddressKind::Interop => "X",
        };
        write!(f, "{}{}", prefix, hex::encode(self.hash))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl BinEncode for Address {
    #[inline]
    fn bin_encode<W: BinWrite>(&self, writer: &mut W) {
        writer.write_bytes(&self.to_bytes());
    }
}

impl BinDecode for Address {
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError> {
        let mut buf = [0u8; ADDRESS_SIZE];
        reader.read_into(&mut buf)?;
        Address::from_bytes(&buf)
    }
}
