use std::fmt;

use nexus_config::HASH_SIZE;
use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::encoding::{BinDecode, BinEncode, BinRead, BinWrite, DecodeError};

pub trait Sha256 {
    fn sha256(&self) -> [u8; 32];
}

impl<T: AsRef<[u8]>> Sha256 for T {
    #[inline]
    fn sha256(&self) -> [u8; 32] {
        let mut h = sha2::Sha256::new();
        h.update(self);
        h.finalize().into()
    }
}

/// 32 byte digest identifying transactions and scripts.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    #[inline]
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn zero() -> Self {
        Self([0u8; HASH_SIZE])
    }

    /// SHA-256 of `data`.
    #[inline]
    pub fn of(data: impl AsRef<[u8]>) -> Self {
        Self(data.sha256())
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Hash {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

impl BinEncode for Hash {
    #[inline]
    fn bin_encode<W: BinWrite>(&self, writer: &mut W) {
        writer.write_bytes(&self.0);
    }
}

impl BinDecode for Hash {
    #[inline]
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError> {
        let mut buf = [0u8; HASH_SIZE];
        reader.read_into(&mut buf)?;
        Ok(Self(buf))
    }
}
