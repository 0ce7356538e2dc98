use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{BinDecode, BinEncode, BinRead, BinWrite, DecodeError};

/// Seconds since the Unix epoch, as agreed by consensus for a block.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(pub u32);

impl Timestamp {
    #[inline]
    pub const fn new(seconds: u32) -> Self {
        Self(seconds)
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn saturating_add(self, seconds: u32) -> Self {
        Self(self.0.saturating_add(seconds))
    }
}

impl From<u32> for Timestamp {
    #[inline]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl BinEncode for Timestamp {
    #[inline]
    fn bin_encode<W: BinWrite>(&self, writer: &mut W) {
        writer.write_u32(self.0);
    }
}

impl BinDecode for Timestamp {
    #[inline]
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError> {
        Ok(Self(reader.read_u32()?))
    }
}
