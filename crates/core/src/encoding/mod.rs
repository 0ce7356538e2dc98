//! Binary wire format shared by every consensus-relevant structure.
//!
//! Integers are little-endian, variable-length integers use the `0xFD`/`0xFE`/
//! `0xFF` prefix scheme and byte strings are varint-length-prefixed.

mod reader;
mod varint;

pub use reader::SliceReader;
pub use varint::{read_varint, to_varint_le, write_varint};

use thiserror::Error;

/// Errors raised while decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("decode: unexpected end of input, needed {needed} bytes but {remaining} remain")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("decode: non-canonical varint tag 0x{0:02X}")]
    InvalidVarIntTag(u8),

    #[error("decode: length {len} exceeds maximum {max}")]
    LengthOutOfRange { len: u64, max: u64 },

    #[error("decode: invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: u64 },

    #[error("decode: invalid utf-8 string")]
    InvalidUtf8,

    #[error("decode: {0} trailing bytes")]
    TrailingBytes(usize),
}

/// Values that can be written in the wire format.
pub trait BinEncode {
    fn bin_encode<W: BinWrite>(&self, writer: &mut W);

    #[inline]
    fn to_bin(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.bin_encode(&mut buf);
        buf
    }
}

/// Values that can be read back from the wire format.
pub trait BinDecode: Sized {
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError>;

    /// Decodes a complete buffer, rejecting trailing bytes.
    fn from_bin(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = SliceReader::new(bytes);
        let value = Self::bin_decode(&mut reader)?;
        match reader.remaining() {
            0 => Ok(value),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

/// Writer abstraction for the wire format.
pub trait BinWrite {
    /// Append raw bytes to the destination buffer.
    fn write_bytes(&mut self, bytes: &[u8]);

    #[inline]
    fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    #[inline]
    fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline]
    fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline]
    fn write_var_bytes(&mut self, value: &[u8])
    where
        Self: Sized,
    {
        write_varint(self, value.len() as u64);
        self.write_bytes(value);
    }

    #[inline]
    fn write_var_string(&mut self, value: &str)
    where
        Self: Sized,
    {
        self.write_var_bytes(value.as_bytes());
    }
}

impl BinWrite for Vec<u8> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Reader abstraction for the wire format.
pub trait BinRead {
    /// Attempt to read exactly `buf.len()` bytes into the provided slice.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), DecodeError>;

    /// Remaining bytes that can be read from this reader.
    fn remaining(&self) -> usize;

    #[inline]
    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.read_into(&mut buf)?;
        Ok(buf[0])
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        self.read_into(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        self.read_into(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let mut buf = [0u8; 8];
        self.read_into(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    #[inline]
    fn read_varint(&mut self) -> Result<u64, DecodeError>
    where
        Self: Sized,
    {
        read_varint(self)
    }

    #[inline]
    fn read_var_bytes(&mut self, max: u64) -> Result<Vec<u8>, DecodeError>
    where
        Self: Sized,
    {
        let len = self.read_varint()?;
        if len > max {
            return Err(DecodeError::LengthOutOfRange { len, max });
        }

        let mut buf = vec![0u8; len as usize];
        self.read_into(buf.as_mut_slice())?;
        Ok(buf)
    }

    #[inline]
    fn read_var_string(&mut self, max: u64) -> Result<String, DecodeError>
    where
        Self: Sized,
    {
        let bytes = self.read_var_bytes(max)?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }
}
