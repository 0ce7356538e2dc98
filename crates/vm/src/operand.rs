//! Encoding of the tagged `LOAD` operand.

use nexus_core::{Address, BinDecode, BinEncode, BinRead, BinWrite, DecodeError, SliceReader};
use num_bigint::BigInt;

use crate::vm_object::VmObject;

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_NUMBER: u8 = 2;
const TAG_STRING: u8 = 3;
const TAG_BYTES: u8 = 4;
const TAG_ADDRESS: u8 = 5;

const MAX_LOAD_SIZE: u64 = 0xFFFF;

/// Context handles have no literal form and are written as their name.
pub(crate) fn encode(value: &VmObject, out: &mut Vec<u8>) {
    match value {
        VmObject::Null => out.write_u8(TAG_NULL),
        VmObject::Bool(flag) => {
            out.write_u8(TAG_BOOL);
            out.write_u8(*flag as u8);
        }
        VmObject::Number(number) => {
            out.write_u8(TAG_NUMBER);
            out.write_var_bytes(&number.to_signed_bytes_le());
        }
        VmObject::String(text) | VmObject::Context(text) => {
            out.write_u8(TAG_STRING);
            out.write_var_string(text);
        }
        VmObject::Bytes(bytes) => {
            out.write_u8(TAG_BYTES);
            out.write_var_bytes(bytes);
        }
        VmObject::Address(address) => {
            out.write_u8(TAG_ADDRESS);
            address.bin_encode(out);
        }
    }
}

/// Decodes the operand at the start of `bytes`, returning it with its length.
pub(crate) fn decode(bytes: &[u8]) -> Result<(VmObject, usize), DecodeError> {
    let mut reader = SliceReader::new(bytes);
    let value = match reader.read_u8()? {
        TAG_NULL => VmObject::Null,
        TAG_BOOL => VmObject::Bool(reader.read_u8()? != 0),
        TAG_NUMBER => {
            VmObject::Number(BigInt::from_signed_bytes_le(&reader.read_var_bytes(MAX_LOAD_SIZE)?))
        }
        TAG_STRING => VmObject::String(reader.read_var_string(MAX_LOAD_SIZE)?),
        TAG_BYTES => VmObject::Bytes(reader.read_var_bytes(MAX_LOAD_SIZE)?),
        TAG_ADDRESS => VmObject::Address(Address::bin_decode(&mut reader)?),
        tag => {
            return Err(DecodeError::InvalidValue {
                field: "load tag",
                value: tag as u64,
            })
        }
    };
    Ok((value, reader.consumed()))
}
