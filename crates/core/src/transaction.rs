use nexus_config::MAX_SCRIPT_SIZE;
use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    encoding::{BinDecode, BinEncode, BinRead, BinWrite, DecodeError},
    hash::Hash,
    timestamp::Timestamp,
};

const MAX_NAME_LENGTH: u64 = 64;
const MAX_PAYLOAD_SIZE: u64 = 4096;
const MAX_SIGNERS: u64 = 16;

/// A transaction as seen by the runtime.
///
/// Signatures are checked before a transaction reaches the engine, so only the
/// resulting signer addresses are carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub nexus: String,
    pub chain: String,
    pub script: Vec<u8>,
    pub expiration: Timestamp,
    pub payload: Vec<u8>,
    pub signers: Vec<Address>,
}

impl Transaction {
    pub fn new(
        nexus: impl Into<String>,
        chain: impl Into<String>,
        script: Vec<u8>,
        expiration: Timestamp,
    ) -> Self {
        Self {
            nexus: nexus.into(),
            chain: chain.into(),
            script,
            expiration,
            payload: Vec::new(),
            signers: Vec::new(),
        }
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_signer(mut self, signer: Address) -> Self {
        if !self.signers.contains(&signer) {
            self.signers.push(signer);
        }
        self
    }

    /// Hash of the unsigned part of the transaction.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::new();
        self.encode_unsigned(&mut buf);
        Hash::of(buf)
    }

    #[inline]
    pub fn is_signed_by(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    fn encode_unsigned<W: BinWrite>(&self, writer: &mut W) {
        writer.write_var_string(&self.nexus);
        writer.write_var_string(&self.chain);
        writer.write_var_bytes(&self.script);
        self.expiration.bin_encode(writer);
        writer.write_var_bytes(&self.payload);
    }
}

impl BinEncode for Transaction {
    fn bin_encode<W: BinWrite>(&self, writer: &mut W) {
        self.encode_unsigned(writer);
        crate::encoding::write_varint(writer, self.signers.len() as u64);
        for signer in &self.signers {
            signer.bin_encode(writer);
        }
    }
}

impl BinDecode for Transaction {
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError> {
        let nexus = reader.read_var_string(MAX_NAME_LENGTH)?;
        let chain = reader.read_var_string(MAX_NAME_LENGTH)?;
        let script = reader.read_var_bytes(MAX_SCRIPT_SIZE as u64)?;
        let expiration = Timestamp::bin_decode(reader)?;
        let payload = reader.read_var_bytes(MAX_PAYLOAD_SIZE)?;
        let count = reader.read_varint()?;
        if count > MAX_SIGNERS {
            return Err(DecodeError::LengthOutOfRange {
                len: count,
                max: MAX_SIGNERS,
            });
        }
        let signers = (0..count)
            .map(|_| Address::bin_decode(reader))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            nexus,
            chain,
            script,
            expiration,
            payload,
            signers,
        })
    }
}
