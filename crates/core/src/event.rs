//! Ledger events and their payloads.

use std::fmt;

use nexus_config::{
    BLOCK_CONTRACT_NAME, CONSENSUS_CONTRACT_NAME, GAS_CONTRACT_NAME, GOVERNANCE_CONTRACT_NAME,
    INTEROP_CONTRACT_NAME, MAX_CONTRACT_NAME_LENGTH, MAX_EVENT_DATA_SIZE, NEXUS_CONTRACT_NAME,
    STORAGE_CONTRACT_NAME, VALIDATOR_CONTRACT_NAME,
};
use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    encoding::{BinDecode, BinEncode, BinRead, BinWrite, DecodeError},
};

const MAX_SYMBOL_LENGTH: u64 = 16;

macro_rules! system_event_kinds {
    ($($name:ident = $value:expr),+ $(,)?) => {
        /// Event kinds defined by the protocol.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum SystemEventKind {
            $($name = $value),+
        }

        impl SystemEventKind {
            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($value => Some(SystemEventKind::$name),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(SystemEventKind::$name => stringify!($name),)+
                }
            }
        }
    };
}

system_event_kinds! {
    Unknown = 0,
    ChainCreate = 1,
    TokenCreate = 2,
    TokenSend = 3,
    TokenReceive = 4,
    TokenMint = 5,
    TokenBurn = 6,
    TokenStake = 7,
    TokenClaim = 8,
    AddressRegister = 9,
    AddressLink = 10,
    AddressUnlink = 11,
    OrganizationCreate = 12,
    OrganizationAdd = 13,
    OrganizationRemove = 14,
    GasEscrow = 15,
    GasPayment = 16,
    GasLoan = 17,
    OrderCreated = 18,
    OrderCancelled = 19,
    OrderFilled = 20,
    OrderClosed = 21,
    FeedCreate = 22,
    FeedUpdate = 23,
    FileCreate = 24,
    FileDelete = 25,
    ValidatorPropose = 26,
    ValidatorElect = 27,
    ValidatorRemove = 28,
    ValidatorSwitch = 29,
    BrokerRequest = 30,
    ValueCreate = 31,
    ValueUpdate = 32,
    PollCreated = 33,
    PollClosed = 34,
    PollVote = 35,
    ContractRegister = 36,
    ContractDeploy = 37,
    ContractUpgrade = 38,
    Log = 39,
    Inflation = 40,
    BlockCreate = 41,
    BlockClose = 42,
    ExecutionFailure = 43,
}

impl SystemEventKind {
    /// Name of the only contract allowed to raise this kind, if restricted.
    pub fn owning_contract(self) -> Option<&'static str> {
        use SystemEventKind::*;
        match self {
            GasEscrow | GasPayment | GasLoan => Some(GAS_CONTRACT_NAME),
            PollCreated | PollClosed | PollVote => Some(CONSENSUS_CONTRACT_NAME),
            ChainCreate | TokenCreate | FeedCreate => Some(NEXUS_CONTRACT_NAME),
            FileCreate | FileDelete => Some(STORAGE_CONTRACT_NAME),
            ValidatorPropose | ValidatorElect | ValidatorRemove => Some(VALIDATOR_CONTRACT_NAME),
            BrokerRequest => Some(INTEROP_CONTRACT_NAME),
            ValueCreate | ValueUpdate => Some(GOVERNANCE_CONTRACT_NAME),
            BlockCreate | BlockClose => Some(BLOCK_CONTRACT_NAME),
            _ => None,
        }
    }
}

/// Kind of an event: a protocol kind or an application-defined one.
///
/// On the wire, bytes below [`EventKind::CUSTOM_BASE`] are protocol kinds and
/// the range above it holds custom kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Known(SystemEventKind),
    Custom(u16),
}

impl EventKind {
    pub const CUSTOM_BASE: u8 = 64;
    pub const MAX_CUSTOM: u16 = (u8::MAX - Self::CUSTOM_BASE) as u16;

    /// Builds a custom kind, rejecting values outside the reserved range.
    pub fn custom(value: u16) -> Result<Self, DecodeError> {
        if value > Self::MAX_CUSTOM {
            return Err(DecodeError::InvalidValue {
                field: "custom event kind",
                value: value as u64,
            });
        }
        Ok(EventKind::Custom(value))
    }

    #[inline]
    pub fn owning_contract(self) -> Option<&'static str> {
        match self {
            EventKind::Known(kind) => kind.owning_contract(),
            EventKind::Custom(_) => None,
        }
    }

    pub fn to_u8(self) -> Result<u8, DecodeError> {
        match self {
            EventKind::Known(kind) => Ok(kind as u8),
            EventKind::Custom(value) if value <= Self::MAX_CUSTOM => {
                Ok(Self::CUSTOM_BASE + value as u8)
            }
            EventKind::Custom(value) => Err(DecodeError::InvalidValue {
                field: "custom event kind",
                value: value as u64,
            }),
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        if value >= Self::CUSTOM_BASE {
            return Ok(EventKind::Custom((value - Self::CUSTOM_BASE) as u16));
        }
        SystemEventKind::from_u8(value)
            .map(EventKind::Known)
            .ok_or(DecodeError::InvalidValue {
                field: "event kind",
                value: value as u64,
            })
    }
}

impl From<SystemEventKind> for EventKind {
    #[inline]
    fn from(kind: SystemEventKind) -> Self {
        EventKind::Known(kind)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Known(kind) => f.write_str(kind.as_str()),
            EventKind::Custom(value) => write!(f, "Custom({})", value),
        }
    }
}

/// An event raised during execution. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub address: Address,
    pub contract: String,
    pub data: Vec<u8>,
}

impl Event {
    pub fn new(
        kind: impl Into<EventKind>,
        address: Address,
        contract: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            kind: kind.into(),
            address,
            contract: contract.into(),
            data,
        }
    }

    /// Encodes the event, failing for out-of-range custom kinds and contract
    /// names the decoder would reject.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        if self.contract.len() > MAX_CONTRACT_NAME_LENGTH {
            return Err(DecodeError::LengthOutOfRange {
                len: self.contract.len() as u64,
                max: MAX_CONTRACT_NAME_LENGTH as u64,
            });
        }
        let mut buf = Vec::with_capacity(1 + 33 + self.data.len() + self.contract.len() + 6);
        buf.write_u8(self.kind.to_u8()?);
        self.address.bin_encode(&mut buf);
        buf.write_var_bytes(&self.data);
        buf.write_var_string(&self.contract);
        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_bin(bytes)
    }
}

impl BinDecode for Event {
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError> {
        let kind = EventKind::from_u8(reader.read_u8()?)?;
        let address = Address::bin_decode(reader)?;
        let data = reader.read_var_bytes(MAX_EVENT_DATA_SIZE as u64)?;
        let contract = reader.read_var_string(MAX_CONTRACT_NAME_LENGTH as u64)?;
        Ok(Self {
            kind,
            address,
            contract,
            data,
        })
    }
}

/// Payload of `GasEscrow`, `GasPayment` and `GasLoan` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEventData {
    pub address: Address,
    pub price: u64,
    pub amount: u64,
}

impl GasEventData {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_bin(bytes)
    }
}

impl BinEncode for GasEventData {
    fn bin_encode<W: BinWrite>(&self, writer: &mut W) {
        self.address.bin_encode(writer);
        writer.write_u64(self.price);
        writer.write_u64(self.amount);
    }
}

impl BinDecode for GasEventData {
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError> {
        Ok(Self {
            address: Address::bin_decode(reader)?,
            price: reader.read_u64()?,
            amount: reader.read_u64()?,
        })
    }
}

/// Payload of token events. `value` is a little-endian unsigned integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEventData {
    pub symbol: String,
    pub value: Vec<u8>,
    pub chain: String,
}

impl TokenEventData {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_bin(bytes)
    }
}

impl BinEncode for TokenEventData {
    fn bin_encode<W: BinWrite>(&self, writer: &mut W) {
        writer.write_var_string(&self.symbol);
        writer.write_var_bytes(&self.value);
        writer.write_var_string(&self.chain);
    }
}

impl BinDecode for TokenEventData {
    fn bin_decode<R: BinRead>(reader: &mut R) -> Result<Self, DecodeError> {
        Ok(Self {
            symbol: reader.read_var_string(MAX_SYMBOL_LENGTH)?,
            value: reader.read_var_bytes(64)?,
            chain: reader.read_var_string(MAX_CONTRACT_NAME_LENGTH as u64)?,
        })
    }
}
