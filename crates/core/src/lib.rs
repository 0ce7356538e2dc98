//! # Nexus Core
//!
//! Ledger primitives shared by the storage layer, the virtual machine and the
//! execution runtime.
//!
//! - **Encoding**: the little-endian wire format with varint length prefixes
//! - **Identity**: [`Address`], [`Hash`] and [`Timestamp`]
//! - **Ledger data**: [`Transaction`] and [`Event`] with their payloads

pub mod address;
pub mod encoding;
pub mod event;
pub mod hash;
pub mod timestamp;
pub mod transaction;

pub use address::{Address, AddressKind};
pub use encoding::{BinDecode, BinEncode, BinRead, BinWrite, DecodeError, SliceReader};
pub use event::{Event, EventKind, GasEventData, SystemEventKind, TokenEventData};
pub use hash::{Hash, Sha256};
pub use timestamp::Timestamp;
pub use transaction::Transaction;
