//! Nexus Configuration Module
//!
//! Protocol constants shared by every crate of the runtime, plus the
//! [`RuntimeSettings`] that a node loads from its TOML configuration.
//!
//! Everything declared as a `const` here is consensus-relevant: changing a
//! value changes the result of replaying a transaction.

mod error;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::RuntimeSettings;

/// Size of a hash in bytes.
pub const HASH_SIZE: usize = 32;
/// Size of an address in bytes (kind byte followed by a 32 byte hash).
pub const ADDRESS_SIZE: usize = 1 + HASH_SIZE;
/// Maximum script size in bytes.
pub const MAX_SCRIPT_SIZE: usize = 65536;
/// Maximum size of a single event payload.
pub const MAX_EVENT_DATA_SIZE: usize = 65536;
/// Maximum length of a contract name, which events carry on the wire.
pub const MAX_CONTRACT_NAME_LENGTH: usize = 64;

/// Name under which the transaction script is registered as a context.
pub const ENTRY_CONTEXT_NAME: &str = "entry";

/// Symbol of the token used to pay for gas.
pub const FUEL_TOKEN_SYMBOL: &str = "FUEL";

/// Native contract names.
pub const GAS_CONTRACT_NAME: &str = "gas";
pub const BLOCK_CONTRACT_NAME: &str = "block";
pub const ACCOUNT_CONTRACT_NAME: &str = "account";
pub const NEXUS_CONTRACT_NAME: &str = "nexus";
pub const CONSENSUS_CONTRACT_NAME: &str = "consensus";
pub const STORAGE_CONTRACT_NAME: &str = "storage";
pub const VALIDATOR_CONTRACT_NAME: &str = "validator";
pub const INTEROP_CONTRACT_NAME: &str = "interop";
pub const GOVERNANCE_CONTRACT_NAME: &str = "governance";

/// First protocol version that burns `burn_gas * price` fuel from the gas
/// contract's own balance instead of raw gas units from the payer.
pub const GAS_BURN_FIX_VERSION: u32 = 8;

/// Latest protocol version understood by this runtime.
pub const LATEST_PROTOCOL_VERSION: u32 = 9;

/// Multiplier of the deterministic random generator.
pub const RANDOM_MULTIPLIER: u64 = 16807;
/// Modulus of the deterministic random generator (2^31 - 1).
pub const RANDOM_MODULUS: u64 = 2_147_483_647;

/// Seconds in a day, used by the inflation schedule.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Default gas ceiling before a `GasEscrow` event sets the real one.
pub const DEFAULT_GAS_LIMIT: u64 = 10_000;
/// Default floor for the gas price accepted by `GasEscrow`.
pub const DEFAULT_MIN_GAS_FEE: u64 = 1;
/// Default maximum depth of nested contexts and triggers.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;
/// Default maximum number of items on an operand stack.
pub const DEFAULT_MAX_STACK_SIZE: usize = 2048;
/// Default interval between inflation rounds (one year).
pub const DEFAULT_INFLATION_PERIOD: u32 = 365 * SECONDS_PER_DAY;
