use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, ConfigResult, DEFAULT_GAS_LIMIT, DEFAULT_INFLATION_PERIOD,
    DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STACK_SIZE, DEFAULT_MIN_GAS_FEE, NEXUS_CONTRACT_NAME,
    VALIDATOR_CONTRACT_NAME,
};

/// Node-level knobs of the execution runtime.
///
/// Every node of a network must run with the same settings, otherwise replays
/// diverge. The defaults match the public network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Gas ceiling of a fresh engine, until a `GasEscrow` event replaces it.
    pub default_gas_limit: u64,

    /// Smallest gas price accepted by a `GasEscrow` event.
    pub min_gas_fee: u64,

    /// Maximum number of nested contexts (calls, switches and triggers).
    pub max_call_depth: usize,

    /// Maximum number of items on one operand stack.
    pub max_stack_size: usize,

    /// Seconds between two inflation rounds.
    pub inflation_period: u32,

    /// Contract whose nested calls leave `UsedGas` untouched.
    pub gas_neutral_contract: String,

    /// Contract whose address collects the validator share of spent gas.
    pub validator_reward_contract: String,

    /// Undo the writes of a trigger that does not halt.
    ///
    /// Disable only to replay history produced by runtimes that leaked those
    /// writes into the changeset.
    pub rollback_failed_triggers: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            default_gas_limit: DEFAULT_GAS_LIMIT,
            min_gas_fee: DEFAULT_MIN_GAS_FEE,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            inflation_period: DEFAULT_INFLATION_PERIOD,
            gas_neutral_contract: NEXUS_CONTRACT_NAME.to_string(),
            validator_reward_contract: VALIDATOR_CONTRACT_NAME.to_string(),
            rollback_failed_triggers: true,
        }
    }
}

impl RuntimeSettings {
    /// Parses settings from a TOML document. Missing keys take their default.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let settings: RuntimeSettings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rejects settings the runtime cannot operate with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_gas_limit == 0 {
            return Err(ConfigError::invalid(
                "default_gas_limit",
                "must be greater than zero",
            ));
        }
        if self.max_call_depth == 0 {
            return Err(ConfigError::invalid("max_call_depth", "must be at least 1"));
        }
        if self.max_stack_size == 0 {
            return Err(ConfigError::invalid("max_stack_size", "must be at least 1"));
        }
        if self.inflation_period == 0 {
            return Err(ConfigError::invalid(
                "inflation_period",
                "must be greater than zero",
            ));
        }
        if self.gas_neutral_contract.is_empty() {
            return Err(ConfigError::invalid("gas_neutral_contract", "must not be empty"));
        }
        if self.validator_reward_contract.is_empty() {
            return Err(ConfigError::invalid(
                "validator_reward_contract",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = RuntimeSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.rollback_failed_triggers);
        assert_eq!(settings.gas_neutral_contract, "nexus");
    }

    #[test]
    fn zero_depth_is_rejected() {
        let settings = RuntimeSettings {
            max_call_depth: 0,
            ..RuntimeSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid {
                field: "max_call_depth",
                ..
            })
        ));
    }
}
