//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("config: failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML for [`crate::RuntimeSettings`].
    #[error("config: failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting holds a value the runtime cannot work with.
    #[error("config: invalid value for '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    #[inline]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
