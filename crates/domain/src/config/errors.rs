use thiserror::Error;

/// Problems found while reading or checking the TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Failed to write config file {path}: {reason}")]
    FileWrite { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid server address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid network '{network}': {reason}")]
    InvalidNetwork { network: String, reason: String },

    #[error("Authority zone {zone}: {reason}")]
    InvalidZone { zone: String, reason: String },

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn zone(zone: impl Into<String>, reason: impl ToString) -> Self {
        ConfigError::InvalidZone {
            zone: zone.into(),
            reason: reason.to_string(),
        }
    }
}
