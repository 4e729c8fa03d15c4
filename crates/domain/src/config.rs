mod authority;
mod cache;
mod errors;
mod logging;
mod resolver;
mod root_hints;
mod throttle;

pub use authority::{AuthorityZoneConfig, ZoneRecordConfig};
pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use resolver::ResolverConfig;
pub use root_hints::{default_root_hints, parse_server_addr, RootHintConfig};
pub use throttle::ThrottleConfig;

use serde::{Deserialize, Serialize};

use crate::dns_name::DnsName;

/// Main configuration structure for the recursor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub throttle: ThrottleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Root server hints used to prime an empty cache
    #[serde(default = "default_root_hints")]
    pub root_hints: Vec<RootHintConfig>,

    /// Locally served and forwarded zones
    #[serde(default)]
    pub authority_zones: Vec<AuthorityZoneConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            cache: CacheConfig::default(),
            throttle: ThrottleConfig::default(),
            logging: LoggingConfig::default(),
            root_hints: default_root_hints(),
            authority_zones: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if std::path::Path::new("ferrous-recursor.toml").exists() => {
                Self::from_file("ferrous-recursor.toml")?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.max_depth == 0 {
            return Err(ConfigError::Validation(
                "resolver.max_depth cannot be 0".to_string(),
            ));
        }
        if self.resolver.network_timeout_ms == 0 || self.resolver.max_total_time_ms == 0 {
            return Err(ConfigError::Validation(
                "resolver timeouts must be positive".to_string(),
            ));
        }
        if self.cache.min_ttl > self.cache.max_ttl {
            return Err(ConfigError::Validation(format!(
                "cache.min_ttl {} is larger than cache.max_ttl {}",
                self.cache.min_ttl, self.cache.max_ttl
            )));
        }
        if !(self.cache.batch_eviction_percentage > 0.0
            && self.cache.batch_eviction_percentage <= 1.0)
        {
            return Err(ConfigError::Validation(
                "cache.batch_eviction_percentage must be in (0, 1]".to_string(),
            ));
        }

        self.resolver.dont_query_networks()?;
        self.resolver.delegation_only_zones()?;

        for hint in &self.root_hints {
            DnsName::parse(&hint.name)
                .map_err(|e| ConfigError::Validation(format!("root hint: {}", e)))?;
            hint.ip_addrs()?;
        }

        for zone in &self.authority_zones {
            DnsName::parse(&zone.name).map_err(|e| ConfigError::zone(&zone.name, e))?;
            zone.forwarder_addrs()?;
            if zone.recurse && !zone.is_forwarding() {
                return Err(ConfigError::zone(
                    &zone.name,
                    "recurse is set without forwarders",
                ));
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
