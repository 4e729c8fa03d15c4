use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Penalty length used when a caller passes a zero TTL.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Attempt budget used when a caller passes zero tries.
    #[serde(default = "default_tries")]
    pub default_tries: u32,

    /// Minimum spacing between opportunistic sweeps of expired entries.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
            default_tries: default_tries(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    60
}

fn default_tries() -> u32 {
    3
}

fn default_sweep_interval_secs() -> u64 {
    300
}
