use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_max_negative_entries")]
    pub max_negative_entries: usize,

    /// TTL floor applied at insert time.
    #[serde(default)]
    pub min_ttl: u32,

    /// TTL ceiling applied at insert time.
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,

    #[serde(default = "default_max_negative_ttl")]
    pub max_negative_ttl: u32,

    #[serde(default = "default_batch_eviction_percentage")]
    pub batch_eviction_percentage: f64,

    #[serde(default = "default_shard_amount")]
    pub shard_amount: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_negative_entries: default_max_negative_entries(),
            min_ttl: 0,
            max_ttl: default_max_ttl(),
            max_negative_ttl: default_max_negative_ttl(),
            batch_eviction_percentage: default_batch_eviction_percentage(),
            shard_amount: default_shard_amount(),
        }
    }
}

fn default_max_entries() -> usize {
    200_000
}

fn default_max_negative_entries() -> usize {
    50_000
}

fn default_max_ttl() -> u32 {
    86_400
}

fn default_max_negative_ttl() -> u32 {
    3_600
}

fn default_batch_eviction_percentage() -> f64 {
    0.1
}

fn default_shard_amount() -> usize {
    64
}
