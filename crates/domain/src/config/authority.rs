use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::root_hints::parse_server_addr;

/// A locally served zone. Without forwarders the records are the whole
/// truth for the zone; with forwarders every query below the zone name is
/// sent to them instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorityZoneConfig {
    pub name: String,

    #[serde(default)]
    pub forwarders: Vec<String>,

    /// Send RD=1 to the forwarders and accept their answer as final.
    #[serde(default)]
    pub recurse: bool,

    #[serde(default)]
    pub records: Vec<ZoneRecordConfig>,
}

impl AuthorityZoneConfig {
    pub fn forwarder_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        self.forwarders
            .iter()
            .map(|f| parse_server_addr(f))
            .collect()
    }

    pub fn is_forwarding(&self) -> bool {
        !self.forwarders.is_empty()
    }
}

/// One record in presentation form. `name` is relative to the zone unless
/// it ends in a dot; `@` is the apex.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneRecordConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub record_type: String,

    #[serde(default = "default_record_ttl")]
    pub ttl: u32,

    pub data: String,
}

fn default_record_ttl() -> u32 {
    3600
}
