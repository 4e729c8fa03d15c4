use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

/// One root server: its name and the addresses it is reachable at.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RootHintConfig {
    pub name: String,
    pub addresses: Vec<String>,
}

impl RootHintConfig {
    pub fn ip_addrs(&self) -> Result<Vec<IpAddr>, ConfigError> {
        self.addresses
            .iter()
            .map(|addr| {
                addr.parse::<IpAddr>()
                    .map_err(|_| ConfigError::InvalidAddress(format!("{} (root hint {})", addr, self.name)))
            })
            .collect()
    }
}

const IANA_ROOT_SERVERS: &[(&str, &str, &str)] = &[
    ("a.root-servers.net.", "198.41.0.4", "2001:503:ba3e::2:30"),
    ("b.root-servers.net.", "170.247.170.2", "2801:1b8:10::b"),
    ("c.root-servers.net.", "192.33.4.12", "2001:500:2::c"),
    ("d.root-servers.net.", "199.7.91.13", "2001:500:2d::d"),
    ("e.root-servers.net.", "192.203.230.10", "2001:500:a8::e"),
    ("f.root-servers.net.", "192.5.5.241", "2001:500:2f::f"),
    ("g.root-servers.net.", "192.112.36.4", "2001:500:12::d0d"),
    ("h.root-servers.net.", "198.97.190.53", "2001:500:1::53"),
    ("i.root-servers.net.", "192.36.148.17", "2001:7fe::53"),
    ("j.root-servers.net.", "192.58.128.30", "2001:503:c27::2:30"),
    ("k.root-servers.net.", "193.0.14.129", "2001:7fd::1"),
    ("l.root-servers.net.", "199.7.83.42", "2001:500:9f::42"),
    ("m.root-servers.net.", "202.12.27.33", "2001:dc3::35"),
];

pub fn default_root_hints() -> Vec<RootHintConfig> {
    IANA_ROOT_SERVERS
        .iter()
        .map(|(name, v4, v6)| RootHintConfig {
            name: name.to_string(),
            addresses: vec![v4.to_string(), v6.to_string()],
        })
        .collect()
}

/// Parses `host`, `host:port` or `[v6]:port`, defaulting to port 53.
pub fn parse_server_addr(input: &str) -> Result<SocketAddr, ConfigError> {
    let trimmed = input.trim();
    if let Ok(addr) = trimmed.parse::<SocketAddr>() {
        return Ok(addr);
    }
    trimmed
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, 53))
        .map_err(|_| ConfigError::InvalidAddress(input.to_string()))
}
