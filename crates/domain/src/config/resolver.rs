use std::time::Duration;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use crate::DnsName;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Combined budget for referral hops, CNAME hops and nameserver
    /// address lookups.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default = "default_max_cname_chain")]
    pub max_cname_chain: u32,

    #[serde(default = "default_max_queries_per_query")]
    pub max_queries_per_query: u32,

    #[serde(default = "default_max_total_time_ms")]
    pub max_total_time_ms: u64,

    #[serde(default = "default_network_timeout_ms")]
    pub network_timeout_ms: u64,

    /// Consecutive failures after which a server is considered down.
    #[serde(default = "default_server_down_max_fails")]
    pub server_down_max_fails: u64,

    #[serde(default = "default_server_down_throttle_secs")]
    pub server_down_throttle_secs: u64,

    #[serde(default = "default_false")]
    pub no_edns: bool,

    #[serde(default = "default_true")]
    pub do_ipv6: bool,

    #[serde(default = "default_server_id")]
    pub server_id: String,

    #[serde(default = "default_version_string")]
    pub version_string: String,

    /// Networks never sent a query, except as configured forwarders.
    #[serde(default = "default_dont_query")]
    pub dont_query: Vec<String>,

    /// Ask the hinted root servers for the real root NS set before relying
    /// on the hints.
    #[serde(default = "default_true")]
    pub prime_root_ns: bool,

    /// An authoritative NXDOMAIN from a root server covers the whole TLD.
    #[serde(default = "default_true")]
    pub root_nx_trust: bool,

    /// Zones whose servers may only hand out referrals; any other answer
    /// for a name below the apex is treated as NXDOMAIN.
    #[serde(default)]
    pub delegation_only: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_cname_chain: default_max_cname_chain(),
            max_queries_per_query: default_max_queries_per_query(),
            max_total_time_ms: default_max_total_time_ms(),
            network_timeout_ms: default_network_timeout_ms(),
            server_down_max_fails: default_server_down_max_fails(),
            server_down_throttle_secs: default_server_down_throttle_secs(),
            no_edns: default_false(),
            do_ipv6: default_true(),
            server_id: default_server_id(),
            version_string: default_version_string(),
            dont_query: default_dont_query(),
            prime_root_ns: default_true(),
            root_nx_trust: default_true(),
            delegation_only: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }

    pub fn max_total_time(&self) -> Duration {
        Duration::from_millis(self.max_total_time_ms)
    }

    pub fn server_down_throttle_time(&self) -> Duration {
        Duration::from_secs(self.server_down_throttle_secs)
    }

    pub fn dont_query_networks(&self) -> Result<Vec<IpNetwork>, ConfigError> {
        self.dont_query
            .iter()
            .map(|cidr| {
                cidr.parse::<IpNetwork>()
                    .map_err(|e| ConfigError::InvalidNetwork {
                        network: cidr.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    pub fn delegation_only_zones(&self) -> Result<Vec<DnsName>, ConfigError> {
        self.delegation_only
            .iter()
            .map(|zone| {
                DnsName::parse(zone).map_err(|e| {
                    ConfigError::Validation(format!("delegation-only zone {}: {}", zone, e))
                })
            })
            .collect()
    }
}

fn default_max_depth() -> u32 {
    40
}

fn default_max_cname_chain() -> u32 {
    10
}

fn default_max_queries_per_query() -> u32 {
    50
}

fn default_max_total_time_ms() -> u64 {
    7000
}

fn default_network_timeout_ms() -> u64 {
    1500
}

fn default_server_down_max_fails() -> u64 {
    64
}

fn default_server_down_throttle_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_server_id() -> String {
    "ferrous-recursor".to_string()
}

fn default_version_string() -> String {
    format!("ferrous-recursor {}", env!("CARGO_PKG_VERSION"))
}

fn default_dont_query() -> Vec<String> {
    [
        "127.0.0.0/8",
        "10.0.0.0/8",
        "100.64.0.0/10",
        "169.254.0.0/16",
        "192.168.0.0/16",
        "172.16.0.0/12",
        "::1/128",
        "fc00::/7",
        "fe80::/10",
        "0.0.0.0/8",
        "192.0.0.0/24",
        "192.0.2.0/24",
        "198.51.100.0/24",
        "203.0.113.0/24",
        "240.0.0.0/4",
        "::/96",
        "::ffff:0:0/96",
        "100::/64",
        "2001:db8::/32",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
