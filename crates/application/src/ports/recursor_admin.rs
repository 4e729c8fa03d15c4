use ferrous_recursor_domain::{DnsName, Timestamp};
use serde::Serialize;

/// Process-wide counters and table sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecursorStatsSnapshot {
    pub queries: u64,
    pub outgoing_queries: u64,
    pub tcp_outgoing_queries: u64,
    pub timeouts: u64,
    pub unreachables: u64,
    pub throttled_queries: u64,
    pub dont_queries: u64,
    pub auth_zone_queries: u64,
    pub no_edns_outgoing_queries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub noerror_answers: u64,
    pub nodata_answers: u64,
    pub nxdomain_answers: u64,
    pub servfail_answers: u64,
    pub cache_entries: usize,
    pub negative_cache_entries: usize,
    /// Entries dropped by both caches to stay under their size bounds.
    pub cache_evictions: u64,
    pub throttle_entries: usize,
    pub ns_speed_entries: usize,
    pub edns_status_entries: usize,
    pub failed_servers: usize,
}

/// Table maintenance exposed to management interfaces.
pub trait RecursorAdminPort: Send + Sync {
    /// Removes positive and negative entries for `name`, or for everything
    /// under it when `subtree` is set. Returns the number removed.
    fn wipe_cache(&self, name: &DnsName, subtree: bool) -> usize;

    fn clear_throttle(&self) -> usize;

    fn clear_ns_speeds(&self) -> usize;

    /// Drops reputation data not read since `limit`.
    fn prune_ns_speeds(&self, limit: Timestamp) -> usize;

    fn clear_edns_status(&self) -> usize;

    fn clear_failed_servers(&self) -> usize;

    fn stats(&self) -> RecursorStatsSnapshot;
}
