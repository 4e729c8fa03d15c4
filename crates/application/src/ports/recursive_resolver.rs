use async_trait::async_trait;
use ferrous_recursor_domain::{
    DnsQuery, DnssecStatus, Placement, ResolutionStatus, ResolveError, ResourceRecord,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Answer from local data only, never touch the network.
    pub cache_only: bool,
    /// Refuse cached data whose validation state is Bogus.
    pub dnssec: bool,
    /// Ignore configured authority zones for this query.
    pub skip_out_of_band: bool,
}

impl ResolveOptions {
    pub fn cache_only() -> Self {
        Self {
            cache_only: true,
            ..Default::default()
        }
    }
}

/// Work done by a single resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionCounters {
    pub queries_sent: u32,
    pub tcp_queries: u32,
    pub throttled: u32,
    pub timeouts: u32,
    pub unreachables: u32,
    pub cache_hits: u32,
    pub auth_zone_queries: u32,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub status: ResolutionStatus,
    /// Answer chain in order, followed by any authority records.
    pub records: Vec<ResourceRecord>,
    /// False when the answer came entirely from cache or local zones.
    pub variable: bool,
    pub out_of_band: bool,
    pub validation: DnssecStatus,
    /// Reason behind a SERVFAIL.
    pub failure: Option<ResolveError>,
    pub counters: ResolutionCounters,
}

impl Resolution {
    pub fn new(status: ResolutionStatus, records: Vec<ResourceRecord>) -> Self {
        Self {
            status,
            records,
            variable: false,
            out_of_band: false,
            validation: DnssecStatus::Unknown,
            failure: None,
            counters: ResolutionCounters::default(),
        }
    }

    pub fn servfail(error: ResolveError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(ResolutionStatus::ServFail, Vec::new())
        }
    }

    pub fn answers(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(|r| r.place == Placement::Answer)
    }

    pub fn authority(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(|r| r.place == Placement::Authority)
    }

    pub fn is_servfail(&self) -> bool {
        self.status == ResolutionStatus::ServFail
    }
}

#[async_trait]
pub trait RecursiveResolver: Send + Sync {
    /// Never fails: every error is folded into a SERVFAIL resolution.
    async fn resolve(&self, query: &DnsQuery, options: ResolveOptions) -> Resolution;
}
