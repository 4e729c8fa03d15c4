use ferrous_recursor_application::ports::RecursorStatsSnapshot;
use ferrous_recursor_domain::ResolutionStatus;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters, shared by every `Recursor` built on the same
/// tables.
#[derive(Default)]
pub struct RecursorStats {
    pub queries: AtomicU64,
    pub outgoing_queries: AtomicU64,
    pub tcp_outgoing_queries: AtomicU64,
    pub timeouts: AtomicU64,
    pub unreachables: AtomicU64,
    pub throttled_queries: AtomicU64,
    pub dont_queries: AtomicU64,
    pub auth_zone_queries: AtomicU64,
    pub no_edns_outgoing_queries: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub noerror_answers: AtomicU64,
    pub nodata_answers: AtomicU64,
    pub nxdomain_answers: AtomicU64,
    pub servfail_answers: AtomicU64,
}

impl RecursorStats {
    #[inline]
    pub(super) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a new top-level query and returns its resolution id.
    pub(super) fn next_resolution_id(&self) -> u64 {
        self.queries.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(super) fn record_outcome(&self, status: ResolutionStatus) {
        let counter = match status {
            ResolutionStatus::NoError => &self.noerror_answers,
            ResolutionStatus::NoData => &self.nodata_answers,
            ResolutionStatus::NxDomain => &self.nxdomain_answers,
            ResolutionStatus::ServFail => &self.servfail_answers,
        };
        Self::bump(counter);
    }

    /// Counter values only; table sizes are filled in by the recursor.
    pub fn snapshot(&self) -> RecursorStatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        RecursorStatsSnapshot {
            queries: load(&self.queries),
            outgoing_queries: load(&self.outgoing_queries),
            tcp_outgoing_queries: load(&self.tcp_outgoing_queries),
            timeouts: load(&self.timeouts),
            unreachables: load(&self.unreachables),
            throttled_queries: load(&self.throttled_queries),
            dont_queries: load(&self.dont_queries),
            auth_zone_queries: load(&self.auth_zone_queries),
            no_edns_outgoing_queries: load(&self.no_edns_outgoing_queries),
            cache_hits: load(&self.cache_hits),
            cache_misses: load(&self.cache_misses),
            noerror_answers: load(&self.noerror_answers),
            nodata_answers: load(&self.nodata_answers),
            nxdomain_answers: load(&self.nxdomain_answers),
            servfail_answers: load(&self.servfail_answers),
            ..Default::default()
        }
    }
}
