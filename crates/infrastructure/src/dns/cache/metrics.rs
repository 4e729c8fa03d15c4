use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared by both caches.
#[derive(Default)]
#[repr(align(64))]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    // hits and misses move on every lookup; keep them off the line below.
    _hot_pad: [u64; 6],

    pub insertions: AtomicU64,
    pub evictions: AtomicU64,
    pub expired_removals: AtomicU64,
    /// Inserts refused because a better-ranked RRset was already cached.
    pub rejected_insertions: AtomicU64,
}

/// Point-in-time copy of `CacheMetrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub expired_removals: u64,
    pub rejected_insertions: u64,
}

impl CacheMetricsSnapshot {
    /// Percentage of lookups that hit, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 * 100.0 / total as f64
    }
}

impl CacheMetrics {
    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        CacheMetricsSnapshot {
            hits: load(&self.hits),
            misses: load(&self.misses),
            insertions: load(&self.insertions),
            evictions: load(&self.evictions),
            expired_removals: load(&self.expired_removals),
            rejected_insertions: load(&self.rejected_insertions),
        }
    }

    #[inline]
    pub(super) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(super) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}
