use super::metrics::CacheMetrics;
use dashmap::DashMap;
use ferrous_recursor_domain::Timestamp;
use rustc_hash::FxBuildHasher;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Monotonic access counter; a larger value means more recently used.
#[derive(Default)]
pub(super) struct AccessSequence(AtomicU64);

impl AccessSequence {
    #[inline]
    pub(super) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub(super) trait Evictable {
    fn expires_at(&self) -> Timestamp;
    fn last_used(&self) -> u64;
}

pub(super) fn batch_size(max_entries: usize, batch_eviction_percentage: f64) -> usize {
    ((max_entries as f64 * batch_eviction_percentage).ceil() as usize).max(1)
}

/// Brings `map` below `max_entries`: expired entries go first, then a batch
/// of the least recently used ones.
///
/// Must not be called while holding a guard into `map`.
pub(super) fn make_room<K, V>(
    map: &DashMap<K, V, FxBuildHasher>,
    max_entries: usize,
    batch_eviction_percentage: f64,
    now: Timestamp,
    metrics: &CacheMetrics,
) where
    K: Eq + Hash + Clone,
    V: Evictable,
{
    if map.len() < max_entries {
        return;
    }

    let before = map.len();
    map.retain(|_, entry| now < entry.expires_at());
    let expired = before.saturating_sub(map.len());
    metrics
        .expired_removals
        .fetch_add(expired as u64, Ordering::Relaxed);

    if map.len() < max_entries {
        debug!(expired, "Purged expired cache entries");
        return;
    }

    let victims = least_recently_used(map, batch_size(max_entries, batch_eviction_percentage));
    let mut evicted = 0u64;
    for key in &victims {
        if map.remove(key).is_some() {
            evicted += 1;
        }
    }
    metrics.evictions.fetch_add(evicted, Ordering::Relaxed);
    debug!(expired, evicted, remaining = map.len(), "Evicted cache entries");
}

fn least_recently_used<K, V>(map: &DashMap<K, V, FxBuildHasher>, count: usize) -> Vec<K>
where
    K: Eq + Hash + Clone,
    V: Evictable,
{
    let mut candidates: Vec<(u64, K)> = map
        .iter()
        .map(|entry| (entry.value().last_used(), entry.key().clone()))
        .collect();

    if candidates.len() > count {
        candidates.select_nth_unstable_by_key(count, |(seq, _)| *seq);
        candidates.truncate(count);
    }
    candidates.into_iter().map(|(_, key)| key).collect()
}
