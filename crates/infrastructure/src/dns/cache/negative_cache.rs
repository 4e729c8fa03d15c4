use super::eviction::{make_room, AccessSequence, Evictable};
use super::key::NegativeKey;
use super::metrics::CacheMetrics;
use dashmap::DashMap;
use ferrous_recursor_domain::config::CacheConfig;
use ferrous_recursor_domain::{DnsName, Placement, RecordType, ResourceRecord, Timestamp};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegativeKind {
    /// The name does not exist; matches every qtype.
    NxDomain,
    /// The name exists without data of this type.
    NoData,
}

struct StoredNegative {
    kind: NegativeKind,
    soa: ResourceRecord,
    expires_at: Timestamp,
    last_used: AtomicU64,
}

impl Evictable for StoredNegative {
    fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    fn last_used(&self) -> u64 {
        self.last_used.load(Ordering::Relaxed)
    }
}

/// A negative cache hit. The SOA carries the remaining lifetime as its TTL.
#[derive(Debug, Clone)]
pub struct NegativeEntry {
    pub kind: NegativeKind,
    pub soa: ResourceRecord,
    pub expires_at: Timestamp,
}

/// NXDOMAIN / NODATA answers, kept apart from positive data.
pub struct NegativeCache {
    entries: DashMap<NegativeKey, StoredNegative, FxBuildHasher>,
    sequence: AccessSequence,
    metrics: CacheMetrics,
    max_entries: usize,
    max_negative_ttl: u32,
    batch_eviction_percentage: f64,
}

impl NegativeCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(
                config.max_negative_entries.min(65_536),
                FxBuildHasher,
                config.shard_amount.max(2).next_power_of_two(),
            ),
            sequence: AccessSequence::default(),
            metrics: CacheMetrics::default(),
            max_entries: config.max_negative_entries,
            max_negative_ttl: config.max_negative_ttl,
            batch_eviction_percentage: config.batch_eviction_percentage,
        }
    }

    /// Caches a negative answer for `name`. NXDOMAIN is stored for the whole
    /// name. The lifetime is `min(soa ttl, soa minimum)` capped at the
    /// configured maximum. Returns false when `soa` is not an SOA record.
    pub fn insert(
        &self,
        name: &DnsName,
        qtype: RecordType,
        kind: NegativeKind,
        soa: &ResourceRecord,
        now: Timestamp,
    ) -> bool {
        let Some(fields) = soa.data.as_soa() else {
            return false;
        };
        if self.max_entries == 0 {
            return false;
        }

        let ttl = soa.ttl.min(fields.minimum).min(self.max_negative_ttl);
        let key = match kind {
            NegativeKind::NxDomain => NegativeKey::new(name, None),
            NegativeKind::NoData => NegativeKey::new(name, Some(qtype)),
        };

        make_room(
            &self.entries,
            self.max_entries,
            self.batch_eviction_percentage,
            now,
            &self.metrics,
        );

        debug!(
            domain = %name,
            record_type = %qtype,
            kind = ?kind,
            ttl,
            "Caching negative answer"
        );
        self.metrics.insertions.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key,
            StoredNegative {
                kind,
                soa: soa.clone().with_place(Placement::Authority),
                expires_at: now + Duration::from_secs(u64::from(ttl)),
                last_used: AtomicU64::new(self.sequence.next()),
            },
        );
        true
    }

    /// Matches a NODATA entry for `qtype` or an NXDOMAIN entry for the name.
    pub fn get(&self, name: &DnsName, qtype: RecordType, now: Timestamp) -> Option<NegativeEntry> {
        for key in [
            NegativeKey::new(name, Some(qtype)),
            NegativeKey::new(name, None),
        ] {
            if let Some(entry) = self.lookup(&key, now) {
                self.metrics.hit();
                return Some(entry);
            }
        }
        self.metrics.miss();
        None
    }

    fn lookup(&self, key: &NegativeKey, now: Timestamp) -> Option<NegativeEntry> {
        {
            let stored = self.entries.get(key)?;
            if now < stored.expires_at {
                stored
                    .last_used
                    .store(self.sequence.next(), Ordering::Relaxed);
                let remaining = stored.expires_at.secs_until(now);
                return Some(NegativeEntry {
                    kind: stored.kind,
                    soa: stored.soa.clone().with_ttl(remaining),
                    expires_at: stored.expires_at,
                });
            }
        }
        self.entries.remove_if(key, |_, stored| now >= stored.expires_at);
        None
    }

    /// Drops negative data that a fresh positive answer contradicts.
    pub fn remove(&self, name: &DnsName, qtype: RecordType) -> usize {
        [
            NegativeKey::new(name, Some(qtype)),
            NegativeKey::new(name, None),
        ]
        .iter()
        .filter(|key| self.entries.remove(key).is_some())
        .count()
    }

    pub fn wipe(&self, name: &DnsName, subtree: bool) -> usize {
        let before = self.entries.len();
        if subtree {
            self.entries.retain(|key, _| !key.name.is_subdomain_of(name));
        } else {
            self.entries.retain(|key, _| key.name != *name);
        }
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}
