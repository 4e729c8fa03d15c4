use super::eviction::{make_room, AccessSequence, Evictable};
use super::key::CacheKey;
use super::metrics::CacheMetrics;
use dashmap::DashMap;
use ferrous_recursor_domain::config::CacheConfig;
use ferrous_recursor_domain::{DnsName, DnssecStatus, RecordType, ResourceRecord, Timestamp};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Where cached data came from, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provenance {
    /// Built-in or configured root hints.
    Hint,
    /// Learned from a referral or as glue; good enough to find servers,
    /// not to answer with.
    Referral,
    /// An authoritative answer, or the final answer of a recursing
    /// forwarder.
    Authoritative,
    /// Local zone data.
    OutOfBand,
}

impl Provenance {
    pub fn outranks(&self, other: &Provenance) -> bool {
        self > other
    }

    /// Whether data of this provenance may be handed to a client.
    pub fn is_answer_grade(&self) -> bool {
        matches!(self, Provenance::Authoritative | Provenance::OutOfBand)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Hint => "hint",
            Provenance::Referral => "referral",
            Provenance::Authoritative => "authoritative",
            Provenance::OutOfBand => "out_of_band",
        }
    }
}

struct CacheEntry {
    records: Arc<[ResourceRecord]>,
    expires_at: Timestamp,
    provenance: Provenance,
    validation: DnssecStatus,
    last_used: AtomicU64,
}

impl Evictable for CacheEntry {
    fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    fn last_used(&self) -> u64 {
        self.last_used.load(Ordering::Relaxed)
    }
}

/// A cache hit. Record TTLs are the remaining lifetime at lookup time.
#[derive(Debug, Clone)]
pub struct CachedRRset {
    pub records: Vec<ResourceRecord>,
    pub provenance: Provenance,
    pub validation: DnssecStatus,
    pub expires_at: Timestamp,
}

impl CachedRRset {
    pub fn ttl(&self, now: Timestamp) -> u32 {
        self.expires_at.secs_until(now)
    }
}

/// Positive RRset cache keyed by (owner, type).
pub struct RecordCache {
    entries: DashMap<CacheKey, CacheEntry, FxBuildHasher>,
    sequence: AccessSequence,
    metrics: CacheMetrics,
    max_entries: usize,
    min_ttl: u32,
    max_ttl: u32,
    batch_eviction_percentage: f64,
}

impl RecordCache {
    pub fn new(config: &CacheConfig) -> Self {
        let shard_amount = config.shard_amount.max(2).next_power_of_two();

        info!(
            max_entries = config.max_entries,
            shard_amount,
            min_ttl = config.min_ttl,
            max_ttl = config.max_ttl,
            "Initializing record cache"
        );

        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(
                config.max_entries.min(65_536),
                FxBuildHasher,
                shard_amount,
            ),
            sequence: AccessSequence::default(),
            metrics: CacheMetrics::default(),
            max_entries: config.max_entries,
            min_ttl: config.min_ttl,
            max_ttl: config.max_ttl,
            batch_eviction_percentage: config.batch_eviction_percentage,
        }
    }

    /// Unexpired entry for (`name`, `record_type`). An entry is gone from
    /// the instant `now` reaches its expiry.
    pub fn get(&self, name: &DnsName, record_type: RecordType, now: Timestamp) -> Option<CachedRRset> {
        let key = CacheKey::new(name, record_type);

        match self.entries.get(&key) {
            None => {
                self.metrics.miss();
                return None;
            }
            Some(entry) if now < entry.expires_at => {
                entry.last_used.store(self.sequence.next(), Ordering::Relaxed);
                self.metrics.hit();
                let remaining = entry.expires_at.secs_until(now);
                return Some(CachedRRset {
                    records: entry
                        .records
                        .iter()
                        .map(|r| r.clone().with_ttl(remaining))
                        .collect(),
                    provenance: entry.provenance,
                    validation: entry.validation,
                    expires_at: entry.expires_at,
                });
            }
            Some(_) => {}
        }

        if self
            .entries
            .remove_if(&key, |_, entry| now >= entry.expires_at)
            .is_some()
        {
            self.metrics
                .expired_removals
                .fetch_add(1, Ordering::Relaxed);
        }
        self.metrics.miss();
        None
    }

    /// Stores one RRset, replacing whatever was cached for its key. The
    /// lifetime is clamped into `[min_ttl, max_ttl]` here, never on read.
    pub fn insert(
        &self,
        records: Vec<ResourceRecord>,
        expires_at: Timestamp,
        provenance: Provenance,
        validation: DnssecStatus,
        now: Timestamp,
    ) -> bool {
        let Some((key, entry)) = self.prepare(records, expires_at, provenance, validation, now)
        else {
            return false;
        };
        self.entries.insert(key, entry);
        true
    }

    /// Like `insert`, but leaves an unexpired entry of higher provenance in
    /// place.
    pub fn insert_unless_outranked(
        &self,
        records: Vec<ResourceRecord>,
        expires_at: Timestamp,
        provenance: Provenance,
        validation: DnssecStatus,
        now: Timestamp,
    ) -> bool {
        let Some((key, entry)) = self.prepare(records, expires_at, provenance, validation, now)
        else {
            return false;
        };

        match self.entries.entry(key) {
            dashmap::Entry::Occupied(mut occupied) => {
                let existing = occupied.get();
                if now < existing.expires_at && existing.provenance.outranks(&provenance) {
                    self.metrics
                        .rejected_insertions
                        .fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                occupied.insert(entry);
            }
            dashmap::Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }
        true
    }

    fn prepare(
        &self,
        records: Vec<ResourceRecord>,
        expires_at: Timestamp,
        provenance: Provenance,
        validation: DnssecStatus,
        now: Timestamp,
    ) -> Option<(CacheKey, CacheEntry)> {
        let first = records.first()?;
        if self.max_entries == 0 {
            self.metrics
                .rejected_insertions
                .fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let key = CacheKey::new(&first.name, first.record_type);

        let records: Vec<ResourceRecord> = records
            .into_iter()
            .filter(|r| r.name == key.name && r.record_type == key.record_type)
            .collect();

        let lifetime = expires_at
            .secs_until(now)
            .clamp(self.min_ttl, self.max_ttl.max(self.min_ttl));
        let expires_at = now + Duration::from_secs(u64::from(lifetime));

        make_room(
            &self.entries,
            self.max_entries,
            self.batch_eviction_percentage,
            now,
            &self.metrics,
        );

        debug!(
            domain = %key.name,
            record_type = %key.record_type,
            ttl = lifetime,
            provenance = provenance.as_str(),
            "Inserting record into cache"
        );
        self.metrics.insertions.fetch_add(1, Ordering::Relaxed);

        Some((
            key,
            CacheEntry {
                records: Arc::from(records),
                expires_at,
                provenance,
                validation,
                last_used: AtomicU64::new(self.sequence.next()),
            },
        ))
    }

    pub fn remove(&self, name: &DnsName, record_type: RecordType) -> bool {
        self.entries
            .remove(&CacheKey::new(name, record_type))
            .is_some()
    }

    /// Removes every type cached at `name`, or everything at or below it
    /// when `subtree` is set.
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
