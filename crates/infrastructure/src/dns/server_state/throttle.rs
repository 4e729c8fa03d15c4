use dashmap::DashMap;
use ferrous_recursor_domain::config::ThrottleConfig;
use ferrous_recursor_domain::{DnsName, RecordType, Timestamp};
use rustc_hash::FxBuildHasher;
use std::hash::Hash;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// What a penalty applies to: a whole server, or one question sent to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThrottleKey {
    pub address: SocketAddr,
    pub target: Option<DnsName>,
    pub qtype: Option<RecordType>,
}

impl ThrottleKey {
    pub fn server(address: SocketAddr) -> Self {
        Self {
            address,
            target: None,
            qtype: None,
        }
    }

    pub fn query(address: SocketAddr, target: &DnsName, qtype: RecordType) -> Self {
        Self {
            address,
            target: Some(target.clone()),
            qtype: Some(qtype),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ThrottleEntry {
    expires_at: Timestamp,
    tries: u32,
}

/// Short-lived penalty box. An entry is active while unexpired and while it
/// still has attempts; every positive check uses one attempt up.
pub struct Throttle<K> {
    entries: DashMap<K, ThrottleEntry, FxBuildHasher>,
    last_sweep: AtomicU64,
    default_ttl: Duration,
    default_tries: u32,
    sweep_interval: Duration,
}

impl<K> Throttle<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            last_sweep: AtomicU64::new(0),
            default_ttl: Duration::from_secs(config.default_ttl_secs),
            default_tries: config.default_tries,
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
        }
    }

    pub fn should_throttle(&self, now: Timestamp, key: &K) -> bool {
        self.maybe_sweep(now);

        let active = {
            let Some(mut entry) = self.entries.get_mut(key) else {
                return false;
            };
            if now >= entry.expires_at || entry.tries == 0 {
                false
            } else {
                entry.tries -= 1;
                true
            }
        };

        if !active {
            // a concurrent throttle() may have renewed the entry since
            self.entries
                .remove_if(key, |_, entry| now >= entry.expires_at || entry.tries == 0);
        }
        active
    }

    /// Installs or strengthens a penalty. A zero `ttl` or `tries` selects
    /// the configured default. Existing entries keep the later expiry and
    /// the larger attempt count.
    pub fn throttle(&self, now: Timestamp, key: K, ttl: Duration, tries: u32) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let tries = if tries == 0 { self.default_tries } else { tries };
        let expires_at = now + ttl;

        self.entries
            .entry(key)
            .and_modify(|entry| {
                entry.expires_at = entry.expires_at.max(expires_at);
                entry.tries = entry.tries.max(tries);
            })
            .or_insert(ThrottleEntry { expires_at, tries });
    }

    /// Drops every time-expired entry.
    pub fn sweep(&self, now: Timestamp) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        self.last_sweep.store(now.as_micros(), Ordering::Relaxed);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Throttle sweep");
        }
        removed
    }

    fn maybe_sweep(&self, now: Timestamp) {
        let last = self.last_sweep.load(Ordering::Relaxed);
        let due = Timestamp::from_micros(last) + self.sweep_interval;
        if now < due {
            return;
        }
        if self
            .last_sweep
            .compare_exchange(last, now.as_micros(), Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            self.sweep(now);
        }
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
}
