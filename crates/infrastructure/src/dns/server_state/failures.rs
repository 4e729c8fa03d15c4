use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::net::SocketAddr;

/// Consecutive failure count per server address. Absent means zero.
pub struct FailureCounters {
    counts: DashMap<SocketAddr, u64, FxBuildHasher>,
}

impl FailureCounters {
    pub fn new() -> Self {
        Self {
            counts: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn incr(&self, address: SocketAddr) -> u64 {
        let mut count = self.counts.entry(address).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn value(&self, address: &SocketAddr) -> u64 {
        self.counts.get(address).map(|c| *c).unwrap_or(0)
    }

    pub fn clear(&self, address: &SocketAddr) -> bool {
        self.counts.remove(address).is_some()
    }

    pub fn clear_all(&self) -> usize {
        let removed = self.counts.len();
        self.counts.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Default for FailureCounters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate_until_cleared() {
        let counters = FailureCounters::new();
        let address: SocketAddr = "192.0.2.1:53".parse().unwrap();

        assert_eq!(counters.value(&address), 0);
        assert_eq!(counters.incr(address), 1);
        assert_eq!(counters.incr(address), 2);
        assert!(counters.clear(&address));
        assert!(counters.is_empty());
        assert!(!counters.clear(&address));
        assert_eq!(counters.value(&address), 0);
    }

    #[test]
    fn test_clear_resets_one_server() {
        let counters = FailureCounters::new();
        let a: SocketAddr = "192.0.2.1:53".parse().unwrap();
        let b: SocketAddr = "192.0.2.2:53".parse().unwrap();
        counters.incr(a);
        counters.incr(b);

        assert!(counters.clear(&a));
        assert_eq!(counters.value(&b), 1);
        assert_eq!(counters.clear_all(), 1);
    }
}
