use dashmap::DashMap;
use ferrous_recursor_domain::{DnsName, Timestamp};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::net::SocketAddr;

/// Latency average whose history fades with elapsed time rather than with
/// the number of samples.
#[derive(Debug, Clone, Default)]
pub struct DecayingEwma {
    value: f64,
    last_submit: Timestamp,
    last_get: Timestamp,
    initialized: bool,
}

impl DecayingEwma {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, sample: f64, now: Timestamp) {
        if !self.initialized {
            self.value = sample;
            self.last_submit = now;
            self.last_get = now;
            self.initialized = true;
            return;
        }

        let elapsed = now.seconds_since(self.last_submit).max(0.0);
        let factor = ((-elapsed).exp() / 2.0).clamp(0.0, 1.0);
        self.value = (1.0 - factor) * sample + factor * self.value;
        self.last_submit = now;
    }

    /// Applies read-time decay and returns the decayed value.
    pub fn get(&mut self, now: Timestamp) -> f64 {
        let elapsed = now.seconds_since(self.last_get).max(0.0);
        let factor = (-elapsed / 60.0).exp().clamp(0.0, 1.0);
        self.value *= factor;
        self.last_get = now;
        self.value
    }

    pub fn peek(&self) -> f64 {
        self.value
    }

    pub fn is_stale(&self, limit: Timestamp) -> bool {
        self.last_get < limit
    }
}

/// Averages for every address of one nameserver name.
///
/// Entries are kept most-recently-submitted first so that equal averages
/// resolve in favour of the freshest measurement.
#[derive(Debug, Clone, Default)]
pub struct SpeedCollection {
    entries: SmallVec<[(SocketAddr, DecayingEwma); 4]>,
    best: Option<SocketAddr>,
}

impl SpeedCollection {
    pub fn submit(&mut self, address: SocketAddr, usecs: f64, now: Timestamp) {
        let mut ewma = match self.entries.iter().position(|(a, _)| *a == address) {
            Some(idx) => self.entries.remove(idx).1,
            None => DecayingEwma::new(),
        };
        ewma.submit(usecs, now);
        self.entries.insert(0, (address, ewma));
    }

    /// Lowest decayed average across addresses, 0.0 when nothing is known.
    pub fn get(&mut self, now: Timestamp) -> f64 {
        let mut lowest = f64::MAX;
        let mut best = None;
        for (address, ewma) in self.entries.iter_mut() {
            let value = ewma.get(now);
            if value < lowest {
                lowest = value;
                best = Some(*address);
            }
        }
        match best {
            Some(address) => {
                self.best = Some(address);
                lowest
            }
            None => 0.0,
        }
    }

    /// Address that produced the minimum on the last `get`.
    pub fn best(&self) -> Option<SocketAddr> {
        self.best
    }

    pub fn address_speed(&mut self, address: &SocketAddr, now: Timestamp) -> Option<f64> {
        self.entries
            .iter_mut()
            .find(|(a, _)| a == address)
            .map(|(_, ewma)| ewma.get(now))
    }

    pub fn is_stale(&self, limit: Timestamp) -> bool {
        self.entries.iter().all(|(_, ewma)| ewma.is_stale(limit))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Nameserver reputation keyed by server name.
pub struct NsSpeedTracker {
    speeds: DashMap<DnsName, SpeedCollection, FxBuildHasher>,
}

impl NsSpeedTracker {
    pub fn new() -> Self {
        Self {
            speeds: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn submit(&self, server: &DnsName, address: SocketAddr, usecs: u64, now: Timestamp) {
        self.speeds
            .entry(server.clone())
            .or_default()
            .submit(address, usecs as f64, now);
    }

    pub fn best_address(&self, server: &DnsName, now: Timestamp) -> Option<(SocketAddr, f64)> {
        let mut collection = self.speeds.get_mut(server)?;
        let speed = collection.get(now);
        collection.best().map(|address| (address, speed))
    }

    /// Decayed average for the fastest address of `server`, 0.0 if unknown.
    pub fn server_speed(&self, server: &DnsName, now: Timestamp) -> f64 {
        self.speeds
            .get_mut(server)
            .map(|mut collection| collection.get(now))
            .unwrap_or(0.0)
    }

    pub fn address_speed(
        &self,
        server: &DnsName,
        address: &SocketAddr,
        now: Timestamp,
    ) -> Option<f64> {
        self.speeds
            .get_mut(server)
            .and_then(|mut collection| collection.address_speed(address, now))
    }

    /// Sorts `addresses` fastest first. Unmeasured addresses count as 0 so
    /// they are tried early; equal speeds keep their incoming order.
    pub fn order_addresses(&self, server: &DnsName, addresses: &mut [SocketAddr], now: Timestamp) {
        let Some(mut collection) = self.speeds.get_mut(server) else {
            return;
        };
        let mut keyed: Vec<(f64, SocketAddr)> = addresses
            .iter()
            .map(|a| (collection.address_speed(a, now).unwrap_or(0.0), *a))
            .collect();
        drop(collection);

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (slot, (_, address)) in addresses.iter_mut().zip(keyed) {
            *slot = address;
        }
    }

    pub fn is_stale(&self, server: &DnsName, limit: Timestamp) -> bool {
        self.speeds
            .get(server)
            .map(|collection| collection.is_stale(limit))
            .unwrap_or(true)
    }

    /// Removes every server whose addresses all went unread since `limit`.
    pub fn prune(&self, limit: Timestamp) -> usize {
        let before = self.speeds.len();
        self.speeds
            .retain(|_, collection| !collection.is_stale(limit));
        before.saturating_sub(self.speeds.len())
    }

    pub fn clear(&self) -> usize {
        let removed = self.speeds.len();
        self.speeds.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }
}

impl Default for NsSpeedTracker {
    fn default() -> Self {
        Self::new()
    }
}
