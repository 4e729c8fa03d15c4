use super::zone::AuthorityZone;
use arc_swap::ArcSwap;
use ferrous_recursor_domain::DnsName;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::info;

type ZoneTable = FxHashMap<DnsName, Arc<AuthorityZone>>;

/// The loaded zone table. Readers never block; a reload swaps the whole
/// table at once.
pub struct AuthorityZones {
    table: ArcSwap<ZoneTable>,
}

impl AuthorityZones {
    pub fn new(zones: Vec<AuthorityZone>) -> Self {
        Self {
            table: ArcSwap::from_pointee(Self::index(zones)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Most specific zone that is an ancestor of, or equal to, `qname`.
    pub fn best_zone(&self, qname: &DnsName) -> Option<Arc<AuthorityZone>> {
        let table = self.table.load();
        if table.is_empty() {
            return None;
        }
        qname
            .ancestors()
            .find_map(|candidate| table.get(&candidate).cloned())
    }

    pub fn get(&self, name: &DnsName) -> Option<Arc<AuthorityZone>> {
        self.table.load().get(name).cloned()
    }

    /// Swaps in a new table and returns how many zones it holds.
    pub fn replace(&self, zones: Vec<AuthorityZone>) -> usize {
        let table = Self::index(zones);
        let count = table.len();
        self.table.store(Arc::new(table));
        info!(zones = count, "Authority zone table replaced");
        count
    }

    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.load().is_empty()
    }

    fn index(zones: Vec<AuthorityZone>) -> ZoneTable {
        zones
            .into_iter()
            .map(|zone| (zone.name().clone(), Arc::new(zone)))
            .collect()
    }
}

impl Default for AuthorityZones {
    fn default() -> Self {
        Self::empty()
    }
}
