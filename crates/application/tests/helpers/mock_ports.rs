#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_recursor_application::ports::{
    RecursiveResolver, RecursorAdminPort, RecursorStatsSnapshot, Resolution, ResolveOptions,
};
use ferrous_recursor_domain::{
    DnsName, DnsQuery, RecordData, RecordType, ResolutionStatus, ResolveError, ResourceRecord,
    Timestamp,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

pub fn a_record(name: &str, ip: &str) -> ResourceRecord {
    ResourceRecord::new(
        DnsName::parse(name).unwrap(),
        RecordType::A,
        300,
        RecordData::A(ip.parse().unwrap()),
    )
}

#[derive(Clone, Default)]
pub struct MockRecursiveResolver {
    responses: Arc<RwLock<HashMap<DnsName, Resolution>>>,
    calls: Arc<Mutex<Vec<(DnsQuery, ResolveOptions)>>>,
}

impl MockRecursiveResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_response(&self, domain: &str, resolution: Resolution) {
        self.responses
            .write()
            .await
            .insert(DnsName::parse(domain).unwrap(), resolution);
    }

    pub fn calls(&self) -> Vec<(DnsQuery, ResolveOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecursiveResolver for MockRecursiveResolver {
    async fn resolve(&self, query: &DnsQuery, options: ResolveOptions) -> Resolution {
        self.calls.lock().unwrap().push((query.clone(), options));
        match self.responses.read().await.get(&query.name) {
            Some(resolution) => resolution.clone(),
            None => Resolution::servfail(ResolveError::NoAuthorityFound {
                qname: query.name.clone(),
            }),
        }
    }
}

pub fn noerror(records: Vec<ResourceRecord>) -> Resolution {
    Resolution::new(ResolutionStatus::NoError, records)
}

#[derive(Default)]
pub struct MockAdminPort {
    pub wiped: Mutex<Vec<(DnsName, bool)>>,
    pub throttle_entries: AtomicUsize,
    pub speed_entries: AtomicUsize,
    pub edns_entries: AtomicUsize,
    pub failed_entries: AtomicUsize,
    pub pruned_before: Mutex<Option<Timestamp>>,
}

impl MockAdminPort {
    pub fn with_entries(count: usize) -> Self {
        let port = Self::default();
        port.throttle_entries.store(count, Ordering::Relaxed);
        port.speed_entries.store(count, Ordering::Relaxed);
        port.edns_entries.store(count, Ordering::Relaxed);
        port.failed_entries.store(count, Ordering::Relaxed);
        port
    }
}

impl RecursorAdminPort for MockAdminPort {
    fn wipe_cache(&self, name: &DnsName, subtree: bool) -> usize {
        self.wiped.lock().unwrap().push((name.clone(), subtree));
        if subtree {
            3
        } else {
            1
        }
    }

    fn clear_throttle(&self) -> usize {
        self.throttle_entries.swap(0, Ordering::Relaxed)
    }

    fn clear_ns_speeds(&self) -> usize {
        self.speed_entries.swap(0, Ordering::Relaxed)
    }

    fn prune_ns_speeds(&self, limit: Timestamp) -> usize {
        *self.pruned_before.lock().unwrap() = Some(limit);
        self.speed_entries.swap(0, Ordering::Relaxed)
    }

    fn clear_edns_status(&self) -> usize {
        self.edns_entries.swap(0, Ordering::Relaxed)
    }

    fn clear_failed_servers(&self) -> usize {
        self.failed_entries.swap(0, Ordering::Relaxed)
    }

    fn stats(&self) -> RecursorStatsSnapshot {
        RecursorStatsSnapshot {
            queries: 7,
            throttle_entries: self.throttle_entries.load(Ordering::Relaxed),
            ..Default::default()
        }
    }
}
