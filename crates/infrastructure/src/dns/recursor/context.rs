use ferrous_recursor_application::ports::{ResolutionCounters, ResolveOptions};
use ferrous_recursor_domain::{
    DnsName, DnssecStatus, RecordType, ResolutionStatus, ResourceRecord, Timestamp,
};
use rustc_hash::FxHashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// The servers a query can be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum NameserverSet {
    Names(Vec<DnsName>),
    Forwarders(Vec<SocketAddr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum QueryMode {
    /// RD=0, answers must come from within the zone cut.
    Iterative,
    /// RD=1 to a forwarder whose answer is final.
    ForwardRecursive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SetOrigin {
    Cache,
    Referral,
    LocalZone,
    Forwarder,
}

/// A zone cut and the servers believed to be authoritative for it.
#[derive(Debug, Clone)]
pub(super) struct AuthoritySet {
    pub zone: DnsName,
    pub servers: NameserverSet,
    pub mode: QueryMode,
    pub origin: SetOrigin,
}

impl AuthoritySet {
    pub fn delegation(zone: DnsName, names: Vec<DnsName>, origin: SetOrigin) -> Self {
        Self {
            zone,
            servers: NameserverSet::Names(names),
            mode: QueryMode::Iterative,
            origin,
        }
    }

    pub fn forwarders(zone: DnsName, addresses: Vec<SocketAddr>, recurse: bool) -> Self {
        Self {
            zone,
            servers: NameserverSet::Forwarders(addresses),
            mode: if recurse {
                QueryMode::ForwardRecursive
            } else {
                QueryMode::Iterative
            },
            origin: SetOrigin::Forwarder,
        }
    }

    pub fn is_forwarder(&self) -> bool {
        self.origin == SetOrigin::Forwarder
    }

    pub fn loop_key(&self, qname: &DnsName, qtype: RecordType) -> LoopKey {
        let mut servers: Vec<String> = match &self.servers {
            NameserverSet::Names(names) => names.iter().map(|n| n.to_string()).collect(),
            NameserverSet::Forwarders(addrs) => addrs.iter().map(|a| a.to_string()).collect(),
        };
        servers.sort();
        servers.dedup();
        LoopKey {
            qname: qname.clone(),
            qtype,
            zone: self.zone.clone(),
            servers,
        }
    }
}

/// One (qname, qtype, nameserver set) combination already tried.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct LoopKey {
    qname: DnsName,
    qtype: RecordType,
    zone: DnsName,
    servers: Vec<String>,
}

/// What a (sub-)resolution produced.
#[derive(Debug, Clone)]
pub(super) struct Outcome {
    pub status: ResolutionStatus,
    pub records: Vec<ResourceRecord>,
}

impl Outcome {
    pub fn new(status: ResolutionStatus, records: Vec<ResourceRecord>) -> Self {
        Self { status, records }
    }

    pub fn answer(records: Vec<ResourceRecord>) -> Self {
        Self::new(ResolutionStatus::NoError, records)
    }

    /// Puts `chain` (CNAMEs leading here) in front of this outcome.
    pub fn prepended(mut self, mut chain: Vec<ResourceRecord>) -> Self {
        chain.append(&mut self.records);
        self.records = chain;
        self
    }
}

/// State private to one top-level `resolve` call.
pub(super) struct ResolutionContext {
    pub options: ResolveOptions,
    pub deadline: Timestamp,
    pub been_there: FxHashSet<LoopKey>,
    pub cname_targets: FxHashSet<(DnsName, RecordType)>,
    pub cname_hops: u32,
    pub counters: ResolutionCounters,
    pub variable: bool,
    pub out_of_band: bool,
    pub validation: DnssecStatus,
    /// Set while the root NS set is being refreshed from the hint servers.
    pub priming_root: bool,
}

impl ResolutionContext {
    pub fn new(options: ResolveOptions, now: Timestamp, budget: Duration) -> Self {
        Self {
            options,
            deadline: now + budget,
            been_there: FxHashSet::default(),
            cname_targets: FxHashSet::default(),
            cname_hops: 0,
            counters: ResolutionCounters::default(),
            variable: false,
            out_of_band: false,
            validation: DnssecStatus::Unknown,
            priming_root: false,
        }
    }

    /// Bogus sticks; otherwise the first concrete state seen wins.
    pub fn note_validation(&mut self, status: DnssecStatus) {
        if status == DnssecStatus::Bogus || self.validation == DnssecStatus::Unknown {
            self.validation = status;
        }
    }
}
