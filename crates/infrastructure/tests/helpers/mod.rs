#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_recursor_application::ports::{AskRequest, Clock, NameserverTransport, RawAnswer};
use ferrous_recursor_domain::config::{
    parse_server_addr, AuthorityZoneConfig, RootHintConfig, ZoneRecordConfig,
};
use ferrous_recursor_domain::{
    Config, DnsName, NetworkError, Placement, RecordData, RecordType, ResourceRecord,
    ResponseCode, Soa, Timestamp,
};
use ferrous_recursor_infrastructure::dns::{Recursor, RecursorBuilder};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROOT_SERVER: &str = "192.0.2.1";
pub const START_SECS: u64 = 1_700_000_000;

pub fn name(s: &str) -> DnsName {
    DnsName::parse(s).unwrap()
}

pub fn addr(s: &str) -> SocketAddr {
    parse_server_addr(s).unwrap()
}

// ── Records ──────────────────────────────────────────────────────────────

pub fn a(owner: &str, ip: &str) -> ResourceRecord {
    ResourceRecord::new(name(owner), RecordType::A, 300, RecordData::A(ip.parse().unwrap()))
}

pub fn aaaa(owner: &str, ip: &str) -> ResourceRecord {
    ResourceRecord::new(
        name(owner),
        RecordType::AAAA,
        300,
        RecordData::AAAA(ip.parse().unwrap()),
    )
}

pub fn cname(owner: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(
        name(owner),
        RecordType::CNAME,
        300,
        RecordData::CNAME(name(target)),
    )
}

pub fn ns(owner: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(name(owner), RecordType::NS, 3600, RecordData::NS(name(target)))
        .with_place(Placement::Authority)
}

pub fn glue(owner: &str, ip: &str) -> ResourceRecord {
    a(owner, ip).with_ttl(3600).with_place(Placement::Additional)
}

pub fn soa(zone: &str, ttl: u32, minimum: u32) -> ResourceRecord {
    ResourceRecord::new(
        name(zone),
        RecordType::SOA,
        ttl,
        RecordData::SOA(Soa {
            mname: name(&format!("ns1.{}", zone)),
            rname: name(&format!("hostmaster.{}", zone)),
            serial: 2024010101,
            refresh: 7200,
            retry: 900,
            expire: 1_209_600,
            minimum,
        }),
    )
    .with_place(Placement::Authority)
}

// ── Replies ──────────────────────────────────────────────────────────────

pub fn authoritative(answers: Vec<ResourceRecord>) -> RawAnswer {
    RawAnswer {
        authoritative: true,
        answers,
        ..RawAnswer::new(ResponseCode::NoError)
    }
}

pub fn nxdomain(soa: ResourceRecord) -> RawAnswer {
    RawAnswer {
        authoritative: true,
        authority: vec![soa],
        ..RawAnswer::new(ResponseCode::NXDomain)
    }
}

pub fn nodata(soa: ResourceRecord) -> RawAnswer {
    RawAnswer {
        authoritative: true,
        authority: vec![soa],
        ..RawAnswer::new(ResponseCode::NoError)
    }
}

pub fn referral(nameservers: Vec<ResourceRecord>, glue: Vec<ResourceRecord>) -> RawAnswer {
    RawAnswer {
        authority: nameservers,
        additional: glue,
        ..RawAnswer::new(ResponseCode::NoError)
    }
}

// ── Clock ────────────────────────────────────────────────────────────────

pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            micros: AtomicU64::new(Timestamp::from_secs(START_SECS).as_micros()),
        })
    }

    pub fn advance(&self, by: Duration) {
        self.micros
            .fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

// ── Transport ────────────────────────────────────────────────────────────

type Responder = Box<dyn Fn(&AskRequest) -> Result<RawAnswer, NetworkError> + Send + Sync>;

/// Scripted servers keyed by (address, qname, qtype). Unscripted questions
/// come back unreachable.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(SocketAddr, DnsName, RecordType), Responder>>,
    asks: Mutex<Vec<AskRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn answer(&self, server: &str, qname: &str, qtype: RecordType, reply: RawAnswer) {
        self.respond(server, qname, qtype, move |_| Ok(reply.clone()));
    }

    pub fn fail(&self, server: &str, qname: &str, qtype: RecordType, error: NetworkError) {
        self.respond(server, qname, qtype, move |_| Err(error.clone()));
    }

    pub fn respond<F>(&self, server: &str, qname: &str, qtype: RecordType, responder: F)
    where
        F: Fn(&AskRequest) -> Result<RawAnswer, NetworkError> + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .unwrap()
            .insert((addr(server), name(qname), qtype), Box::new(responder));
    }

    pub fn asks(&self) -> Vec<AskRequest> {
        self.asks.lock().unwrap().clone()
    }

    pub fn ask_count(&self) -> usize {
        self.asks.lock().unwrap().len()
    }

    pub fn asks_to(&self, server: &str) -> usize {
        let target = addr(server);
        self.asks
            .lock()
            .unwrap()
            .iter()
            .filter(|ask| ask.address == target)
            .count()
    }
}

#[async_trait]
impl NameserverTransport for MockTransport {
    async fn ask(&self, request: &AskRequest) -> Result<RawAnswer, NetworkError> {
        self.asks.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let routes = self.routes.lock().unwrap();
        match routes.get(&(request.address, request.qname.clone(), request.qtype)) {
            Some(responder) => responder(request),
            None => Err(NetworkError::Unreachable(format!(
                "no route for {} {} at {}",
                request.qname, request.qtype, request.address
            ))),
        }
    }
}

// ── Configuration ────────────────────────────────────────────────────────

/// One root server at `ROOT_SERVER`, nothing on the dont-query list and no
/// root NS priming.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.resolver.dont_query = Vec::new();
    config.resolver.prime_root_ns = false;
    config.root_hints = vec![RootHintConfig {
        name: "a.root.test.".to_string(),
        addresses: vec![ROOT_SERVER.to_string()],
    }];
    config
}

pub fn forward_zone(zone: &str, forwarders: &[&str], recurse: bool) -> AuthorityZoneConfig {
    AuthorityZoneConfig {
        name: zone.to_string(),
        forwarders: forwarders.iter().map(|f| f.to_string()).collect(),
        recurse,
        records: Vec::new(),
    }
}

pub fn zone_record(owner: &str, record_type: &str, data: &str) -> ZoneRecordConfig {
    ZoneRecordConfig {
        name: owner.to_string(),
        record_type: record_type.to_string(),
        ttl: 3600,
        data: data.to_string(),
    }
}

/// `example.` served locally, with a delegated `sub.example.` child.
pub fn example_zone() -> AuthorityZoneConfig {
    AuthorityZoneConfig {
        name: "example.".to_string(),
        forwarders: Vec::new(),
        recurse: false,
        records: vec![
            zone_record(
                "@",
                "SOA",
                "ns1.example. hostmaster.example. 1 7200 900 1209600 300",
            ),
            zone_record("@", "NS", "ns1"),
            zone_record("ns1", "A", "192.0.2.5"),
            zone_record("www", "A", "192.0.2.10"),
            zone_record("alias", "CNAME", "www"),
            zone_record("*.wild", "A", "192.0.2.20"),
            zone_record("sub", "NS", "ns.sub"),
            zone_record("ns.sub", "A", "192.0.2.30"),
        ],
    }
}

pub struct Harness {
    pub recursor: Recursor,
    pub transport: Arc<MockTransport>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(config: Config) -> Harness {
    let transport = MockTransport::new();
    harness_with(config, transport)
}

pub fn harness_with(config: Config, transport: Arc<MockTransport>) -> Harness {
    let clock = ManualClock::new();
    let recursor = RecursorBuilder::new(transport.clone())
        .with_config(config)
        .with_clock(clock.clone())
        .build()
        .unwrap();
    Harness {
        recursor,
        transport,
        clock,
    }
}
