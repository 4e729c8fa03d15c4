use async_trait::async_trait;
use ferrous_recursor_domain::{
    DnsName, DnssecStatus, NetworkError, RecordType, ResourceRecord, ResponseCode, Timestamp,
};
use std::net::SocketAddr;
use std::time::Duration;

/// One question to one server address.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub address: SocketAddr,
    pub qname: DnsName,
    pub qtype: RecordType,
    pub use_tcp: bool,
    pub recursion_desired: bool,
    /// `None` sends the query without an OPT record.
    pub edns_version: Option<u8>,
    pub timeout: Duration,
    pub now: Timestamp,
}

/// Decoded reply as seen by the resolver.
#[derive(Debug, Clone, Default)]
pub struct RawAnswer {
    pub rcode: ResponseCode,
    pub authoritative: bool,
    pub truncated: bool,
    /// Whether the reply carried an OPT record.
    pub has_edns: bool,
    /// Question section echoed by the server, if any.
    pub question: Option<(DnsName, RecordType)>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
    /// Round-trip time measured by the transport.
    pub elapsed: Duration,
    pub validation: DnssecStatus,
}

impl RawAnswer {
    pub fn new(rcode: ResponseCode) -> Self {
        Self {
            rcode,
            ..Default::default()
        }
    }

    pub fn all_records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
    }
}

/// The network-ask primitive. Implementations own all socket state; the
/// resolver only awaits the outcome.
#[async_trait]
pub trait NameserverTransport: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<RawAnswer, NetworkError>;
}
