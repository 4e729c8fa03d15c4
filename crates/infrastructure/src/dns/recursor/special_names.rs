use super::context::Outcome;
use ferrous_recursor_domain::{
    DnsClass, DnsName, DnsQuery, RecordData, RecordType, ResolutionStatus, ResolveError,
    ResourceRecord,
};
use std::net::{Ipv4Addr, Ipv6Addr};

const LOCAL_TTL: u32 = 86_400;

const LOCALHOST: &str = "localhost.";
const LOOPBACK_V4_PTR: &str = "1.0.0.127.in-addr.arpa.";
const LOOPBACK_V6_PTR: &str =
    "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.ip6.arpa.";

const VERSION_NAMES: &[&str] = &["version.bind.", "version.server.", "version.pdns."];
const ID_NAMES: &[&str] = &["id.server.", "hostname.bind."];

/// Strings served for the CHAOS class identity queries.
pub(super) struct Identity<'a> {
    pub server_id: &'a str,
    pub version: &'a str,
}

/// Handles queries that never leave the process: unsupported types and
/// classes, localhost, loopback reverse names and the CHAOS identity names.
/// Returns `None` when the query needs real resolution.
pub(super) fn answer_locally(
    query: &DnsQuery,
    identity: &Identity<'_>,
) -> Option<Result<Outcome, ResolveError>> {
    if query.record_type.is_zone_transfer() {
        return Some(Err(ResolveError::UnsupportedQuery(format!(
            "{} for {}",
            query.record_type, query.name
        ))));
    }

    match query.class {
        DnsClass::IN | DnsClass::ANY => internet_answer(&query.name, query.record_type).map(Ok),
        DnsClass::CH => Some(chaos_answer(&query.name, query.record_type, identity)),
        DnsClass::Other(code) => Some(Err(ResolveError::UnsupportedQuery(format!(
            "class {} for {}",
            code, query.name
        )))),
    }
}

fn internet_answer(qname: &DnsName, qtype: RecordType) -> Option<Outcome> {
    let mut records = Vec::new();
    match qname.as_str() {
        LOCALHOST => {
            if RecordType::A.answers(qtype) {
                records.push(ResourceRecord::new(
                    qname.clone(),
                    RecordType::A,
                    LOCAL_TTL,
                    RecordData::A(Ipv4Addr::LOCALHOST),
                ));
            }
            if RecordType::AAAA.answers(qtype) {
                records.push(ResourceRecord::new(
                    qname.clone(),
                    RecordType::AAAA,
                    LOCAL_TTL,
                    RecordData::AAAA(Ipv6Addr::LOCALHOST),
                ));
            }
        }
        LOOPBACK_V4_PTR | LOOPBACK_V6_PTR => {
            if RecordType::PTR.answers(qtype) {
                records.push(ResourceRecord::new(
                    qname.clone(),
                    RecordType::PTR,
                    LOCAL_TTL,
                    RecordData::PTR(DnsName::parse(LOCALHOST).ok()?),
                ));
            }
        }
        _ => return None,
    }

    let status = if records.is_empty() {
        ResolutionStatus::NoData
    } else {
        ResolutionStatus::NoError
    };
    Some(Outcome::new(status, records))
}

fn chaos_answer(
    qname: &DnsName,
    qtype: RecordType,
    identity: &Identity<'_>,
) -> Result<Outcome, ResolveError> {
    let text = if VERSION_NAMES.contains(&qname.as_str()) {
        identity.version
    } else if ID_NAMES.contains(&qname.as_str()) {
        identity.server_id
    } else {
        return Err(ResolveError::UnsupportedQuery(format!(
            "CH {} {}",
            qname, qtype
        )));
    };

    if !RecordType::TXT.answers(qtype) {
        return Ok(Outcome::new(ResolutionStatus::NoData, Vec::new()));
    }
    Ok(Outcome::answer(vec![ResourceRecord::new(
        qname.clone(),
        RecordType::TXT,
        LOCAL_TTL,
        RecordData::TXT(vec![text.to_string()]),
    )
    .with_class(DnsClass::CH)]))
}
