use super::record_type_map::RecordTypeMapper;
use ferrous_recursor_application::ports::RawAnswer;
use ferrous_recursor_domain::{
    DnsClass, DnsName, NetworkError, Placement, RecordData, ResourceRecord, ResponseCode, Soa,
};
use hickory_proto::op::Message;
use hickory_proto::rr::{Name, RData, Record};
use std::time::Duration;
use tracing::{debug, trace};

pub struct ResponseParser;

impl ResponseParser {
    /// Decodes a wire-format response into the resolver's view of it.
    /// Records of types the domain model does not know are skipped.
    pub fn parse(response_bytes: &[u8], elapsed: Duration) -> Result<RawAnswer, NetworkError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            NetworkError::Malformed(format!("Failed to parse DNS response: {}", e))
        })?;

        // The decoder lifts OPT out of the additional section, so a header
        // count larger than what is left means the server sent one.
        let arcount = match response_bytes.get(10..12) {
            Some(raw) => u16::from_be_bytes([raw[0], raw[1]]) as usize,
            None => 0,
        };
        let has_edns = arcount > message.additionals().len();

        let question = match message.queries().first() {
            Some(query) => {
                let qname = Self::convert_name(query.name())?;
                RecordTypeMapper::from_hickory(query.query_type()).map(|qtype| (qname, qtype))
            }
            None => None,
        };

        let answer = RawAnswer {
            rcode: ResponseCode::from_u16(u16::from(message.response_code())),
            authoritative: message.authoritative(),
            truncated: message.truncated(),
            has_edns,
            question,
            answers: Self::convert_section(message.answers(), Placement::Answer)?,
            authority: Self::convert_section(message.name_servers(), Placement::Authority)?,
            additional: Self::convert_section(message.additionals(), Placement::Additional)?,
            elapsed,
            ..Default::default()
        };

        debug!(
            rcode = %answer.rcode,
            aa = answer.authoritative,
            tc = answer.truncated,
            edns = answer.has_edns,
            answers = answer.answers.len(),
            authority = answer.authority.len(),
            additional = answer.additional.len(),
            "DNS response parsed"
        );

        Ok(answer)
    }

    fn convert_section(
        records: &[Record],
        place: Placement,
    ) -> Result<Vec<ResourceRecord>, NetworkError> {
        let mut converted = Vec::with_capacity(records.len());
        for record in records {
            let Some(record_type) = RecordTypeMapper::from_hickory(record.record_type()) else {
                trace!(record_type = %record.record_type(), "Skipping unknown record type");
                continue;
            };
            if record_type.is_meta() {
                continue;
            }

            converted.push(ResourceRecord {
                name: Self::convert_name(record.name())?,
                record_type,
                class: DnsClass::from_u16(u16::from(record.dns_class())),
                ttl: record.ttl(),
                data: Self::convert_data(record.data())?,
                place,
            });
        }
        Ok(converted)
    }

    fn convert_data(data: &RData) -> Result<RecordData, NetworkError> {
        Ok(match data {
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(aaaa) => RecordData::AAAA(aaaa.0),
            RData::NS(ns) => RecordData::NS(Self::convert_name(&ns.0)?),
            RData::CNAME(cname) => RecordData::CNAME(Self::convert_name(&cname.0)?),
            RData::PTR(ptr) => RecordData::PTR(Self::convert_name(&ptr.0)?),
            RData::MX(mx) => RecordData::MX {
                preference: mx.preference(),
                exchange: Self::convert_name(mx.exchange())?,
            },
            RData::SOA(soa) => RecordData::SOA(Soa {
                mname: Self::convert_name(soa.mname())?,
                rname: Self::convert_name(soa.rname())?,
                serial: soa.serial(),
                refresh: soa.refresh() as u32,
                retry: soa.retry() as u32,
                expire: soa.expire() as u32,
                minimum: soa.minimum(),
            }),
            RData::TXT(txt) => RecordData::TXT(
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                    .collect(),
            ),
            other => RecordData::Other(other.to_string()),
        })
    }

    fn convert_name(name: &Name) -> Result<DnsName, NetworkError> {
        DnsName::parse(&name.to_ascii())
            .map_err(|e| NetworkError::Malformed(format!("Bad owner name: {}", e)))
    }
}
