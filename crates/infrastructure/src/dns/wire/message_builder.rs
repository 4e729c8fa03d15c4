use super::record_type_map::RecordTypeMapper;
use ferrous_recursor_application::ports::AskRequest;
use ferrous_recursor_domain::NetworkError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Root-owned OPT pseudo-record advertising a 4096 byte payload; byte 6 is
/// the EDNS version.
const OPT_RECORD: [u8; 11] = [
    0x00, 0x00, 0x29, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];
const OPT_VERSION_OFFSET: usize = 6;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Serializes the question in `request`, returning the message id with
    /// the bytes. An OPT record is appended when the request asks for EDNS.
    pub fn build_query(request: &AskRequest) -> Result<(u16, Vec<u8>), NetworkError> {
        let name = Name::from_str(request.qname.as_str()).map_err(|e| {
            NetworkError::Malformed(format!("Invalid query name '{}': {}", request.qname, e))
        })?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordTypeMapper::to_hickory(request.qtype));
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(request.recursion_desired);
        message.add_query(query);

        let mut bytes = Self::serialize_message(&message)?;
        if let Some(version) = request.edns_version {
            Self::append_opt(&mut bytes, version);
        }
        Ok((id, bytes))
    }

    fn append_opt(bytes: &mut Vec<u8>, version: u8) {
        if bytes.len() < 12 {
            return;
        }
        let mut opt = OPT_RECORD;
        opt[OPT_VERSION_OFFSET] = version;
        bytes.extend_from_slice(&opt);

        let arcount = u16::from_be_bytes([bytes[10], bytes[11]]).saturating_add(1);
        bytes[10..12].copy_from_slice(&arcount.to_be_bytes());
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, NetworkError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            NetworkError::Malformed(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrous_recursor_domain::{DnsName, RecordType, Timestamp};
    use std::time::Duration;

    fn request(edns_version: Option<u8>, recursion_desired: bool) -> AskRequest {
        AskRequest {
            address: "192.0.2.1:53".parse().unwrap(),
            qname: DnsName::parse("www.example.com.").unwrap(),
            qtype: RecordType::A,
            use_tcp: false,
            recursion_desired,
            edns_version,
            timeout: Duration::from_millis(1500),
            now: Timestamp::ZERO,
        }
    }

    #[test]
    fn test_iterative_query_has_rd_clear() {
        let (id, bytes) = MessageBuilder::build_query(&request(None, false)).unwrap();
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), id);
        assert_eq!(bytes[2] & 0x01, 0x00, "RD flag should be clear");
        assert_eq!(u16::from_be_bytes([bytes[10], bytes[11]]), 0);
    }

    #[test]
    fn test_forwarder_query_sets_rd() {
        let (_, bytes) = MessageBuilder::build_query(&request(None, true)).unwrap();
        assert_eq!(bytes[2] & 0x01, 0x01, "RD flag should be set");
    }

    #[test]
    fn test_edns_query_carries_opt() {
        let (_, plain) = MessageBuilder::build_query(&request(None, false)).unwrap();
        let (_, edns) = MessageBuilder::build_query(&request(Some(0), false)).unwrap();

        assert_eq!(edns.len(), plain.len() + OPT_RECORD.len());
        assert_eq!(u16::from_be_bytes([edns[10], edns[11]]), 1);
        let opt = &edns[edns.len() - OPT_RECORD.len()..];
        assert_eq!(u16::from_be_bytes([opt[1], opt[2]]), 41);
    }
}
