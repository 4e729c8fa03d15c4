use ferrous_recursor_domain::{
    DnsClass, DnsName, DnsQuery, RecordData, RecordType, ResolutionStatus, ResponseCode,
};
use std::net::Ipv4Addr;
use std::str::FromStr;

mod helpers;
use helpers::{name, RecordBuilder};

#[test]
fn test_record_type_codes() {
    for code in [1u16, 2, 5, 6, 12, 15, 16, 28, 43, 46, 255] {
        let record_type = RecordType::from_u16(code).unwrap();
        assert_eq!(record_type.to_u16(), code);
    }
    assert_eq!(RecordType::from_u16(9999), None);
    assert_eq!(RecordType::from_str("aaaa").unwrap(), RecordType::AAAA);
    assert!(RecordType::from_str("BOGUS").is_err());
}

#[test]
fn test_record_type_answers_any() {
    assert!(RecordType::A.answers(RecordType::ANY));
    assert!(RecordType::A.answers(RecordType::A));
    assert!(!RecordType::A.answers(RecordType::AAAA));
    assert!(RecordType::AXFR.is_zone_transfer());
    assert!(RecordType::ANY.is_meta());
}

#[test]
fn test_record_builder_parses_data() {
    let record = RecordBuilder::new().name("www.example.").build();
    assert_eq!(record.name, name("www.example."));
    assert_eq!(record.data, RecordData::A(Ipv4Addr::new(192, 0, 2, 1)));
    assert_eq!(record.class, DnsClass::IN);
}

#[test]
fn test_relative_targets_use_owner_as_origin() {
    let record = RecordBuilder::new()
        .name("example.")
        .record_type(RecordType::NS)
        .data("ns1")
        .build();
    assert_eq!(record.data.target_name(), Some(&name("ns1.example.")));
}

#[test]
fn test_soa_parsing() {
    let record = RecordBuilder::new()
        .record_type(RecordType::SOA)
        .data("ns1.example. hostmaster.example. 2024010101 7200 3600 1209600 300")
        .build();
    let soa = record.data.as_soa().unwrap();
    assert_eq!(soa.minimum, 300);
    assert_eq!(soa.serial, 2024010101);
    assert_eq!(soa.mname, name("ns1.example."));

    let bad = RecordData::parse(RecordType::SOA, "ns1 hostmaster 1 2", &name("example."));
    assert!(bad.is_err());
}

#[test]
fn test_mx_and_txt_parsing() {
    let origin = name("example.");
    let mx = RecordData::parse(RecordType::MX, "10 mail", &origin).unwrap();
    assert_eq!(mx.target_name(), Some(&name("mail.example.")));
    assert_eq!(mx.to_string(), "10 mail.example.");

    let txt = RecordData::parse(RecordType::TXT, "\"hello world\"", &origin).unwrap();
    assert_eq!(txt, RecordData::TXT(vec!["hello world".to_string()]));
}

#[test]
fn test_meta_types_carry_no_data() {
    assert!(RecordData::parse(RecordType::ANY, "x", &DnsName::root()).is_err());
}

#[test]
fn test_query_key_is_case_insensitive() {
    let a = DnsQuery::new(name("WWW.Example."), RecordType::A);
    let b = DnsQuery::new(name("www.example."), RecordType::A);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "www.example.|A|IN");
}

#[test]
fn test_status_maps_to_rcode() {
    assert_eq!(ResolutionStatus::NoData.response_code(), ResponseCode::NoError);
    assert_eq!(ResolutionStatus::NxDomain.response_code(), ResponseCode::NXDomain);
    assert_eq!(ResponseCode::from_u16(4), ResponseCode::NotImp);
    assert!(ResponseCode::FormErr.is_edns_rejection());
    assert!(!ResponseCode::ServFail.is_edns_rejection());
}

#[test]
fn test_class_parsing() {
    assert_eq!(DnsClass::from_str("chaos").unwrap(), DnsClass::CH);
    assert_eq!(DnsClass::from_str("CLASS42").unwrap(), DnsClass::Other(42));
    assert_eq!(DnsClass::from_u16(255), DnsClass::ANY);
}
