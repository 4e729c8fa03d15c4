mod helpers;

use ferrous_recursor_application::ports::{RecursiveResolver, ResolveOptions};
use ferrous_recursor_domain::{
    Config, DnsQuery, RecordData, RecordType, ResolutionStatus, ResolveError,
};
use helpers::*;
use std::time::Duration;

const FORWARDER: &str = "192.0.2.53";

fn query(qname: &str, qtype: RecordType) -> DnsQuery {
    DnsQuery::new(name(qname), qtype)
}

fn forwarding_config(recurse: bool) -> Config {
    let mut config = test_config();
    config.authority_zones = vec![forward_zone("example.", &[FORWARDER], recurse)];
    config
}

#[tokio::test]
async fn test_cname_chain_is_chased_and_cached() {
    let h = harness(forwarding_config(false));
    h.transport.answer(
        FORWARDER,
        "a.example.",
        RecordType::A,
        authoritative(vec![cname("a.example.", "b.example.")]),
    );
    h.transport.answer(
        FORWARDER,
        "b.example.",
        RecordType::A,
        authoritative(vec![a("b.example.", "192.0.2.9")]),
    );

    let resolution = h
        .recursor
        .resolve(&query("a.example.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    let types: Vec<RecordType> = resolution.records.iter().map(|r| r.record_type).collect();
    assert_eq!(types, vec![RecordType::CNAME, RecordType::A]);
    assert_eq!(h.transport.ask_count(), 2);

    let again = h
        .recursor
        .resolve(&query("a.example.", RecordType::A), ResolveOptions::default())
        .await;
    assert_eq!(again.records.len(), 2);
    assert!(!again.variable);
    assert_eq!(h.transport.ask_count(), 2);
}

#[tokio::test]
async fn test_cname_loop_is_detected() {
    let h = harness(forwarding_config(false));
    h.transport.answer(
        FORWARDER,
        "a.example.",
        RecordType::A,
        authoritative(vec![cname("a.example.", "b.example.")]),
    );
    h.transport.answer(
        FORWARDER,
        "b.example.",
        RecordType::A,
        authoritative(vec![cname("b.example.", "a.example.")]),
    );

    let resolution = h
        .recursor
        .resolve(&query("a.example.", RecordType::A), ResolveOptions::default())
        .await;

    assert!(matches!(
        resolution.failure,
        Some(ResolveError::LoopDetected { .. })
    ));
    assert_eq!(h.transport.ask_count(), 2);
}

#[tokio::test]
async fn test_negative_answer_expires_with_soa_minimum() {
    let h = harness(forwarding_config(false));
    h.transport.answer(
        FORWARDER,
        "nope.example.",
        RecordType::A,
        nxdomain(soa("example.", 3600, 300)),
    );
    let q = query("nope.example.", RecordType::A);

    let first = h.recursor.resolve(&q, ResolveOptions::default()).await;
    assert_eq!(first.status, ResolutionStatus::NxDomain);
    assert_eq!(h.transport.ask_count(), 1);

    h.clock.advance(Duration::from_secs(299));
    let cached = h.recursor.resolve(&q, ResolveOptions::default()).await;
    assert_eq!(cached.status, ResolutionStatus::NxDomain);
    assert!(!cached.variable);
    assert_eq!(h.transport.ask_count(), 1);

    let other_type = h
        .recursor
        .resolve(&query("nope.example.", RecordType::AAAA), ResolveOptions::default())
        .await;
    assert_eq!(other_type.status, ResolutionStatus::NxDomain);
    assert_eq!(h.transport.ask_count(), 1);

    h.clock.advance(Duration::from_secs(2));
    let expired = h.recursor.resolve(&q, ResolveOptions::default()).await;
    assert_eq!(expired.status, ResolutionStatus::NxDomain);
    assert_eq!(h.transport.ask_count(), 2);
}

#[tokio::test]
async fn test_nodata_is_cached_per_type() {
    let h = harness(forwarding_config(false));
    h.transport.answer(
        FORWARDER,
        "www.example.",
        RecordType::AAAA,
        nodata(soa("example.", 3600, 300)),
    );
    h.transport.answer(
        FORWARDER,
        "www.example.",
        RecordType::A,
        authoritative(vec![a("www.example.", "192.0.2.10")]),
    );

    let aaaa = h
        .recursor
        .resolve(&query("www.example.", RecordType::AAAA), ResolveOptions::default())
        .await;
    assert_eq!(aaaa.status, ResolutionStatus::NoData);

    let v4 = h
        .recursor
        .resolve(&query("www.example.", RecordType::A), ResolveOptions::default())
        .await;
    assert_eq!(v4.status, ResolutionStatus::NoError);
    assert_eq!(h.transport.ask_count(), 2);
}

#[tokio::test]
async fn test_recursing_forwarder_answer_is_final() {
    let mut config = Config::default();
    config.authority_zones = vec![forward_zone("corp.", &[FORWARDER], true)];
    let h = harness(config);
    let mut reply = authoritative(vec![
        cname("www.corp.", "cdn.other."),
        a("cdn.other.", "198.51.100.7"),
    ]);
    reply.authoritative = false;
    h.transport.answer(FORWARDER, "www.corp.", RecordType::A, reply);

    let resolution = h
        .recursor
        .resolve(&query("www.corp.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    assert_eq!(resolution.records.len(), 2);
    assert_eq!(
        resolution.records[1].data,
        RecordData::A("198.51.100.7".parse().unwrap())
    );

    let asks = h.transport.asks();
    assert_eq!(asks.len(), 1);
    assert!(asks[0].recursion_desired);
}

#[tokio::test]
async fn test_forwarders_bypass_dont_query() {
    let mut config = Config::default();
    config.authority_zones = vec![forward_zone("example.", &[FORWARDER], false)];
    let h = harness(config);
    h.transport.answer(
        FORWARDER,
        "www.example.",
        RecordType::A,
        authoritative(vec![a("www.example.", "192.0.2.10")]),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    assert_eq!(h.transport.asks_to(FORWARDER), 1);
}

#[tokio::test]
async fn test_skip_out_of_band_ignores_forwarding_zone() {
    let h = harness(forwarding_config(false));
    h.transport.answer(
        ROOT_SERVER,
        "www.example.",
        RecordType::A,
        authoritative(vec![a("www.example.", "192.0.2.11")]),
    );

    let options = ResolveOptions {
        skip_out_of_band: true,
        ..Default::default()
    };
    let resolution = h
        .recursor
        .resolve(&query("www.example.", RecordType::A), options)
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    assert_eq!(h.transport.asks_to(FORWARDER), 0);
    assert_eq!(h.transport.asks_to(ROOT_SERVER), 1);
}

#[tokio::test]
async fn test_failing_forwarder_falls_over_to_the_next() {
    let mut config = test_config();
    config.authority_zones = vec![forward_zone(
        "example.",
        &["192.0.2.53", "192.0.2.54"],
        false,
    )];
    let h = harness(config);
    h.transport.fail(
        "192.0.2.53",
        "www.example.",
        RecordType::A,
        ferrous_recursor_domain::NetworkError::Timeout,
    );
    h.transport.answer(
        "192.0.2.54",
        "www.example.",
        RecordType::A,
        authoritative(vec![a("www.example.", "192.0.2.10")]),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    assert_eq!(h.transport.asks_to("192.0.2.54"), 1);
}
