mod helpers;

use ferrous_recursor_application::ports::{
    Clock, RecursiveResolver, RecursorAdminPort, ResolveOptions,
};
use ferrous_recursor_domain::{
    Config, DnsQuery, RecordData, RecordType, ResolutionStatus, ResolveError,
};
use helpers::*;

fn query(qname: &str, qtype: RecordType) -> DnsQuery {
    DnsQuery::new(name(qname), qtype)
}

/// Root delegates `test.` to ns.test (192.0.2.2) with glue.
fn script_root_referral(transport: &MockTransport, qname: &str) {
    transport.answer(
        ROOT_SERVER,
        qname,
        RecordType::A,
        referral(vec![ns("test.", "ns.test.")], vec![glue("ns.test.", "192.0.2.2")]),
    );
}

#[tokio::test]
async fn test_resolves_through_referral_from_root_hints() {
    let h = harness(test_config());
    script_root_referral(&h.transport, "www.example.test.");
    h.transport.answer(
        "192.0.2.2",
        "www.example.test.",
        RecordType::A,
        authoritative(vec![a("www.example.test.", "192.0.2.80")]),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    assert_eq!(resolution.records.len(), 1);
    assert_eq!(
        resolution.records[0].data,
        RecordData::A("192.0.2.80".parse().unwrap())
    );
    assert!(resolution.variable);
    assert_eq!(resolution.counters.queries_sent, 2);
    assert_eq!(h.transport.asks_to(ROOT_SERVER), 1);
    assert_eq!(h.transport.asks_to("192.0.2.2"), 1);

    let asks = h.transport.asks();
    assert!(asks.iter().all(|ask| !ask.recursion_desired));
    assert!(asks.iter().all(|ask| ask.edns_version == Some(0)));
}

#[tokio::test]
async fn test_second_lookup_is_served_from_cache() {
    let h = harness(test_config());
    script_root_referral(&h.transport, "www.example.test.");
    h.transport.answer(
        "192.0.2.2",
        "www.example.test.",
        RecordType::A,
        authoritative(vec![a("www.example.test.", "192.0.2.80")]),
    );
    let q = query("www.example.test.", RecordType::A);

    h.recursor.resolve(&q, ResolveOptions::default()).await;
    let second = h.recursor.resolve(&q, ResolveOptions::default()).await;

    assert_eq!(second.status, ResolutionStatus::NoError);
    assert!(!second.variable);
    assert_eq!(second.counters.cache_hits, 1);
    assert_eq!(h.transport.ask_count(), 2);
}

#[tokio::test]
async fn test_cached_delegation_skips_the_root() {
    let h = harness(test_config());
    script_root_referral(&h.transport, "www.example.test.");
    h.transport.answer(
        "192.0.2.2",
        "www.example.test.",
        RecordType::A,
        authoritative(vec![a("www.example.test.", "192.0.2.80")]),
    );
    h.transport.answer(
        "192.0.2.2",
        "mail.example.test.",
        RecordType::A,
        authoritative(vec![a("mail.example.test.", "192.0.2.81")]),
    );

    h.recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;
    let mail = h
        .recursor
        .resolve(&query("mail.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(mail.status, ResolutionStatus::NoError);
    assert_eq!(mail.counters.queries_sent, 1);
    assert_eq!(h.transport.asks_to(ROOT_SERVER), 1);
}

#[tokio::test]
async fn test_nxdomain_from_authoritative_server() {
    let h = harness(test_config());
    script_root_referral(&h.transport, "missing.test.");
    h.transport.answer(
        "192.0.2.2",
        "missing.test.",
        RecordType::A,
        nxdomain(soa("test.", 3600, 600)),
    );

    let resolution = h
        .recursor
        .resolve(&query("missing.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NxDomain);
    assert_eq!(resolution.authority().count(), 1);
    assert_eq!(h.recursor.negative_cache().len(), 1);
}

#[tokio::test]
async fn test_upward_referral_ends_in_servfail() {
    let h = harness(test_config());
    script_root_referral(&h.transport, "www.example.test.");
    h.transport.answer(
        "192.0.2.2",
        "www.example.test.",
        RecordType::A,
        referral(vec![ns(".", "a.root.test.")], vec![]),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert!(resolution.is_servfail());
    assert!(matches!(
        resolution.failure,
        Some(ResolveError::ServersExhausted { .. })
    ));
    assert_eq!(h.transport.ask_count(), 2);
}

#[tokio::test]
async fn test_glueless_delegation_cycle_terminates() {
    let mut config = test_config();
    config.resolver.do_ipv6 = false;
    let h = harness(config);

    h.transport.answer(
        ROOT_SERVER,
        "www.example.test.",
        RecordType::A,
        referral(vec![ns("example.test.", "ns.other.test.")], vec![]),
    );
    h.transport.answer(
        ROOT_SERVER,
        "ns.other.test.",
        RecordType::A,
        referral(vec![ns("other.test.", "ns.example.test.")], vec![]),
    );
    h.transport.answer(
        ROOT_SERVER,
        "ns.example.test.",
        RecordType::A,
        referral(vec![ns("example.test.", "ns.other.test.")], vec![]),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert!(resolution.is_servfail());
    assert!(resolution.failure.is_some());
    assert!(h.transport.ask_count() <= 50);
}

#[tokio::test]
async fn test_depth_limit() {
    let mut config = test_config();
    config.resolver.max_depth = 1;
    let h = harness(config);

    script_root_referral(&h.transport, "www.example.test.");
    h.transport.answer(
        "192.0.2.2",
        "www.example.test.",
        RecordType::A,
        referral(
            vec![ns("example.test.", "ns.example.test.")],
            vec![glue("ns.example.test.", "192.0.2.3")],
        ),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert!(matches!(
        resolution.failure,
        Some(ResolveError::DepthExceeded { depth: 1 })
    ));
    assert_eq!(h.transport.asks_to("192.0.2.3"), 0);
}

#[tokio::test]
async fn test_query_limit() {
    let mut config = test_config();
    config.resolver.max_queries_per_query = 1;
    let h = harness(config);
    script_root_referral(&h.transport, "www.example.test.");

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert!(matches!(
        resolution.failure,
        Some(ResolveError::QueryLimitExceeded { limit: 1 })
    ));
    assert_eq!(h.transport.ask_count(), 1);
}

#[tokio::test]
async fn test_dont_query_networks_are_never_asked() {
    let mut config = test_config();
    config.resolver.dont_query = Config::default().resolver.dont_query;
    let h = harness(config);
    script_root_referral(&h.transport, "www.example.test.");

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert!(resolution.is_servfail());
    assert_eq!(h.transport.ask_count(), 0);
    assert!(h.recursor.stats().dont_queries >= 1);
}

#[tokio::test]
async fn test_cache_only_miss_is_nodata() {
    let h = harness(test_config());

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::cache_only())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoData);
    assert!(resolution.records.is_empty());
    assert_eq!(h.transport.ask_count(), 0);
}

#[tokio::test]
async fn test_without_root_hints_there_is_no_authority() {
    let mut config = test_config();
    config.root_hints.clear();
    let h = harness(config);

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert!(matches!(
        resolution.failure,
        Some(ResolveError::NoAuthorityFound { .. })
    ));
}

#[tokio::test]
async fn test_nameserver_address_is_resolved_when_glue_is_missing() {
    let h = harness(test_config());
    h.transport.answer(
        ROOT_SERVER,
        "www.example.test.",
        RecordType::A,
        referral(vec![ns("example.test.", "ns.provider.test.")], vec![]),
    );
    h.transport.answer(
        ROOT_SERVER,
        "ns.provider.test.",
        RecordType::A,
        referral(
            vec![ns("provider.test.", "a.ns.provider.test.")],
            vec![glue("a.ns.provider.test.", "192.0.2.4")],
        ),
    );
    h.transport.answer(
        "192.0.2.4",
        "ns.provider.test.",
        RecordType::A,
        authoritative(vec![a("ns.provider.test.", "192.0.2.5")]),
    );
    h.transport.answer(
        "192.0.2.5",
        "www.example.test.",
        RecordType::A,
        authoritative(vec![a("www.example.test.", "192.0.2.80")]),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    assert_eq!(resolution.counters.queries_sent, 4);
}

#[tokio::test]
async fn test_delegation_only_zone_refuses_synthesized_answers() {
    let mut config = test_config();
    config.resolver.delegation_only = vec!["test.".to_string()];
    let h = harness(config);
    script_root_referral(&h.transport, "www.example.test.");
    h.transport.answer(
        "192.0.2.2",
        "www.example.test.",
        RecordType::A,
        authoritative(vec![a("www.example.test.", "192.0.2.80")]),
    );

    let resolution = h
        .recursor
        .resolve(&query("www.example.test.", RecordType::A), ResolveOptions::default())
        .await;

    assert_eq!(resolution.status, ResolutionStatus::NxDomain);
    assert!(resolution.records.is_empty());
    assert!(h.recursor.negative_cache().is_empty());
    let cached = h
        .recursor
        .record_cache()
        .get(&name("www.example.test."), RecordType::A, h.clock.now());
    assert!(cached.is_none());
}
