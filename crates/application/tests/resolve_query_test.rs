mod helpers;

use ferrous_recursor_application::ports::{Resolution, ResolveOptions};
use ferrous_recursor_application::use_cases::ResolveQueryUseCase;
use ferrous_recursor_domain::{DomainError, RecordType, ResolutionStatus, ResolveError};
use helpers::{a_record, noerror, MockRecursiveResolver};
use std::sync::Arc;

#[tokio::test]
async fn test_execute_returns_resolver_answer() {
    let resolver = Arc::new(MockRecursiveResolver::new());
    resolver
        .set_response(
            "www.example.",
            noerror(vec![a_record("www.example.", "192.0.2.10")]),
        )
        .await;

    let use_case = ResolveQueryUseCase::new(resolver.clone());
    let resolution = use_case
        .execute("WWW.Example.", RecordType::A, ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(resolution.status, ResolutionStatus::NoError);
    assert_eq!(resolution.answers().count(), 1);

    let calls = resolver.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.name.as_str(), "www.example.");
}

#[tokio::test]
async fn test_execute_passes_options_through() {
    let resolver = Arc::new(MockRecursiveResolver::new());
    let use_case = ResolveQueryUseCase::new(resolver.clone());

    let _ = use_case
        .execute("example.", RecordType::MX, ResolveOptions::cache_only())
        .await
        .unwrap();

    let calls = resolver.calls();
    assert!(calls[0].1.cache_only);
    assert_eq!(calls[0].0.record_type, RecordType::MX);
}

#[tokio::test]
async fn test_execute_reports_failure_as_servfail() {
    let resolver = Arc::new(MockRecursiveResolver::new());
    let use_case = ResolveQueryUseCase::new(resolver);

    let resolution = use_case
        .execute("unknown.example.", RecordType::A, ResolveOptions::default())
        .await
        .unwrap();

    assert!(resolution.is_servfail());
    assert!(matches!(
        resolution.failure,
        Some(ResolveError::NoAuthorityFound { .. })
    ));
}

#[tokio::test]
async fn test_execute_rejects_invalid_name_without_resolving() {
    let resolver = Arc::new(MockRecursiveResolver::new());
    let use_case = ResolveQueryUseCase::new(resolver.clone());

    let result = use_case
        .execute("bad..name", RecordType::A, ResolveOptions::default())
        .await;

    assert!(matches!(result, Err(DomainError::InvalidDomainName(_))));
    assert!(resolver.calls().is_empty());
}

#[test]
fn test_servfail_resolution_has_no_records() {
    let resolution = Resolution::servfail(ResolveError::TimeLimitExceeded);
    assert_eq!(resolution.status, ResolutionStatus::ServFail);
    assert!(resolution.records.is_empty());
    assert!(!resolution.variable);
}
