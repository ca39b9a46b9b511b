//! Contract Test: Cleanup Idempotency & Best-Effort Semantics
//!
//! Cleanup must be safe to re-run (zero matches is a success), must filter
//! to exact name+type matches only, and must continue past individual
//! deletion failures while reporting what it could not remove.

mod common;

use certhook_core::challenge::{
    check_subdomain_exists, cleanup_txt_records, find_txt_records,
};
use common::MockDnsProvider;

#[tokio::test]
async fn cleanup_with_zero_matches_is_a_noop_success() {
    let provider = MockDnsProvider::new(&["example.com"]);

    let report = cleanup_txt_records(&provider, "example.com", "_acme-challenge.www")
        .await
        .expect("cleanup succeeds with nothing to delete");
    assert_eq!(report.deleted, 0);
    assert!(report.failed.is_empty());
    assert_eq!(provider.delete_call_count(), 0);
}

#[tokio::test]
async fn cleanup_twice_second_pass_deletes_nothing() {
    let provider = MockDnsProvider::new(&["example.com"]);
    provider.seed_record("example.com", "_acme-challenge.www", "TXT", "abc123");

    let first = cleanup_txt_records(&provider, "example.com", "_acme-challenge.www")
        .await
        .unwrap();
    assert_eq!(first.deleted, 1);

    let second = cleanup_txt_records(&provider, "example.com", "_acme-challenge.www")
        .await
        .unwrap();
    assert_eq!(second.deleted, 0);
    assert!(second.failed.is_empty());
}

#[tokio::test]
async fn find_matches_on_exact_name_and_type_only() {
    let provider = MockDnsProvider::new(&["example.com"]);
    // Matching name, wrong type
    provider.seed_record("example.com", "_acme-challenge.www", "A", "192.0.2.1");
    // Matching type, wrong name
    provider.seed_record("example.com", "_acme-challenge.www.extra", "TXT", "nope");
    provider.seed_record("example.com", "_acme-challenge", "TXT", "nope");
    // Exact match
    let wanted = provider.seed_record("example.com", "_acme-challenge.www", "TXT", "abc123");

    let matches = find_txt_records(&provider, "example.com", "_acme-challenge.www")
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, wanted);
}

#[tokio::test]
async fn cleanup_continues_past_individual_failures() {
    let provider = MockDnsProvider::new(&["example.com"]);
    let a = provider.seed_record("example.com", "_acme-challenge.www", "TXT", "one");
    let b = provider.seed_record("example.com", "_acme-challenge.www", "TXT", "two");
    let c = provider.seed_record("example.com", "_acme-challenge.www", "TXT", "three");
    provider.mark_undeletable(&b);

    let report = cleanup_txt_records(&provider, "example.com", "_acme-challenge.www")
        .await
        .unwrap();

    // All three were attempted; the count reflects only confirmed deletions
    assert_eq!(provider.delete_call_count(), 3);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.failed, vec![b.clone()]);

    let remaining = provider.records_for("example.com");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b);
    assert!(!remaining.iter().any(|r| r.id == a || r.id == c));
}

#[tokio::test]
async fn unknown_domain_surfaces_as_error() {
    let provider = MockDnsProvider::new(&["example.com"]);

    let result = cleanup_txt_records(&provider, "other.org", "_acme-challenge").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn empty_subdomain_always_exists() {
    let provider = MockDnsProvider::new(&["example.com"]);

    // Root-domain certificates never need the address-record check
    assert!(check_subdomain_exists(&provider, "example.com", "")
        .await
        .unwrap());
}

#[tokio::test]
async fn subdomain_exists_requires_an_a_record() {
    let provider = MockDnsProvider::new(&["example.com"]);
    provider.seed_record("example.com", "www", "TXT", "not an address");

    assert!(!check_subdomain_exists(&provider, "example.com", "www")
        .await
        .unwrap());

    provider.seed_record("example.com", "www", "A", "192.0.2.1");
    assert!(check_subdomain_exists(&provider, "example.com", "www")
        .await
        .unwrap());
}
