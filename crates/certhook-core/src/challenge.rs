//! Challenge-record naming and lifecycle helpers
//!
//! Provider-agnostic logic layered on the four primitive [`DnsProvider`]
//! operations: derive the challenge target from a fully-qualified domain,
//! find TXT records by exact name, check for an existing subdomain address
//! record, and best-effort cleanup of all matching TXT records.
//!
//! The derivation is the load-bearing invariant of the whole system: the
//! auth and cleanup hooks recompute it independently from the same domain
//! string, so cleanup can locate exactly what creation made. Changing the
//! splitting rule between versions orphans records.

use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::{DnsProvider, Record};

/// Record name prefix mandated by the DNS-01 challenge
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// The (root domain, subdomain, record name) triple derived from a
/// fully-qualified challenge domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeTarget {
    /// Registrable domain the record is created under (e.g. "example.com")
    pub root_domain: String,
    /// Subdomain prefix, empty for a bare root domain
    pub subdomain: String,
    /// TXT record name relative to the root domain
    pub record_name: String,
}

impl ChallengeTarget {
    /// Derive the challenge target from a fully-qualified domain
    ///
    /// With more than two labels, the root domain is the last two labels and
    /// the record name is `_acme-challenge.{subdomain}`. With two or fewer,
    /// the domain is taken as the root and the record name is the bare
    /// `_acme-challenge` label.
    ///
    /// Known limitation: the two-label split mis-handles multi-label public
    /// suffixes such as `co.uk` (`shop.example.co.uk` roots at
    /// `example.co.uk`'s suffix, not the registrable domain).
    pub fn derive(domain: &str) -> Self {
        let labels: Vec<&str> = domain.split('.').collect();

        if labels.len() > 2 {
            let root_domain = labels[labels.len() - 2..].join(".");
            let subdomain = labels[..labels.len() - 2].join(".");
            let record_name = format!("{}.{}", ACME_CHALLENGE_LABEL, subdomain);
            Self {
                root_domain,
                subdomain,
                record_name,
            }
        } else {
            Self {
                root_domain: domain.to_string(),
                subdomain: String::new(),
                record_name: ACME_CHALLENGE_LABEL.to_string(),
            }
        }
    }

    /// Fully-qualified owner name of the challenge record
    ///
    /// This is what a resolver must see; equal to
    /// `_acme-challenge.{original domain}`.
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            format!("{}.{}", ACME_CHALLENGE_LABEL, self.root_domain)
        } else {
            format!(
                "{}.{}.{}",
                ACME_CHALLENGE_LABEL, self.subdomain, self.root_domain
            )
        }
    }
}

/// Outcome of a best-effort cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Number of records confirmed deleted
    pub deleted: usize,
    /// Identifiers of matching records that could not be deleted
    pub failed: Vec<String>,
}

/// Find TXT records exactly matching a record name
///
/// Fetches all records for `domain` and filters to exact matches on both
/// type == "TXT" and name == `record_name`. No partial or prefix matching.
pub async fn find_txt_records(
    provider: &dyn DnsProvider,
    domain: &str,
    record_name: &str,
) -> Result<Vec<Record>> {
    let records = provider.fetch_domain_records(domain).await?;
    Ok(records
        .into_iter()
        .filter(|r| r.record_type == "TXT" && r.name == record_name)
        .collect())
}

/// Check whether a subdomain already has an A record
///
/// Returns `true` unconditionally for an empty subdomain (root-domain
/// certificates never need this check). Used only as a non-blocking warning,
/// never as a gate.
pub async fn check_subdomain_exists(
    provider: &dyn DnsProvider,
    domain: &str,
    subdomain: &str,
) -> Result<bool> {
    if subdomain.is_empty() {
        return Ok(true);
    }

    let records = provider.fetch_domain_records(domain).await?;
    Ok(records
        .iter()
        .any(|r| r.name == subdomain && r.record_type == "A"))
}

/// Delete all TXT records matching a record name, best-effort
///
/// Attempts each deletion independently and continues past individual
/// failures; the report counts confirmed deletions and carries the
/// identifiers that could not be removed. Zero matches is a successful
/// no-op, not an error.
pub async fn cleanup_txt_records(
    provider: &dyn DnsProvider,
    domain: &str,
    record_name: &str,
) -> Result<CleanupReport> {
    let matches = find_txt_records(provider, domain, record_name).await?;
    debug!(
        domain,
        record_name,
        matches = matches.len(),
        "Matching TXT records found for cleanup"
    );

    let mut report = CleanupReport::default();
    for record in matches {
        match provider.delete_txt_record(domain, &record.id).await {
            Ok(true) => report.deleted += 1,
            Ok(false) => {
                warn!(record_id = %record.id, "TXT record was not deleted");
                report.failed.push(record.id);
            }
            Err(e) => {
                warn!(record_id = %record.id, error = %e, "TXT record deletion failed");
                report.failed.push(record.id);
            }
        }
    }

    Ok(report)
}
