// # DNS Provider Trait
//
// Defines the interface for managing challenge records via DNS hosting
// provider APIs.
//
// ## Implementations
//
// - DigitalOcean: `certhook-provider-digitalocean` crate
// - Future: Cloudflare, Hetzner, Route53, etc.

use async_trait::async_trait;

use crate::error::Result;

/// A DNS resource record as exposed by a provider
///
/// Records are read-only snapshots fetched on demand; the provider's API is
/// the sole source of truth. `name` is the label portion relative to the
/// domain, not fully qualified (e.g. `_acme-challenge.www`, not
/// `_acme-challenge.www.example.com`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Provider-assigned opaque identifier, used for deletion
    pub id: String,
    /// Record name relative to the domain
    pub name: String,
    /// Record type (e.g. "TXT", "A")
    pub record_type: String,
    /// Record data/value
    pub data: String,
}

/// Trait for DNS provider implementations
///
/// A provider is a stateful handle bound to one API credential and one
/// backend; it owns the credential and HTTP transport configuration for its
/// lifetime. One instance is constructed per hook invocation and discarded
/// after use.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Error Conventions
///
/// The four operations deliberately differ in how they report failure:
///
/// - `fetch_domains` / `fetch_domain_records` surface network and auth
///   errors to the caller.
/// - `create_txt_record` returns `Ok(None)` when the backend reports
///   failure; it never errors for "already exists" (duplicate TXT names are
///   acceptable, the backend decides dedup behavior).
/// - `delete_txt_record` returns `Ok(false)` rather than erroring on
///   not-found, so cleanup stays idempotent.
///
/// Providers must not retry or back off internally; the external ACME client
/// owns retry policy across whole hook invocations.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Get the provider name (used in registry lookups and logging)
    fn provider_name(&self) -> &'static str;

    /// Name of the environment variable that carries this provider's API
    /// credential (e.g. `DIGITALOCEAN_API_TOKEN`)
    fn token_env_var(&self) -> &'static str;

    /// Fetch the list of domains managed by this provider account
    async fn fetch_domains(&self) -> Result<Vec<String>>;

    /// Fetch all DNS records for a domain
    ///
    /// Errors if the domain is unknown to the backend.
    async fn fetch_domain_records(&self, domain: &str) -> Result<Vec<Record>>;

    /// Create a TXT record for a DNS challenge
    ///
    /// # Parameters
    ///
    /// - `domain`: root domain (e.g. "example.com")
    /// - `record_name`: record name relative to the domain
    ///   (e.g. "_acme-challenge.www")
    /// - `value`: TXT record value (the validation token)
    /// - `ttl`: time to live in seconds
    ///
    /// # Returns
    ///
    /// The created record (with its provider-assigned identifier), or
    /// `None` if the backend reported failure.
    async fn create_txt_record(
        &self,
        domain: &str,
        record_name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Option<Record>>;

    /// Delete a record by its provider-assigned identifier
    ///
    /// Returns `true` if the record was deleted, `false` if it was not found
    /// or the backend refused.
    async fn delete_txt_record(&self, domain: &str, record_id: &str) -> Result<bool>;
}

/// Helper trait for constructing DNS providers from a credential
///
/// Factories carry the provider metadata that must be available *before* a
/// provider instance exists: the registry name and the environment variable
/// holding the credential. This keeps the hook adapters provider-agnostic;
/// they ask the factory "what variable holds your secret?" instead of
/// hardcoding it.
pub trait DnsProviderFactory: Send + Sync {
    /// Registry key for this provider (lowercase)
    fn provider_name(&self) -> &'static str;

    /// Name of the environment variable that must carry the API credential
    fn token_env_var(&self) -> &'static str;

    /// Create a provider instance bound to the given API token
    ///
    /// An empty token is a configuration error.
    fn create(&self, api_token: &str) -> Result<Box<dyn DnsProvider>>;
}
