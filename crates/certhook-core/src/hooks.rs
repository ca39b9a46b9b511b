//! Challenge hook adapters
//!
//! Two stateless entry points invoked by the external ACME client during a
//! DNS-01 exchange, one process per invocation:
//!
//! - the **auth hook** derives the challenge record name from the domain
//!   under validation and creates the TXT record before the client proceeds;
//! - the **cleanup hook** recomputes the same record name and deletes every
//!   matching record afterwards.
//!
//! ## Event Flow
//!
//! 1. Read `CERTBOT_DOMAIN` (and `CERTBOT_VALIDATION` for auth) from the
//!    environment
//! 2. Derive the [`ChallengeTarget`] from the domain
//! 3. Resolve the provider factory from the registry and its credential from
//!    the factory's declared environment variable
//! 4. Create or clean up the TXT record through the provider
//! 5. Auth only: block for a fixed propagation delay before returning
//!
//! Both hooks are idempotent across re-runs: creation tolerates duplicate
//! TXT records (DNS allows multiple values per name) and cleanup of nothing
//! is a no-op success. All errors are terminal for the invoking process; the
//! ACME client owns retry policy across whole hook invocations.

use std::env;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::challenge::{
    ChallengeTarget, CleanupReport, check_subdomain_exists, cleanup_txt_records,
};
use crate::config::{HookConfig, validate_domain_name};
use crate::error::{Error, Result};
use crate::registry::ProviderRegistry;
use crate::traits::{DnsProvider, Record};

/// Environment variable carrying the domain under validation (set by certbot)
pub const DOMAIN_ENV: &str = "CERTBOT_DOMAIN";

/// Environment variable carrying the validation token (set by certbot,
/// auth hook only)
pub const VALIDATION_ENV: &str = "CERTBOT_VALIDATION";

/// Process exit codes for the hook binaries
///
/// - 0: success
/// - 1: configuration error (missing env var, unknown provider, missing
///   credential, malformed domain) — detected before any network call
/// - 2: provider/runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookExitCode {
    /// Hook completed successfully
    Success = 0,
    /// Configuration error
    ConfigError = 1,
    /// Provider or runtime error
    ProviderError = 2,
}

impl HookExitCode {
    /// Map a hook error to its exit code
    pub fn for_error(err: &Error) -> Self {
        if err.is_config() {
            Self::ConfigError
        } else {
            Self::ProviderError
        }
    }
}

impl From<HookExitCode> for std::process::ExitCode {
    fn from(code: HookExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Inputs to the auth hook, read from certbot's environment contract
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Fully-qualified domain under validation
    pub domain: String,
    /// Challenge token value to publish
    pub validation: String,
}

impl AuthRequest {
    /// Read the auth hook inputs from the environment
    ///
    /// Fails if `CERTBOT_DOMAIN` or `CERTBOT_VALIDATION` is absent or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            domain: require_env(DOMAIN_ENV)?,
            validation: require_env(VALIDATION_ENV)?,
        })
    }
}

/// Inputs to the cleanup hook, read from certbot's environment contract
#[derive(Debug, Clone)]
pub struct CleanupRequest {
    /// Fully-qualified domain that was validated
    pub domain: String,
}

impl CleanupRequest {
    /// Read the cleanup hook inputs from the environment
    ///
    /// Fails if `CERTBOT_DOMAIN` is absent or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            domain: require_env(DOMAIN_ENV)?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(format!("{} must be set", name)))
}

/// Resolve a provider instance from the registry and the environment
///
/// Looks up the factory by name, reads the credential from the factory's
/// declared environment variable, and constructs the provider. The
/// credential is resolved per invocation and never shared across processes.
pub fn resolve_provider(
    registry: &ProviderRegistry,
    name: &str,
) -> Result<Box<dyn DnsProvider>> {
    let factory = registry.get(name)?;

    let token = env::var(factory.token_env_var())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(format!("{} not set", factory.token_env_var())))?;

    factory.create(&token)
}

/// Create the challenge TXT record through a provider
///
/// Warns (non-blocking) when the target subdomain has no A record; a missing
/// address record usually means a typo in the requested domain, but it never
/// gates the challenge. Fails if the backend reports creation failure.
pub async fn place_challenge(
    provider: &dyn DnsProvider,
    target: &ChallengeTarget,
    validation: &str,
    ttl: u32,
) -> Result<Record> {
    match check_subdomain_exists(provider, &target.root_domain, &target.subdomain).await {
        Ok(true) => {}
        Ok(false) => warn!(
            subdomain = %target.subdomain,
            domain = %target.root_domain,
            "Subdomain has no A record; the issued certificate may point nowhere"
        ),
        Err(e) => debug!(error = %e, "Subdomain existence check failed; continuing"),
    }

    match provider
        .create_txt_record(&target.root_domain, &target.record_name, validation, ttl)
        .await?
    {
        Some(record) => {
            info!(record_id = %record.id, "DNS TXT record created successfully");
            Ok(record)
        }
        None => Err(Error::provider(
            provider.provider_name(),
            "Failed to create DNS TXT record",
        )),
    }
}

/// Remove all challenge TXT records for a target, best-effort
pub async fn remove_challenge(
    provider: &dyn DnsProvider,
    target: &ChallengeTarget,
) -> Result<CleanupReport> {
    cleanup_txt_records(provider, &target.root_domain, &target.record_name).await
}

/// Run the auth hook: derive, create, wait for propagation
///
/// Reads all inputs from the environment per the certbot hook contract.
pub async fn run_auth_hook(registry: &ProviderRegistry) -> Result<()> {
    let config = HookConfig::from_env();
    config.validate()?;
    let request = AuthRequest::from_env()?;

    run_auth_hook_inner(registry, &config, &request).await
}

async fn run_auth_hook_inner(
    registry: &ProviderRegistry,
    config: &HookConfig,
    request: &AuthRequest,
) -> Result<()> {
    validate_domain_name(&request.domain)?;

    let target = ChallengeTarget::derive(&request.domain);
    info!(
        domain = %request.domain,
        provider = %config.provider,
        root_domain = %target.root_domain,
        subdomain = %target.subdomain,
        record_name = %target.record_name,
        "Placing DNS-01 challenge record"
    );

    let provider = resolve_provider(registry, &config.provider)?;
    place_challenge(provider.as_ref(), &target, &request.validation, config.ttl).await?;

    info!(
        delay_secs = config.propagation_delay_secs,
        "Waiting for DNS propagation"
    );
    tokio::time::sleep(Duration::from_secs(config.propagation_delay_secs)).await;

    Ok(())
}

/// Run the cleanup hook: derive identically, delete all matches
///
/// Reads all inputs from the environment per the certbot hook contract.
/// Zero deletions is a success — the record may already be gone after a
/// prior partial run.
pub async fn run_cleanup_hook(registry: &ProviderRegistry) -> Result<()> {
    let config = HookConfig::from_env();
    config.validate()?;
    let request = CleanupRequest::from_env()?;

    run_cleanup_hook_inner(registry, &config, &request).await
}

async fn run_cleanup_hook_inner(
    registry: &ProviderRegistry,
    config: &HookConfig,
    request: &CleanupRequest,
) -> Result<()> {
    validate_domain_name(&request.domain)?;

    let target = ChallengeTarget::derive(&request.domain);
    info!(
        domain = %request.domain,
        provider = %config.provider,
        root_domain = %target.root_domain,
        record_name = %target.record_name,
        "Cleaning up DNS-01 challenge records"
    );

    let provider = resolve_provider(registry, &config.provider)?;
    let report = remove_challenge(provider.as_ref(), &target).await?;

    if report.deleted > 0 {
        info!(deleted = report.deleted, "DNS TXT records deleted");
    } else {
        info!("No matching DNS TXT records found to delete");
    }
    if !report.failed.is_empty() {
        warn!(
            failed = report.failed.len(),
            ids = ?report.failed,
            "Some TXT records could not be deleted"
        );
    }

    Ok(())
}
