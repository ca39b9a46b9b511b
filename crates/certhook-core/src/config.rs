//! Configuration types for the certhook system
//!
//! Hook processes are configured entirely through environment variables:
//!
//! - `DNS_PROVIDER`: registry key of the DNS provider (default: `digitalocean`)
//! - `CERTHOOK_TTL`: TTL in seconds for challenge TXT records (default: 60)
//! - `CERTHOOK_PROPAGATION_DELAY`: seconds to wait after record creation
//!   before returning control to the ACME client (default: 10)
//!
//! The provider credential variable is not configured here; each provider
//! declares its own variable name (e.g. `DIGITALOCEAN_API_TOKEN`) via
//! [`DnsProviderFactory::token_env_var`](crate::traits::DnsProviderFactory).

use serde::{Deserialize, Serialize};
use std::env;

/// Default provider registry key when `DNS_PROVIDER` is unset
pub const DEFAULT_PROVIDER: &str = "digitalocean";

/// Default TTL for challenge TXT records (seconds)
pub const DEFAULT_CHALLENGE_TTL: u32 = 60;

/// Default post-creation propagation delay (seconds)
///
/// The ACME client attempts DNS validation immediately after the auth hook
/// returns; authoritative nameservers need a moment to absorb the change.
pub const DEFAULT_PROPAGATION_DELAY_SECS: u64 = 10;

/// Per-invocation hook configuration
///
/// Constructed once per process from the environment and passed explicitly
/// into the hook flow; there is no shared mutable configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Provider registry key
    pub provider: String,

    /// TTL for created TXT records, in seconds
    pub ttl: u32,

    /// Seconds to block after record creation for DNS propagation
    pub propagation_delay_secs: u64,
}

impl HookConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            provider: env::var("DNS_PROVIDER")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            ttl: env::var("CERTHOOK_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CHALLENGE_TTL),
            propagation_delay_secs: env::var("CERTHOOK_PROPAGATION_DELAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PROPAGATION_DELAY_SECS),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.provider.is_empty() {
            return Err(crate::Error::config("DNS_PROVIDER cannot be empty"));
        }

        if self.ttl == 0 {
            return Err(crate::Error::config("CERTHOOK_TTL must be > 0"));
        }

        Ok(())
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            ttl: DEFAULT_CHALLENGE_TTL,
            propagation_delay_secs: DEFAULT_PROPAGATION_DELAY_SECS,
        }
    }
}

/// Validate that a string is a plausible DNS domain name
///
/// Basic RFC 1035 checks; not comprehensive but catches common errors before
/// any network call is made.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::invalid_input("Domain name cannot be empty"));
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        return Err(crate::Error::invalid_input(format!(
            "Domain name too long: {} chars (max 253)",
            domain.len()
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::invalid_input(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::invalid_input(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        // Alphanumeric, hyphen, and leading underscore (service labels such
        // as _acme-challenge are valid record owners)
        if !label
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(crate::Error::invalid_input(format!(
                "Domain label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::invalid_input(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}
