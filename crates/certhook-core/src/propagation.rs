//! Advisory DNS propagation checking
//!
//! Queries public resolvers for the challenge TXT record. Strictly advisory:
//! the auth hook relies on its fixed post-creation delay, and this check
//! never gates hook success. Absence of the record (NXDOMAIN, empty answer)
//! means "not yet propagated", not an error.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{Resolver, TokioResolver};
use tracing::{debug, trace};

use crate::challenge::ChallengeTarget;
use crate::error::{Error, Result};

/// Configuration for propagation checking
#[derive(Debug, Clone)]
pub struct PropagationConfig {
    /// Per-query timeout
    pub query_timeout: Duration,
    /// Nameservers to query (empty = system defaults)
    pub nameservers: Vec<IpAddr>,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
            nameservers: vec![
                IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), // Google DNS
                IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), // Cloudflare DNS
            ],
        }
    }
}

/// Resolver-backed checker for challenge TXT records
#[derive(Debug)]
pub struct PropagationChecker {
    resolver: TokioResolver,
}

impl PropagationChecker {
    /// Create a checker with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(PropagationConfig::default())
    }

    /// Create a checker with custom configuration
    pub fn with_config(config: PropagationConfig) -> Result<Self> {
        let resolver_config = if config.nameservers.is_empty() {
            ResolverConfig::default()
        } else {
            let mut resolver_config = ResolverConfig::new();
            for ip in &config.nameservers {
                resolver_config
                    .add_name_server(NameServerConfig::new(SocketAddr::new(*ip, 53), Protocol::Udp));
            }
            resolver_config
        };

        let mut opts = ResolverOpts::default();
        opts.timeout = config.query_timeout;
        opts.attempts = 2;
        opts.cache_size = 0; // cached answers defeat a propagation check

        let resolver =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();
        Ok(Self { resolver })
    }

    /// Check whether the challenge TXT record for `domain` has propagated
    ///
    /// With `expected_value`, requires a TXT answer carrying exactly that
    /// value; without, any TXT answer at the challenge name counts.
    pub async fn check(&self, domain: &str, expected_value: Option<&str>) -> Result<bool> {
        let record_name = ChallengeTarget::derive(domain).fqdn();
        debug!(record = %record_name, "Querying for challenge TXT record");

        match self.resolver.txt_lookup(&record_name).await {
            Ok(answers) => {
                for answer in answers.iter() {
                    let value: String = answer
                        .txt_data()
                        .iter()
                        .map(|data| String::from_utf8_lossy(data))
                        .collect();
                    trace!(record = %record_name, found = %value, "TXT answer");

                    match expected_value {
                        Some(expected) if value == expected => return Ok(true),
                        Some(_) => continue,
                        None => return Ok(true),
                    }
                }
                Ok(false)
            }
            Err(e) => {
                // NXDOMAIN or an empty answer is expected while the record
                // is still propagating.
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("no records found")
                    || err_str.contains("nxdomain")
                    || err_str.contains("record not found")
                {
                    Ok(false)
                } else {
                    Err(Error::http(format!(
                        "DNS lookup failed for '{}': {}",
                        record_name, e
                    )))
                }
            }
        }
    }
}
