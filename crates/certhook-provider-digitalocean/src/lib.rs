// # DigitalOcean DNS Provider
//
// DigitalOcean implementation of the certhook DnsProvider trait, over the
// DigitalOcean API v2.
//
// ## Behavior
//
// - One HTTP request per trait operation; no retries, no backoff (the
//   external ACME client owns retry policy across hook invocations)
// - 30 second HTTP timeout on every request
// - `create_txt_record` maps any backend failure to `None` rather than an
//   error; `delete_txt_record` maps not-found and backend refusal to `false`
// - The API token never appears in logs or Debug output
//
// ## API Reference
//
// - DigitalOcean API v2: https://docs.digitalocean.com/reference/api/
// - List domains: GET `/v2/domains`
// - List records: GET `/v2/domains/{domain}/records`
// - Create record: POST `/v2/domains/{domain}/records`
// - Delete record: DELETE `/v2/domains/{domain}/records/{id}` (204 on success)

use std::time::Duration;

use async_trait::async_trait;
use certhook_core::traits::{DnsProvider, DnsProviderFactory, Record};
use certhook_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// DigitalOcean API base URL
const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry key for this provider
pub const PROVIDER_NAME: &str = "digitalocean";

/// Environment variable carrying the API credential
pub const TOKEN_ENV_VAR: &str = "DIGITALOCEAN_API_TOKEN";

/// DigitalOcean DNS provider
///
/// Bound to one API token for its lifetime; constructed once per hook
/// invocation and discarded after use.
pub struct DigitalOceanProvider {
    /// DigitalOcean API token — never log this value
    api_token: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DigitalOceanProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanProvider")
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

impl DigitalOceanProvider {
    /// Create a new DigitalOcean provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: DigitalOcean personal access token with domain
    ///   read/write scope
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { api_token, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", DIGITALOCEAN_API_BASE, path)
    }

    /// Map a non-2xx response to an error, reading the body for detail
    async fn response_error(op: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid DigitalOcean API token or insufficient scope (HTTP {})",
                status
            )),
            404 => Error::not_found(format!("{}: HTTP 404 - {}", op, body)),
            _ => Error::provider(
                PROVIDER_NAME,
                format!("{}: HTTP {} - {}", op, status, body),
            ),
        }
    }
}

#[async_trait]
impl DnsProvider for DigitalOceanProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn token_env_var(&self) -> &'static str {
        TOKEN_ENV_VAR
    }

    async fn fetch_domains(&self) -> Result<Vec<String>> {
        let url = self.url("/domains");
        debug!(%url, "Listing domains");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("Failed to list domains: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::response_error("List domains", response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read domains response: {}", e)))?;
        let parsed: DomainsResponse = serde_json::from_str(&body)?;

        Ok(parsed.domains.into_iter().map(|d| d.name).collect())
    }

    async fn fetch_domain_records(&self, domain: &str) -> Result<Vec<Record>> {
        let url = self.url(&format!("/domains/{}/records", domain));
        debug!(%url, "Listing domain records");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("Failed to list records: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::response_error("List records", response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read records response: {}", e)))?;
        let parsed: RecordsResponse = serde_json::from_str(&body)?;

        Ok(parsed.domain_records.into_iter().map(Record::from).collect())
    }

    async fn create_txt_record(
        &self,
        domain: &str,
        record_name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Option<Record>> {
        let url = self.url(&format!("/domains/{}/records", domain));
        debug!(%url, record_name, ttl, "Creating TXT record");

        let request = CreateRecordRequest {
            record_type: "TXT",
            name: record_name,
            data: value,
            ttl,
        };

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(record_name, error = %e, "TXT record creation request failed");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(record_name, %status, %body, "TXT record creation rejected");
            return Ok(None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(record_name, error = %e, "Failed to read creation response");
                return Ok(None);
            }
        };

        match serde_json::from_str::<CreateRecordResponse>(&body) {
            Ok(parsed) => {
                let record = Record::from(parsed.domain_record);
                debug!(record_id = %record.id, "TXT record created");
                Ok(Some(record))
            }
            Err(e) => {
                warn!(record_name, error = %e, "Failed to parse creation response");
                Ok(None)
            }
        }
    }

    async fn delete_txt_record(&self, domain: &str, record_id: &str) -> Result<bool> {
        let url = self.url(&format!("/domains/{}/records/{}", domain, record_id));
        debug!(%url, "Deleting record");

        let response = match self
            .client
            .delete(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(record_id, error = %e, "Record deletion request failed");
                return Ok(false);
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(record_id, "Record already deleted");
            return Ok(false);
        }

        // Successful deletion is a 204 with an empty body
        if status.is_success() {
            debug!(record_id, "Record deleted");
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(record_id, %status, %body, "Record deletion rejected");
        Ok(false)
    }
}

// DigitalOcean API types

#[derive(Debug, Deserialize)]
struct DomainsResponse {
    #[serde(default)]
    domains: Vec<Domain>,
}

#[derive(Debug, Deserialize)]
struct Domain {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    domain_records: Vec<DomainRecord>,
}

#[derive(Debug, Deserialize)]
struct DomainRecord {
    id: u64,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    data: String,
}

impl From<DomainRecord> for Record {
    fn from(rec: DomainRecord) -> Self {
        Record {
            id: rec.id.to_string(),
            name: rec.name,
            record_type: rec.record_type,
            data: rec.data,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    data: &'a str,
    ttl: u32,
}

#[derive(Debug, Deserialize)]
struct CreateRecordResponse {
    domain_record: DomainRecord,
}

/// Factory for creating DigitalOcean providers
pub struct DigitalOceanFactory;

impl DnsProviderFactory for DigitalOceanFactory {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn token_env_var(&self) -> &'static str {
        TOKEN_ENV_VAR
    }

    fn create(&self, api_token: &str) -> Result<Box<dyn DnsProvider>> {
        if api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token is required"));
        }

        Ok(Box::new(DigitalOceanProvider::new(api_token)?))
    }
}

/// Register the DigitalOcean provider with a registry
///
/// Call during binary initialization to make the provider available:
///
/// ```rust
/// use certhook_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// certhook_provider_digitalocean::register(&registry);
/// assert!(registry.has_provider("digitalocean"));
/// ```
pub fn register(registry: &certhook_core::ProviderRegistry) {
    registry.register(PROVIDER_NAME, Box::new(DigitalOceanFactory));
}
