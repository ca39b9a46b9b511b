//! Test doubles and common utilities for contract tests
//!
//! Provides an in-memory DnsProvider whose behavior (failing creations,
//! undeletable records) can be controlled per test.

use async_trait::async_trait;
use certhook_core::error::{Error, Result};
use certhook_core::traits::{DnsProvider, DnsProviderFactory, Record};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory DnsProvider that tracks records per domain
pub struct MockDnsProvider {
    /// domain -> records
    records: Mutex<HashMap<String, Vec<Record>>>,
    /// Counter for generating record ids
    next_id: AtomicUsize,
    /// Whether create_txt_record reports backend failure
    fail_create: bool,
    /// Record ids whose deletion reports failure
    undeletable: Mutex<HashSet<String>>,
    /// Call counter for delete_txt_record()
    delete_call_count: AtomicUsize,
}

#[allow(dead_code)] // not every contract test exercises every control
impl MockDnsProvider {
    /// Create a provider managing the given domains, each with no records
    pub fn new(domains: &[&str]) -> Self {
        let records = domains
            .iter()
            .map(|d| (d.to_string(), Vec::new()))
            .collect();
        Self {
            records: Mutex::new(records),
            next_id: AtomicUsize::new(1),
            fail_create: false,
            undeletable: Mutex::new(HashSet::new()),
            delete_call_count: AtomicUsize::new(0),
        }
    }

    /// Make create_txt_record report backend failure (return None)
    pub fn with_failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Seed a record directly, bypassing create_txt_record
    pub fn seed_record(&self, domain: &str, name: &str, record_type: &str, data: &str) -> String {
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut records = self.records.lock().unwrap();
        records
            .get_mut(domain)
            .expect("seeding a record for an unmanaged domain")
            .push(Record {
                id: id.clone(),
                name: name.to_string(),
                record_type: record_type.to_string(),
                data: data.to_string(),
            });
        id
    }

    /// Mark a record id as undeletable (delete returns false)
    pub fn mark_undeletable(&self, record_id: &str) {
        self.undeletable.lock().unwrap().insert(record_id.to_string());
    }

    /// Current records for a domain
    pub fn records_for(&self, domain: &str) -> Vec<Record> {
        self.records
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of times delete_txt_record was called
    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn token_env_var(&self) -> &'static str {
        "MOCK_API_TOKEN"
    }

    async fn fetch_domains(&self) -> Result<Vec<String>> {
        let records = self.records.lock().unwrap();
        let mut domains: Vec<String> = records.keys().cloned().collect();
        domains.sort_unstable();
        Ok(domains)
    }

    async fn fetch_domain_records(&self, domain: &str) -> Result<Vec<Record>> {
        let records = self.records.lock().unwrap();
        records
            .get(domain)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Domain not found: {}", domain)))
    }

    async fn create_txt_record(
        &self,
        domain: &str,
        record_name: &str,
        value: &str,
        _ttl: u32,
    ) -> Result<Option<Record>> {
        if self.fail_create {
            return Ok(None);
        }

        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = Record {
            id,
            name: record_name.to_string(),
            record_type: "TXT".to_string(),
            data: value.to_string(),
        };

        let mut records = self.records.lock().unwrap();
        match records.get_mut(domain) {
            Some(domain_records) => {
                domain_records.push(record.clone());
                Ok(Some(record))
            }
            // Backend rejects records for unmanaged domains
            None => Ok(None),
        }
    }

    async fn delete_txt_record(&self, domain: &str, record_id: &str) -> Result<bool> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);

        if self.undeletable.lock().unwrap().contains(record_id) {
            return Ok(false);
        }

        let mut records = self.records.lock().unwrap();
        let Some(domain_records) = records.get_mut(domain) else {
            return Ok(false);
        };

        let before = domain_records.len();
        domain_records.retain(|r| r.id != record_id);
        Ok(domain_records.len() < before)
    }
}

/// Factory wrapper so contract tests can exercise registry resolution
pub struct MockFactory;

#[allow(dead_code)]
impl MockFactory {
    pub fn managed_domains() -> Vec<&'static str> {
        vec!["example.com"]
    }
}

impl DnsProviderFactory for MockFactory {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn token_env_var(&self) -> &'static str {
        "MOCK_API_TOKEN"
    }

    fn create(&self, api_token: &str) -> Result<Box<dyn DnsProvider>> {
        if api_token.is_empty() {
            return Err(Error::config("Mock API token is required"));
        }
        Ok(Box::new(MockDnsProvider::new(&Self::managed_domains())))
    }
}
