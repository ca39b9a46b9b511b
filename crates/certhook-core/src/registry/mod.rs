//! Plugin-based provider registry
//!
//! The registry maps lowercase provider names to factory objects, avoiding
//! hardcoded if-else chains in the hook adapters. Adding a backend means
//! implementing [`DnsProvider`] + [`DnsProviderFactory`] and registering the
//! factory; the hook adapters and orchestration flow stay untouched.
//!
//! ## Registration
//!
//! Provider crates should expose a `register()` function called during
//! binary initialization:
//!
//! ```rust,ignore
//! // In certhook-provider-digitalocean
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register("digitalocean", Box::new(DigitalOceanFactory));
//! }
//! ```

use crate::error::{Error, Result};
use crate::traits::DnsProviderFactory;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry of DNS provider factories
///
/// Lookups are case-insensitive; names are stored lowercase.
///
/// ## Thread Safety
///
/// Uses interior mutability with RwLock, allowing concurrent reads and
/// exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: RwLock<HashMap<String, Arc<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: provider registry key (e.g. "digitalocean"); stored lowercase
    /// - `factory`: factory object for creating provider instances
    pub fn register(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let name = name.into().to_lowercase();
        let mut factories = self.factories.write().unwrap();
        factories.insert(name, Arc::from(factory));
    }

    /// Look up a provider factory by name (case-insensitive)
    ///
    /// # Errors
    ///
    /// Unknown names fail with an error enumerating all registered provider
    /// names, for use in help and validation text.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DnsProviderFactory>> {
        let factories = self.factories.read().unwrap();

        factories.get(&name.to_lowercase()).cloned().ok_or_else(|| {
            let mut available: Vec<&str> = factories.keys().map(String::as_str).collect();
            available.sort_unstable();
            Error::config(format!(
                "Unknown provider: {}. Available: {}",
                name,
                available.join(", ")
            ))
        })
    }

    /// List all registered provider names, sorted
    pub fn list_providers(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap();
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Check if a provider name is registered (case-insensitive)
    pub fn has_provider(&self, name: &str) -> bool {
        let factories = self.factories.read().unwrap();
        factories.contains_key(&name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::DnsProvider;

    struct MockFactory;

    impl DnsProviderFactory for MockFactory {
        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn token_env_var(&self) -> &'static str {
            "MOCK_API_TOKEN"
        }

        fn create(&self, _api_token: &str) -> Result<Box<dyn DnsProvider>> {
            Err(Error::not_found("Mock provider not implemented"))
        }
    }

    #[test]
    fn registration_and_lookup() {
        let registry = ProviderRegistry::new();
        assert!(!registry.has_provider("mock"));

        registry.register("mock", Box::new(MockFactory));

        assert!(registry.has_provider("mock"));
        assert!(registry.list_providers().contains(&"mock".to_string()));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = ProviderRegistry::new();
        registry.register("Mock", Box::new(MockFactory));

        assert!(registry.get("mock").is_ok());
        assert!(registry.get("MOCK").is_ok());
        assert!(registry.has_provider("mOcK"));
    }

    #[test]
    fn unknown_provider_error_lists_registered_names() {
        let registry = ProviderRegistry::new();
        registry.register("mock", Box::new(MockFactory));

        let err = registry.get("nosuch").err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("nosuch"), "error names the missing key: {}", msg);
        assert!(msg.contains("mock"), "error lists registered names: {}", msg);
    }

    #[test]
    fn list_providers_is_sorted() {
        let registry = ProviderRegistry::new();
        registry.register("zeta", Box::new(MockFactory));
        registry.register("alpha", Box::new(MockFactory));

        assert_eq!(registry.list_providers(), vec!["alpha", "zeta"]);
    }
}
