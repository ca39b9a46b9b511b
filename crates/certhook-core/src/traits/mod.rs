//! Core traits for the certhook system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: manage challenge records via provider APIs
//! - [`DnsProviderFactory`]: construct providers from a credential

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory, Record};
