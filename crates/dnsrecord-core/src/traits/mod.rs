//! Core traits for the dnsrecord system
//!
//! - [`DnsProvider`]: List and mutate DNS records via provider APIs
//! - [`DnsProviderFactory`]: Build a provider from per-request configuration

pub mod dns_provider;

pub use dns_provider::{DnsProvider, DnsProviderFactory, ProviderResponse, STATUS_SUCCESS};
