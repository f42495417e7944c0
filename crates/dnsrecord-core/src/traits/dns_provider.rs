// # DNS Provider Trait
//
// Defines the interface the reconciler uses to read and mutate DNS records
// via a provider's HTTP API.
//
// ## Implementations
//
// - ClouDNS: `dnsrecord-provider-cloudns` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsrecord_core::DnsProvider;
//
// let payload = provider.list_records("example.com", "www", "A").await?;
// let response = provider.delete_record("example.com", "123456").await?;
// if !response.is_success() {
//     eprintln!("{}", response.description_or_unknown());
// }
// ```

use async_trait::async_trait;
use serde_json::Value;

use crate::record::RecordExtras;

/// Status string the provider uses for successful mutations
pub const STATUS_SUCCESS: &str = "Success";

/// Response to a mutating provider call
///
/// Built defensively from whatever JSON the provider returned: a payload
/// that is not an object simply has no status and is not a success.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    /// Value of the `status` field, empty when missing
    pub status: String,
    /// Human-readable description (`statusDescription`, else `message`)
    pub status_description: Option<String>,
    /// The raw response body
    pub payload: Value,
}

impl ProviderResponse {
    /// Build a response from a raw JSON payload
    pub fn from_value(payload: Value) -> Self {
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let status_description = payload
            .get("statusDescription")
            .or_else(|| payload.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            status,
            status_description,
            payload,
        }
    }

    /// Whether the provider reported success
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// The provider's description, or "Unknown error" when it gave none
    pub fn description_or_unknown(&self) -> &str {
        self.status_description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("Unknown error")
    }
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// Providers only translate calls into API requests and parse the
/// responses. They never decide whether a change is needed; that belongs
/// to [`reconcile`](crate::reconciler::reconcile).
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed call is reported as is)
/// - ❌ Cache records between calls
/// - ❌ Spawn tasks or threads
///
/// Each method performs at most one API request.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List records filtered server-side by host and type
    ///
    /// Returns the raw payload. Error envelopes (e.g. "No records found")
    /// are returned as `Ok` and interpreted by the reconciler; `Err` is
    /// reserved for transport and protocol failures.
    async fn list_records(
        &self,
        domain: &str,
        host: &str,
        record_type: &str,
    ) -> Result<Value, crate::Error>;

    /// Add a new record
    async fn add_record(
        &self,
        domain: &str,
        record_type: &str,
        host: &str,
        value: &str,
        ttl: u32,
        extras: &RecordExtras,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Modify an existing record in place
    async fn modify_record(
        &self,
        domain: &str,
        record_id: &str,
        host: &str,
        value: &str,
        ttl: u32,
        extras: &RecordExtras,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Delete one record by id
    async fn delete_record(
        &self,
        domain: &str,
        record_id: &str,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
