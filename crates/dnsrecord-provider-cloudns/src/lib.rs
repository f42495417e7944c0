// # ClouDNS Provider
//
// This crate implements `DnsProvider` on top of the ClouDNS HTTP API.
//
// ## Behavior
//
// - One HTTP request per trait call
// - Errors are returned as is (no retry, no backoff)
// - HTTP timeout and certificate verification taken from `ProviderConfig`
// - Dry-run mode: listing still hits the API, mutations are only logged
//
// ## Security Requirements
//
// - `auth-password` NEVER appears in logs or Debug output
// - Credentials travel in the POST body, never in the URL
//
// ## API Reference
//
// - List records:  POST `/dns/records.json`
// - Add record:    POST `/dns/add-record.json`
// - Modify record: POST `/dns/mod-record.json`
// - Delete record: POST `/dns/delete-record.json`
//
// Every endpoint answers HTTP 200 with a JSON body; failures are reported
// in the body as `{"status": "Failed", "statusDescription": "..."}`.

use async_trait::async_trait;
use dnsrecord_core::config::{Credentials, ProviderConfig};
use dnsrecord_core::record::RecordExtras;
use dnsrecord_core::traits::{DnsProvider, DnsProviderFactory, ProviderResponse, STATUS_SUCCESS};
use dnsrecord_core::{Error, Result};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;

/// ClouDNS API base URL
pub const CLOUDNS_API_BASE: &str = "https://api.cloudns.net";

const PROVIDER_NAME: &str = "cloudns";

const LIST_RECORDS: &str = "dns/records.json";
const ADD_RECORD: &str = "dns/add-record.json";
const MODIFY_RECORD: &str = "dns/mod-record.json";
const DELETE_RECORD: &str = "dns/delete-record.json";

/// Form parameters for one API call, auth excluded
type Params = Vec<(&'static str, String)>;

/// ClouDNS DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform list requests
/// - Log the intended add/modify/delete parameters
/// - **NOT** send any mutating request, answering with a synthetic success
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password.
pub struct CloudnsProvider {
    /// API credentials
    /// ⚠️ NEVER log the password
    credentials: Credentials,

    /// Base URL the endpoints are resolved against
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, list records but skip mutations
    dry_run: bool,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for CloudnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudnsProvider")
            .field("auth_kind", &self.credentials.auth_kind())
            .field("auth_id", &self.credentials.auth_id)
            .field("auth_password", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudnsProvider {
    /// Create a new ClouDNS provider
    ///
    /// # Parameters
    ///
    /// - `config`: Credentials plus timeout and TLS options
    /// - `dry_run`: If true, list records but skip mutations
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or when the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig, dry_run: bool) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        if !config.verify_ssl {
            tracing::warn!("TLS certificate verification is disabled");
        }

        Ok(Self {
            credentials: config.credentials.clone(),
            base_url: CLOUDNS_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Point the provider at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether mutations are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn mode(&self) -> &'static str {
        if self.dry_run { "DRY-RUN" } else { "LIVE" }
    }

    /// Auth parameters sent with every request
    fn auth_params(&self) -> Params {
        vec![
            (
                self.credentials.auth_kind().param_name(),
                self.credentials.auth_id.clone(),
            ),
            ("auth-password", self.credentials.auth_password.clone()),
        ]
    }

    /// POST one API call and decode the JSON body
    ///
    /// Only transport and protocol problems are errors here. A body with
    /// `"status": "Failed"` is returned as `Ok` for the caller to interpret.
    async fn call(&self, endpoint: &str, params: Params) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("POST {} {:?}", url, params);

        let mut form = self.auth_params();
        form.extend(params);

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        let body = response.text().await.map_err(|e| {
            Error::http(format!("Failed to read response from {}: {}", endpoint, e))
        })?;

        if !status.is_success() {
            return Err(status_error(status, endpoint, &body));
        }

        parse_body(endpoint, &body)
    }

    /// Send a mutating call, or log it in dry-run mode
    async fn mutate(&self, endpoint: &str, params: Params) -> Result<ProviderResponse> {
        if self.dry_run {
            tracing::info!("[DRY-RUN] Would POST {} with {:?}", endpoint, params);
            return Ok(ProviderResponse::from_value(dry_run_response(endpoint)));
        }

        let response = ProviderResponse::from_value(self.call(endpoint, params).await?);
        if response.is_success() {
            tracing::info!("{}: {}", endpoint, response.description_or_unknown());
        } else {
            tracing::warn!("{} failed: {}", endpoint, response.description_or_unknown());
        }
        Ok(response)
    }
}

/// Map a non-success HTTP status to a typed error
fn status_error(status: StatusCode, endpoint: &str, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid credentials or insufficient permissions. Status: {}",
            status
        )),
        429 => Error::rate_limited(format!(
            "Too many requests. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("ClouDNS server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("Request to {} failed: {} - {}", endpoint, status, body),
        ),
    }
}

/// Decode a response body as JSON
fn parse_body(endpoint: &str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!("Invalid JSON from {}: {}", endpoint, body);
        Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
    })
}

/// Parameters for listing records of one host and type
fn list_params(domain: &str, host: &str, record_type: &str) -> Params {
    vec![
        ("domain-name", domain.to_string()),
        ("host", host.to_string()),
        ("type", record_type.to_string()),
    ]
}

/// Parameters for adding a record
fn add_params(
    domain: &str,
    record_type: &str,
    host: &str,
    value: &str,
    ttl: u32,
    extras: &RecordExtras,
) -> Params {
    let mut params = vec![
        ("domain-name", domain.to_string()),
        ("record-type", record_type.to_string()),
        ("host", host.to_string()),
        ("record", value.to_string()),
        ("ttl", ttl.to_string()),
    ];
    push_extras(&mut params, extras);
    params
}

/// Parameters for modifying a record in place
fn modify_params(
    domain: &str,
    record_id: &str,
    host: &str,
    value: &str,
    ttl: u32,
    extras: &RecordExtras,
) -> Params {
    let mut params = vec![
        ("domain-name", domain.to_string()),
        ("record-id", record_id.to_string()),
        ("host", host.to_string()),
        ("record", value.to_string()),
        ("ttl", ttl.to_string()),
    ];
    push_extras(&mut params, extras);
    params
}

fn delete_params(domain: &str, record_id: &str) -> Params {
    vec![
        ("domain-name", domain.to_string()),
        ("record-id", record_id.to_string()),
    ]
}

// Only the extras that were given are sent
fn push_extras(params: &mut Params, extras: &RecordExtras) {
    if let Some(priority) = extras.priority {
        params.push(("priority", priority.to_string()));
    }
    if let Some(weight) = extras.weight {
        params.push(("weight", weight.to_string()));
    }
    if let Some(port) = extras.port {
        params.push(("port", port.to_string()));
    }
}

fn dry_run_response(endpoint: &str) -> Value {
    json!({
        "status": STATUS_SUCCESS,
        "statusDescription": format!("Dry run: {} not sent", endpoint),
        "dry_run": true,
    })
}

#[async_trait]
impl DnsProvider for CloudnsProvider {
    async fn list_records(&self, domain: &str, host: &str, record_type: &str) -> Result<Value> {
        tracing::debug!("Listing {} records for host '{}' in {}", record_type, host, domain);
        self.call(LIST_RECORDS, list_params(domain, host, record_type))
            .await
    }

    async fn add_record(
        &self,
        domain: &str,
        record_type: &str,
        host: &str,
        value: &str,
        ttl: u32,
        extras: &RecordExtras,
    ) -> Result<ProviderResponse> {
        tracing::info!(
            "Adding {} record '{}' in {} -> {} (ttl {}) [mode: {}]",
            record_type,
            host,
            domain,
            value,
            ttl,
            self.mode()
        );
        self.mutate(
            ADD_RECORD,
            add_params(domain, record_type, host, value, ttl, extras),
        )
        .await
    }

    async fn modify_record(
        &self,
        domain: &str,
        record_id: &str,
        host: &str,
        value: &str,
        ttl: u32,
        extras: &RecordExtras,
    ) -> Result<ProviderResponse> {
        tracing::info!(
            "Modifying record {} ('{}' in {}) -> {} (ttl {}) [mode: {}]",
            record_id,
            host,
            domain,
            value,
            ttl,
            self.mode()
        );
        self.mutate(
            MODIFY_RECORD,
            modify_params(domain, record_id, host, value, ttl, extras),
        )
        .await
    }

    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<ProviderResponse> {
        tracing::info!(
            "Deleting record {} in {} [mode: {}]",
            record_id,
            domain,
            self.mode()
        );
        self.mutate(DELETE_RECORD, delete_params(domain, record_id))
            .await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating ClouDNS providers
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudnsFactory {
    dry_run: bool,
}

impl CloudnsFactory {
    /// Factory for providers that send mutations
    pub fn live() -> Self {
        Self { dry_run: false }
    }

    /// Factory for providers that only log mutations
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

impl DnsProviderFactory for CloudnsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        if self.dry_run {
            tracing::warn!("ClouDNS provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Box::new(CloudnsProvider::new(config, self.dry_run)?))
    }
}
