//! Test doubles and common utilities for reconciliation contract tests
//!
//! The mock provider answers from a scripted list payload and records
//! every call so tests can assert exactly which API calls a run made.

#![allow(dead_code)]

use dnsrecord_core::config::ProviderConfig;
use dnsrecord_core::error::{Error, Result};
use dnsrecord_core::record::RecordExtras;
use dnsrecord_core::traits::{DnsProvider, DnsProviderFactory, ProviderResponse};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        domain: String,
        host: String,
        record_type: String,
    },
    Add {
        domain: String,
        record_type: String,
        host: String,
        value: String,
        ttl: u32,
        extras: RecordExtras,
    },
    Modify {
        domain: String,
        record_id: String,
        host: String,
        value: String,
        ttl: u32,
    },
    Delete {
        domain: String,
        record_id: String,
    },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::List { .. })
    }
}

/// A scripted DnsProvider that tracks calls
#[derive(Clone)]
pub struct MockDnsProvider {
    /// Payload returned by list_records()
    list_payload: Value,
    /// Transport error returned by list_records() instead of the payload
    list_error: Option<String>,
    /// Response body for add/modify/delete
    mutation_response: Value,
    /// Record id whose delete is reported as failed
    failing_delete: Option<String>,
    /// Recorded calls
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockDnsProvider {
    /// Provider whose list call returns `list_payload` and whose mutations succeed
    pub fn new(list_payload: Value) -> Self {
        Self {
            list_payload,
            list_error: None,
            mutation_response: success("done"),
            failing_delete: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider with no existing records
    pub fn empty() -> Self {
        Self::new(json!({
            "status": "Failed",
            "statusDescription": "No records found."
        }))
    }

    /// Answer every add/modify/delete with the given body
    pub fn with_mutation_response(mut self, response: Value) -> Self {
        self.mutation_response = response;
        self
    }

    /// Report the delete of `record_id` as failed
    pub fn failing_delete_of(mut self, record_id: &str) -> Self {
        self.failing_delete = Some(record_id.to_string());
        self
    }

    /// Fail list_records() at the transport level
    pub fn with_list_error(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    /// All calls, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than list_records()
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Ids passed to delete_record(), in order
    pub fn deleted_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete { record_id, .. } => Some(record_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, domain: &str, host: &str, record_type: &str) -> Result<Value> {
        self.record(Call::List {
            domain: domain.to_string(),
            host: host.to_string(),
            record_type: record_type.to_string(),
        });

        match &self.list_error {
            Some(message) => Err(Error::http(message.clone())),
            None => Ok(self.list_payload.clone()),
        }
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
        self.record(Call::Add {
            domain: domain.to_string(),
            record_type: record_type.to_string(),
            host: host.to_string(),
            value: value.to_string(),
            ttl,
            extras: *extras,
        });
        Ok(ProviderResponse::from_value(self.mutation_response.clone()))
    }

    async fn modify_record(
        &self,
        domain: &str,
        record_id: &str,
        host: &str,
        value: &str,
        ttl: u32,
        _extras: &RecordExtras,
    ) -> Result<ProviderResponse> {
        self.record(Call::Modify {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
            host: host.to_string(),
            value: value.to_string(),
            ttl,
        });
        Ok(ProviderResponse::from_value(self.mutation_response.clone()))
    }

    async fn delete_record(&self, domain: &str, record_id: &str) -> Result<ProviderResponse> {
        self.record(Call::Delete {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
        });

        if self.failing_delete.as_deref() == Some(record_id) {
            return Ok(ProviderResponse::from_value(failed("Record is locked")));
        }
        Ok(ProviderResponse::from_value(self.mutation_response.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A factory that hands out providers sharing one call log
pub struct MockFactory {
    template: MockDnsProvider,
    create_count: Arc<AtomicUsize>,
    last_config: Mutex<Option<ProviderConfig>>,
}

impl MockFactory {
    pub fn new(template: MockDnsProvider) -> Self {
        Self {
            template,
            create_count: Arc::new(AtomicUsize::new(0)),
            last_config: Mutex::new(None),
        }
    }

    /// The provider whose call log every created provider shares
    pub fn provider(&self) -> &MockDnsProvider {
        &self.template
    }

    /// Get the number of times create() was called
    pub fn create_count(&self) -> usize {
        self.create_count.load(Ordering::SeqCst)
    }

    /// The configuration passed to the last create() call
    pub fn last_config(&self) -> Option<ProviderConfig> {
        self.last_config.lock().unwrap().clone()
    }
}

impl DnsProviderFactory for MockFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        *self.last_config.lock().unwrap() = Some(config.clone());
        Ok(Box::new(self.template.clone()))
    }
}

/// ClouDNS-style list payload keyed by record id
pub fn records(entries: &[(&str, &str, u32)]) -> Value {
    let map = entries
        .iter()
        .map(|(id, record, ttl)| {
            (
                id.to_string(),
                json!({
                    "id": id,
                    "type": "A",
                    "host": "www",
                    "record": record,
                    "ttl": ttl.to_string(),
                    "status": 1
                }),
            )
        })
        .collect::<serde_json::Map<String, Value>>();
    Value::Object(map)
}

/// A successful mutation body
pub fn success(description: &str) -> Value {
    json!({ "status": "Success", "statusDescription": description })
}

/// A failed mutation body
pub fn failed(description: &str) -> Value {
    json!({ "status": "Failed", "statusDescription": description })
}
