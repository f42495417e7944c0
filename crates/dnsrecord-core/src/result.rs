//! The single result object produced per invocation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::DesiredState;

/// Summary of the record a request was about, echoed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub domain: String,
    pub host: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: Option<String>,
    pub ttl: u32,
}

impl From<&DesiredState> for RecordSummary {
    fn from(desired: &DesiredState) -> Self {
        Self {
            domain: desired.domain.clone(),
            host: desired.host.clone(),
            record_type: desired.record_type.clone(),
            value: desired.value.clone(),
            ttl: desired.ttl,
        }
    }
}

/// Outcome of one reconciliation run
///
/// Every error path ends up here with `failed = true` and a
/// human-readable `msg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileResult {
    /// Whether the provider state was modified
    pub changed: bool,
    /// Whether the run failed
    pub failed: bool,
    /// What happened
    pub msg: String,
    /// Provider payload from successful mutations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// The record the request was about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordSummary>,
}

impl ReconcileResult {
    /// Nothing needed to change
    pub fn unchanged(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: false,
            msg: msg.into(),
            data: None,
            record: None,
        }
    }

    /// A mutation succeeded
    pub fn changed(msg: impl Into<String>, data: Value) -> Self {
        Self {
            changed: true,
            failed: false,
            msg: msg.into(),
            data: Some(data),
            record: None,
        }
    }

    /// The run failed
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: msg.into(),
            data: None,
            record: None,
        }
    }

    /// Mark whether something was changed before the failure
    pub fn with_changed(mut self, changed: bool) -> Self {
        self.changed = changed;
        self
    }

    /// Attach the record summary
    pub fn with_record(mut self, record: RecordSummary) -> Self {
        self.record = Some(record);
        self
    }
}
