//! Record types: what the caller wants and what the provider has
//!
//! [`DesiredState`] is the immutable input of one reconciliation run.
//! [`ExistingRecord`] is a snapshot normalized from the provider's list
//! payload at the start of the run; it is never cached.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default TTL for new records (in seconds)
pub const DEFAULT_TTL: u32 = 3600;

/// Record types the provider accepts
pub const SUPPORTED_RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "MX", "CNAME", "TXT", "NS", "SRV", "WR", "RP", "SSHFP", "ALIAS", "CAA", "TLSA",
    "CERT", "DS", "PTR", "NAPTR", "HINFO", "LOC", "SPF",
];

/// Whether the record should exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    /// Record must exist with the desired value and TTL
    #[default]
    Present,
    /// Record must not exist
    Absent,
}

impl FromStr for RecordState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "present" => Ok(RecordState::Present),
            "absent" => Ok(RecordState::Absent),
            other => Err(Error::invalid_input(format!(
                "Invalid state: {} (expected 'present' or 'absent')",
                other
            ))),
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordState::Present => f.write_str("present"),
            RecordState::Absent => f.write_str("absent"),
        }
    }
}

/// Optional fields for MX and SRV records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExtras {
    /// MX/SRV priority
    pub priority: Option<u16>,
    /// SRV weight
    pub weight: Option<u16>,
    /// SRV port
    pub port: Option<u16>,
}

/// Desired state of one DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    /// Zone name (e.g., "example.com")
    pub domain: String,
    /// Host label; empty means the zone apex
    pub host: String,
    /// Record type, uppercase (e.g., "A", "CNAME")
    pub record_type: String,
    /// Record value; optional for `absent`
    pub value: Option<String>,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Present or absent
    pub state: RecordState,
    /// Type-specific extras passed through to add/modify
    pub extras: RecordExtras,
}

impl DesiredState {
    /// Create a desired state with no value and the default TTL
    pub fn new(
        domain: impl Into<String>,
        host: impl Into<String>,
        record_type: impl Into<String>,
        state: RecordState,
    ) -> Self {
        Self {
            domain: domain.into(),
            host: host.into(),
            record_type: record_type.into(),
            value: None,
            ttl: DEFAULT_TTL,
            state,
            extras: RecordExtras::default(),
        }
    }

    /// Set the record value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set MX/SRV extras
    pub fn with_extras(mut self, extras: RecordExtras) -> Self {
        self.extras = extras;
        self
    }

    /// The value, treating an empty string as absent
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    /// `host.domain`, or just the domain for the apex
    pub fn fqdn(&self) -> String {
        if self.host.is_empty() || self.host == "@" {
            self.domain.clone()
        } else {
            format!("{}.{}", self.host, self.domain)
        }
    }

    /// Whether an existing record already carries the desired value and TTL
    pub fn is_satisfied_by(&self, existing: &ExistingRecord) -> bool {
        self.value() == Some(existing.record.as_str()) && existing.ttl == self.ttl
    }

    /// Validate the desired state before any provider call
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(Error::invalid_input("domain is required"));
        }

        if !SUPPORTED_RECORD_TYPES.contains(&self.record_type.as_str()) {
            return Err(Error::invalid_input(format!(
                "Unsupported record type: {}",
                self.record_type
            )));
        }

        if self.state == RecordState::Present && self.value().is_none() {
            return Err(Error::invalid_input(
                "Value is required when state is 'present'",
            ));
        }

        Ok(())
    }
}

/// Normalize a record type to the provider's uppercase spelling
pub fn normalize_record_type(record_type: &str) -> Result<String> {
    let upper = record_type.trim().to_ascii_uppercase();
    if SUPPORTED_RECORD_TYPES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(Error::invalid_input(format!(
            "Unsupported record type: {}",
            record_type
        )))
    }
}

/// A record as currently held by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecord {
    /// Provider-assigned id (opaque)
    pub id: String,
    /// Current value
    pub record: String,
    /// Current TTL
    pub ttl: u32,
    /// Host label
    pub host: String,
    /// Record type
    pub record_type: String,
}

impl ExistingRecord {
    /// Parse one list entry, returning `None` for anything that is not a record
    ///
    /// `key` is the map key the entry was found under, used as the id when
    /// the entry itself carries none.
    pub fn from_value(entry: &Value, key: Option<&str>) -> Option<Self> {
        let obj = entry.as_object()?;

        let id = obj
            .get("id")
            .and_then(id_string)
            .or_else(|| key.filter(|k| !k.is_empty()).map(str::to_string))?;
        let record = obj.get("record")?.as_str()?.to_string();
        let ttl = obj.get("ttl").and_then(parse_ttl)?;

        Some(Self {
            id,
            record,
            ttl,
            host: str_field(obj, "host"),
            record_type: str_field(obj, "type"),
        })
    }
}

/// Normalize a list payload into records
///
/// Accepts an object keyed by record id or an array of records; entries
/// that are not well-formed records are dropped. Records keep the order the
/// provider listed them in.
pub fn normalize_records(payload: &Value) -> Vec<ExistingRecord> {
    match payload {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, entry)| ExistingRecord::from_value(entry, Some(key)))
            .collect(),
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| ExistingRecord::from_value(entry, None))
            .collect(),
        _ => Vec::new(),
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_ttl(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field(obj: &Map<String, Value>, name: &str) -> String {
    obj.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_object_keyed_by_id() {
        let payload = json!({
            "101": { "id": "101", "type": "A", "host": "www", "record": "1.2.3.4", "ttl": "3600" },
            "102": { "id": "102", "type": "A", "host": "www", "record": "5.6.7.8", "ttl": 300 }
        });

        let mut records = normalize_records(&payload);
        records.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record, "1.2.3.4");
        assert_eq!(records[0].ttl, 3600);
        assert_eq!(records[1].ttl, 300);
        assert_eq!(records[1].host, "www");
    }

    #[test]
    fn normalizes_array_and_uses_numeric_ids() {
        let payload = json!([
            { "id": 7, "record": "mail.example.com", "ttl": 3600, "type": "MX" }
        ]);

        let records = normalize_records(&payload);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "7");
        assert_eq!(records[0].record_type, "MX");
    }

    #[test]
    fn falls_back_to_map_key_for_id() {
        let payload = json!({ "55": { "record": "1.2.3.4", "ttl": "60" } });

        let records = normalize_records(&payload);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "55");
    }

    #[test]
    fn drops_malformed_entries() {
        let payload = json!({
            "status": "Success",
            "1": { "id": "1", "record": "1.2.3.4", "ttl": "3600" },
            "2": { "id": "2", "ttl": "3600" },
            "3": { "id": "3", "record": "1.2.3.4", "ttl": "soon" },
            "4": ["not", "a", "record"]
        });

        let records = normalize_records(&payload);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
    }

    #[test]
    fn keeps_provider_order() {
        let payload: Value = serde_json::from_str(
            r#"{"9": {"id": "9", "record": "1.1.1.1", "ttl": "60"},
                "10": {"id": "10", "record": "2.2.2.2", "ttl": "60"},
                "2": {"id": "2", "record": "3.3.3.3", "ttl": "60"}}"#,
        )
        .unwrap();

        let ids: Vec<String> = normalize_records(&payload)
            .into_iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(ids, vec!["9", "10", "2"]);
    }

    #[test]
    fn scalar_payload_is_empty() {
        assert!(normalize_records(&json!("nothing")).is_empty());
        assert!(normalize_records(&Value::Null).is_empty());
    }

    #[test]
    fn state_parsing() {
        assert_eq!("present".parse::<RecordState>().unwrap(), RecordState::Present);
        assert_eq!("absent".parse::<RecordState>().unwrap(), RecordState::Absent);

        let err = "gone".parse::<RecordState>().unwrap_err();
        assert!(err.to_string().contains("Invalid state: gone"));
    }

    #[test]
    fn record_type_normalization() {
        assert_eq!(normalize_record_type("cname").unwrap(), "CNAME");
        assert_eq!(normalize_record_type(" A ").unwrap(), "A");
        assert!(normalize_record_type("BOGUS").is_err());
    }

    #[test]
    fn present_requires_value() {
        let desired = DesiredState::new("example.com", "www", "A", RecordState::Present);
        let err = desired.validate().unwrap_err();
        assert!(err.to_string().contains("Value is required"));

        let empty = desired.clone().with_value("");
        assert!(empty.validate().is_err());

        assert!(desired.with_value("1.2.3.4").validate().is_ok());
    }

    #[test]
    fn absent_does_not_require_value() {
        let desired = DesiredState::new("example.com", "old", "A", RecordState::Absent);
        assert!(desired.validate().is_ok());
        assert_eq!(desired.value(), None);
    }

    #[test]
    fn fqdn_for_apex_and_host() {
        let apex = DesiredState::new("example.com", "", "A", RecordState::Absent);
        let www = DesiredState::new("example.com", "www", "A", RecordState::Absent);

        assert_eq!(apex.fqdn(), "example.com");
        assert_eq!(www.fqdn(), "www.example.com");
    }

    #[test]
    fn satisfied_requires_value_and_ttl() {
        let desired = DesiredState::new("example.com", "www", "A", RecordState::Present)
            .with_value("1.2.3.4")
            .with_ttl(3600);
        let mut existing = ExistingRecord {
            id: "1".to_string(),
            record: "1.2.3.4".to_string(),
            ttl: 3600,
            host: "www".to_string(),
            record_type: "A".to_string(),
        };

        assert!(desired.is_satisfied_by(&existing));

        existing.ttl = 300;
        assert!(!desired.is_satisfied_by(&existing));
    }
}
