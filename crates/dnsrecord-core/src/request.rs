//! The JSON request envelope
//!
//! A request carries credentials, client options and one action. Parsing is
//! strict about what it needs and lenient about representation: `auth_id`,
//! `value` and `ttl` may arrive as strings or numbers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::{Credentials, DEFAULT_TIMEOUT_SECS, ProviderConfig};
use crate::error::{Error, Result};
use crate::record::{DEFAULT_TTL, DesiredState, RecordExtras, RecordState, normalize_record_type};

/// The only action currently recognized
pub const ACTION_ENSURE_RECORD: &str = "ensure_record";

/// What the request asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Bring one record to its desired state
    EnsureRecord(DesiredState),
}

/// A parsed, not yet validated request
#[derive(Clone, Deserialize)]
pub struct Request {
    #[serde(default, deserialize_with = "string_or_number")]
    pub auth_id: Option<String>,
    #[serde(default)]
    pub auth_password: Option<String>,
    #[serde(default)]
    pub sub_auth_user: bool,

    #[serde(default = "default_action")]
    pub action: String,

    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "u32_lenient")]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub priority: Option<u16>,
    #[serde(default)]
    pub weight: Option<u16>,
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub verify_ssl: Option<bool>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("auth_id", &self.auth_id)
            .field("auth_password", &self.auth_password.as_ref().map(|_| "<REDACTED>"))
            .field("sub_auth_user", &self.sub_auth_user)
            .field("action", &self.action)
            .field("domain", &self.domain)
            .field("host", &self.host)
            .field("record_type", &self.record_type)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Request {
    /// Parse a request from raw input
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::invalid_input("No input received"));
        }

        let value: Value = serde_json::from_str(input)?;
        if !value.is_object() {
            return Err(Error::invalid_input("Request must be a JSON object"));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Build the provider configuration, failing on missing credentials
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let auth_id = self.auth_id.clone().unwrap_or_default();
        let auth_password = self.auth_password.clone().unwrap_or_default();

        if auth_id.trim().is_empty() || auth_password.is_empty() {
            return Err(Error::config(
                "Missing required credentials: auth_id and auth_password",
            ));
        }

        let config = ProviderConfig::new(Credentials::new(
            auth_id,
            auth_password,
            self.sub_auth_user,
        ))
        .with_timeout_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
        .with_verify_ssl(self.verify_ssl.unwrap_or(true));

        config.validate()?;
        Ok(config)
    }

    /// Resolve the action and its arguments
    pub fn action(&self) -> Result<Action> {
        match self.action.as_str() {
            ACTION_ENSURE_RECORD => Ok(Action::EnsureRecord(self.desired_state()?)),
            other => Err(Error::unknown_action(other)),
        }
    }

    fn desired_state(&self) -> Result<DesiredState> {
        let domain = self
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::invalid_input("domain is required"))?;

        let record_type = self
            .record_type
            .as_deref()
            .ok_or_else(|| Error::invalid_input("type is required"))
            .and_then(normalize_record_type)?;

        let state = match self.state.as_deref() {
            Some(state) => state.parse()?,
            None => RecordState::Present,
        };

        let mut desired = DesiredState::new(
            domain,
            self.host.clone().unwrap_or_default(),
            record_type,
            state,
        )
        .with_ttl(self.ttl.unwrap_or(DEFAULT_TTL))
        .with_extras(RecordExtras {
            priority: self.priority,
            weight: self.weight,
            port: self.port,
        });
        desired.value = self.value.clone();

        Ok(desired)
    }
}

fn default_action() -> String {
    ACTION_ENSURE_RECORD.to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn u32_lenient<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("ttl out of range: {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid ttl: {}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected integer ttl, got {}",
            other
        ))),
    }
}
