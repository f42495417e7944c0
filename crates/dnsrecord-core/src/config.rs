//! Configuration types for the dnsrecord system
//!
//! Credentials and client options arrive with each request and are turned
//! into a [`ProviderConfig`] before any provider is built. Nothing here is
//! persisted.

use serde::{Deserialize, Serialize};

/// Default API request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the provider should interpret `auth_id`
///
/// The variant name is the query parameter the API expects the id under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthKind {
    /// Main account API user (`auth-id`)
    AuthId,
    /// Sub-user addressed by numeric id (`sub-auth-id`)
    SubAuthId,
    /// Sub-user addressed by username (`sub-auth-user`)
    SubAuthUser,
}

impl AuthKind {
    /// Derive the auth kind from the sub-user flag and the shape of the id
    pub fn detect(auth_id: &str, is_subuser: bool) -> Self {
        if !is_subuser {
            return AuthKind::AuthId;
        }

        if !auth_id.is_empty() && auth_id.chars().all(|c| c.is_ascii_digit()) {
            AuthKind::SubAuthId
        } else {
            AuthKind::SubAuthUser
        }
    }

    /// Parameter name carrying the id in API calls
    pub fn param_name(&self) -> &'static str {
        match self {
            AuthKind::AuthId => "auth-id",
            AuthKind::SubAuthId => "sub-auth-id",
            AuthKind::SubAuthUser => "sub-auth-user",
        }
    }
}

/// API credentials for one invocation
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// API id, sub-user id or sub-user name
    pub auth_id: String,

    /// API password
    /// ⚠️ NEVER log this value
    pub auth_password: String,

    /// Whether `auth_id` refers to a sub-user
    #[serde(default)]
    pub is_subuser: bool,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("auth_id", &self.auth_id)
            .field("auth_password", &"<REDACTED>")
            .field("is_subuser", &self.is_subuser)
            .finish()
    }
}

impl Credentials {
    /// Create a new set of credentials
    pub fn new(
        auth_id: impl Into<String>,
        auth_password: impl Into<String>,
        is_subuser: bool,
    ) -> Self {
        Self {
            auth_id: auth_id.into(),
            auth_password: auth_password.into(),
            is_subuser,
        }
    }

    /// Which auth parameter the id is sent under
    pub fn auth_kind(&self) -> AuthKind {
        AuthKind::detect(&self.auth_id, self.is_subuser)
    }

    /// Validate the credentials
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.auth_id.trim().is_empty() {
            return Err(crate::Error::config("auth_id is required"));
        }
        if self.auth_password.is_empty() {
            return Err(crate::Error::config("auth_password is required"));
        }
        Ok(())
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API credentials
    pub credentials: Credentials,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether TLS certificates are verified
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

impl ProviderConfig {
    /// Create a provider configuration with default client options
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout_secs: default_timeout_secs(),
            verify_ssl: default_verify_ssl(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Enable or disable certificate verification
    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.credentials.validate()?;

        if self.timeout_secs == 0 {
            return Err(crate::Error::config("timeout must be > 0"));
        }

        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_verify_ssl() -> bool {
    true
}
