//! Client configuration structures

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    default_user_agent, BETA_BASE_URL, BULK_TIMEOUT, DEFAULT_REFRESH_MARGIN, DEFAULT_TIMEOUT,
    DEFAULT_TOKEN_TTL, LONG_TIMEOUT, MAX_TOKEN_TTL, PRODUCTION_BASE_URL,
};
use crate::errors::{Result, TwikeyError};

/// Configuration for a Twikey client.
///
/// Durations are stored in whole seconds so the structure maps directly onto
/// TOML and JSON files.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwikeyConfig {
    /// API key issued in the Twikey dashboard. Never logged.
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Merchant id, needed to build customer-facing invoice URLs.
    #[serde(default)]
    pub merchant_id: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_bulk_timeout_secs")]
    pub bulk_timeout_secs: u64,
    /// Timeout for batch collection and import endpoints.
    #[serde(default = "default_long_timeout_secs")]
    pub long_timeout_secs: u64,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Tokens are renewed this long before their nominal expiry.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,
}

fn default_base_url() -> String {
    PRODUCTION_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_bulk_timeout_secs() -> u64 {
    BULK_TIMEOUT.as_secs()
}

fn default_long_timeout_secs() -> u64 {
    LONG_TIMEOUT.as_secs()
}

fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL.as_secs()
}

fn default_refresh_margin_secs() -> u64 {
    DEFAULT_REFRESH_MARGIN.as_secs()
}

impl TwikeyConfig {
    /// Production configuration for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            merchant_id: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            bulk_timeout_secs: default_bulk_timeout_secs(),
            long_timeout_secs: default_long_timeout_secs(),
            token_ttl_secs: default_token_ttl_secs(),
            refresh_margin_secs: default_refresh_margin_secs(),
        }
    }

    /// Configuration targeting the beta environment.
    pub fn beta(api_key: impl Into<String>) -> Self {
        Self::new(api_key).with_base_url(BETA_BASE_URL)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin_secs = margin.as_secs();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_secs(self.bulk_timeout_secs)
    }

    pub fn long_timeout(&self) -> Duration {
        Duration::from_secs(self.long_timeout_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.refresh_margin_secs)
    }

    /// Whether the base URL points at the beta environment.
    pub fn is_beta(&self) -> bool {
        self.base_url.contains(".beta.")
    }

    /// Base URL without a trailing slash.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validate the configuration before building a client.
    ///
    /// # Errors
    /// Returns `TwikeyError::Config` if the API key is empty, the base URL is
    /// not http(s), the timeout is zero, the token lifetime is zero or above
    /// [`MAX_TOKEN_TTL`], or the refresh margin is not shorter than the
    /// token lifetime.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(TwikeyError::Config("api_key must not be empty".into()));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(TwikeyError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(TwikeyError::Config("timeout_secs must be greater than zero".into()));
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL.as_secs() {
            return Err(TwikeyError::Config(format!(
                "token_ttl_secs must be between 1 and {}, got {}",
                MAX_TOKEN_TTL.as_secs(),
                self.token_ttl_secs
            )));
        }
        if self.refresh_margin_secs >= self.token_ttl_secs {
            return Err(TwikeyError::Config(format!(
                "refresh_margin_secs ({}) must be shorter than token_ttl_secs ({})",
                self.refresh_margin_secs, self.token_ttl_secs
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for TwikeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwikeyConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("merchant_id", &self.merchant_id)
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("bulk_timeout_secs", &self.bulk_timeout_secs)
            .field("long_timeout_secs", &self.long_timeout_secs)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("refresh_margin_secs", &self.refresh_margin_secs)
            .finish()
    }
}
