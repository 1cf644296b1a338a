//! Credential exchange port

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use twikey_domain::Result;

/// Token handed out by a successful credential exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Opaque session token, sent back verbatim on every call.
    pub token: String,
    /// Lifetime declared by the server, if it declared one.
    pub ttl: Option<Duration>,
}

impl IssuedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), ttl: None }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken").field("token", &"<redacted>").field("ttl", &self.ttl).finish()
    }
}

/// Exchanges long-lived credentials for a session token.
///
/// Implementations own the API key and the authentication endpoint. They
/// return `TwikeyError::Authentication` when the server rejects the
/// credentials and `TwikeyError::Transport` when it cannot be reached.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    async fn exchange(&self) -> Result<IssuedToken>;
}
