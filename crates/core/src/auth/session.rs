//! Token session with transparent refresh
//!
//! Holds the current session token and its expiry instant:
//! - Acquires a token on first use
//! - Reuses it until `ttl - refresh_margin` has elapsed
//! - Re-acquires on demand (`force_refresh`) or after `invalidate`
//!
//! The check-and-refresh runs under one async mutex, so concurrent callers
//! sharing a session trigger at most one exchange.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use twikey_domain::constants::{DEFAULT_REFRESH_MARGIN, DEFAULT_TOKEN_TTL};
use twikey_domain::{Result, TwikeyConfig, TwikeyError};

use super::ports::CredentialExchange;
use crate::time::{Clock, SystemClock};

/// Token lifetime rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Lifetime assumed when the server does not declare one.
    pub token_ttl: Duration,
    /// Renew this long before the nominal expiry. Clamped to the lifetime.
    pub refresh_margin: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self { token_ttl: DEFAULT_TOKEN_TTL, refresh_margin: DEFAULT_REFRESH_MARGIN }
    }
}

impl From<&TwikeyConfig> for SessionPolicy {
    fn from(config: &TwikeyConfig) -> Self {
        Self { token_ttl: config.token_ttl(), refresh_margin: config.refresh_margin() }
    }
}

impl SessionPolicy {
    fn effective_lifetime(&self, declared: Option<Duration>) -> Duration {
        let ttl = declared.unwrap_or(self.token_ttl);
        ttl.saturating_sub(self.refresh_margin.min(ttl))
    }
}

struct TokenState {
    token: String,
    expires_at: Instant,
}

/// Owner of the session token.
///
/// No other component mutates the token or its expiry.
pub struct TokenSession {
    exchange: Arc<dyn CredentialExchange>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    state: Mutex<Option<TokenState>>,
}

impl TokenSession {
    /// Create a session that has not authenticated yet.
    ///
    /// # Arguments
    /// * `exchange` - Performs the actual credential exchange
    /// * `policy` - Lifetime and refresh margin
    pub fn new(exchange: Arc<dyn CredentialExchange>, policy: SessionPolicy) -> Self {
        Self { exchange, clock: Arc::new(SystemClock), policy, state: Mutex::new(None) }
    }

    /// Replace the clock, mainly for tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Return a valid token, exchanging credentials first if none is held or
    /// the held one has expired.
    ///
    /// # Errors
    /// Propagates the exchange failure. The session stays unauthenticated
    /// and no retry is attempted.
    #[instrument(skip(self))]
    pub async fn ensure_authenticated(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        if let Some(current) = state.as_ref() {
            if self.clock.now() < current.expires_at {
                return Ok(current.token.clone());
            }
            debug!("session token expired, refreshing");
        }

        let fresh = self.acquire().await?;
        let token = fresh.token.clone();
        *state = Some(fresh);
        Ok(token)
    }

    /// Exchange credentials now, regardless of the current token.
    ///
    /// # Errors
    /// Propagates the exchange failure; the previous token is dropped.
    #[instrument(skip(self))]
    pub async fn force_refresh(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        *state = None;
        let fresh = self.acquire().await?;
        let token = fresh.token.clone();
        *state = Some(fresh);
        Ok(token)
    }

    /// Drop the current token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        if self.state.lock().await.take().is_some() {
            info!("session token invalidated");
        }
    }

    /// Whether a non-expired token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.as_ref().is_some_and(|s| self.clock.now() < s.expires_at)
    }

    /// Time left before the held token is considered expired.
    pub async fn expires_in(&self) -> Option<Duration> {
        let state = self.state.lock().await;
        state.as_ref().map(|s| s.expires_at.saturating_duration_since(self.clock.now()))
    }

    async fn acquire(&self) -> Result<TokenState> {
        let issued = self.exchange.exchange().await.map_err(|err| {
            warn!(code = err.code(), error = %err, "credential exchange failed");
            err
        })?;

        let lifetime = self.policy.effective_lifetime(issued.ttl);
        let expires_at = self.clock.now().checked_add(lifetime).ok_or_else(|| {
            let secs = lifetime.as_secs();
            TwikeyError::Config(format!("token lifetime of {secs}s is out of range"))
        })?;
        info!(lifetime_secs = lifetime.as_secs(), "session token acquired");

        Ok(TokenState { token: issued.token, expires_at })
    }
}
