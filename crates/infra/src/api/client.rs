//! Client facade
//!
//! [`TwikeyClient`] owns the HTTP client, the token session and the
//! transport, and hands out resource services that share them.

use std::sync::Arc;

use tracing::info;
use twikey_core::auth::{SessionPolicy, TokenSession};
use twikey_core::time::Clock;
use twikey_domain::{Result, TwikeyConfig};

use super::auth::HttpCredentialExchange;
use super::transport::ApiTransport;
use crate::config;
use crate::http::HttpClient;
use crate::resources::{
    DocumentService, InvoiceService, PaylinkService, RefundService, TransactionService,
};

/// Entry point of the library.
///
/// Cloning is cheap; clones share the session token.
#[derive(Clone)]
pub struct TwikeyClient {
    config: Arc<TwikeyConfig>,
    transport: Arc<ApiTransport>,
}

impl TwikeyClient {
    /// Client with default HTTP settings for `config`.
    ///
    /// # Errors
    /// Returns `TwikeyError::Config` when the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: TwikeyConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: TwikeyConfig) -> TwikeyClientBuilder {
        TwikeyClientBuilder { config, http: None, clock: None }
    }

    /// Client configured from `TWIKEY_*` variables, falling back to a
    /// config file.
    ///
    /// # Errors
    /// Returns `TwikeyError::Config` when no usable configuration is found.
    pub fn from_env() -> Result<Self> {
        Self::new(config::load()?)
    }

    pub fn config(&self) -> &TwikeyConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<TokenSession> {
        self.transport.session()
    }

    pub fn transport(&self) -> &Arc<ApiTransport> {
        &self.transport
    }

    /// Exchange credentials now, replacing any held token.
    pub async fn force_refresh(&self) -> Result<()> {
        self.session().force_refresh().await.map(|_| ())
    }

    /// Drop the held token; the next call authenticates again.
    pub async fn invalidate(&self) {
        self.session().invalidate().await;
    }

    pub fn document(&self) -> DocumentService {
        DocumentService::new(self.transport.clone())
    }

    pub fn invoice(&self) -> InvoiceService {
        InvoiceService::new(
            self.transport.clone(),
            self.config.merchant_id.clone(),
            self.config.is_beta(),
            self.config.bulk_timeout(),
        )
    }

    pub fn transaction(&self) -> TransactionService {
        TransactionService::new(self.transport.clone(), self.config.long_timeout())
    }

    pub fn paylink(&self) -> PaylinkService {
        PaylinkService::new(self.transport.clone())
    }

    pub fn refund(&self) -> RefundService {
        RefundService::new(self.transport.clone())
    }
}

/// Builder for [`TwikeyClient`].
pub struct TwikeyClientBuilder {
    config: TwikeyConfig,
    http: Option<HttpClient>,
    clock: Option<Arc<dyn Clock>>,
}

impl TwikeyClientBuilder {
    /// Use a preconfigured HTTP client instead of one built from the config.
    #[must_use]
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Clock used for token expiry.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// # Errors
    /// Returns `TwikeyError::Config` when the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn build(self) -> Result<TwikeyClient> {
        let Self { config, http, clock } = self;
        config.validate()?;

        let http = match http {
            Some(http) => http,
            None => HttpClient::builder()
                .timeout(config.timeout())
                .user_agent(config.user_agent.clone())
                .build()?,
        };

        let base_url = config.normalized_base_url().to_string();
        let exchange =
            HttpCredentialExchange::new(http.clone(), base_url.clone(), config.api_key.clone());
        let mut session = TokenSession::new(Arc::new(exchange), SessionPolicy::from(&config));
        if let Some(clock) = clock {
            session = session.with_clock(clock);
        }

        let transport =
            ApiTransport::new(http, Arc::new(session), base_url, config.user_agent.clone());
        info!(
            base_url = %config.normalized_base_url(),
            beta = config.is_beta(),
            "Twikey client ready"
        );

        Ok(TwikeyClient { config: Arc::new(config), transport: Arc::new(transport) })
    }
}
