//! Credential exchange against the Twikey authentication endpoint
//!
//! The API key is posted as `apiToken` to the creditor base URL; the session
//! token comes back in the `Authorization` response header.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Method;
use tracing::{debug, instrument};
use twikey_core::auth::{CredentialExchange, IssuedToken};
use twikey_domain::constants::{codes, content_types};
use twikey_domain::{Result, TwikeyError};

use super::errors::{api_error, unexpected_status};
use crate::errors::InfraError;
use crate::http::HttpClient;

const CONTEXT: &str = "Authentication";

/// Exchanges the API key for a session token over HTTP.
pub struct HttpCredentialExchange {
    http: HttpClient,
    auth_url: String,
    api_key: String,
}

impl HttpCredentialExchange {
    /// # Arguments
    /// * `http` - Client used for the exchange
    /// * `auth_url` - Creditor base URL; the exchange is a POST to it
    /// * `api_key` - Long-lived key from the Twikey dashboard
    pub fn new(http: HttpClient, auth_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { http, auth_url: auth_url.into(), api_key: api_key.into() }
    }
}

impl fmt::Debug for HttpCredentialExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCredentialExchange")
            .field("auth_url", &self.auth_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialExchange for HttpCredentialExchange {
    #[instrument(skip(self), fields(url = %self.auth_url))]
    async fn exchange(&self) -> Result<IssuedToken> {
        let request = self
            .http
            .request(Method::POST, &self.auth_url)
            .header(ACCEPT, content_types::JSON)
            .form(&[("apiToken", self.api_key.as_str())]);

        let response = self.http.send(CONTEXT, request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| InfraError::http(CONTEXT, err))?;

        if let Some(err) = api_error(CONTEXT, &headers, &body) {
            return Err(TwikeyError::Authentication {
                code: err.code().to_string(),
                message: err.message().to_string(),
            });
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(TwikeyError::Authentication {
                code: codes::AUTHENTICATION.to_string(),
                message: format!("credentials rejected with HTTP {}", status.as_u16()),
            });
        }

        if !status.is_success() {
            return Err(unexpected_status(CONTEXT, status.as_u16(), &body));
        }

        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| TwikeyError::Authentication {
                code: codes::AUTHENTICATION.to_string(),
                message: "no session token in the authentication response".to_string(),
            })?;

        debug!("credential exchange succeeded");
        Ok(IssuedToken::new(token))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn exchange(server: &MockServer) -> HttpCredentialExchange {
        HttpCredentialExchange::new(
            HttpClient::new().unwrap(),
            format!("{}/creditor", server.uri()),
            "K",
        )
    }

    #[tokio::test]
    async fn token_is_read_from_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/creditor"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("apiToken=K"))
            .respond_with(ResponseTemplate::new(200).insert_header("Authorization", "session-1"))
            .expect(1)
            .mount(&server)
            .await;

        let issued = exchange(&server).exchange().await.unwrap();
        assert_eq!(issued.token, "session-1");
        assert_eq!(issued.ttl, None);
    }

    #[tokio::test]
    async fn error_header_is_an_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ApiErrorCode", "err_invalid_token")
                    .set_body_json(serde_json::json!({"message": "Invalid apiToken"})),
            )
            .mount(&server)
            .await;

        let err = exchange(&server).exchange().await.unwrap_err();
        match err {
            TwikeyError::Authentication { code, message } => {
                assert_eq!(code, "err_invalid_token");
                assert_eq!(message, "Invalid apiToken");
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_token_header_is_an_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = exchange(&server).exchange().await.unwrap_err();
        assert_eq!(err.code(), "err_auth");
    }

    #[tokio::test]
    async fn server_error_stays_a_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = exchange(&server).exchange().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let exchange = HttpCredentialExchange::new(
            HttpClient::new().unwrap(),
            "https://api.twikey.com/creditor",
            "super-secret",
        );
        assert!(!format!("{exchange:?}").contains("super-secret"));
    }
}
