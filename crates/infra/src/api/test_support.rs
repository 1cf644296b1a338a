//! Shared fixtures for unit tests that talk to a `wiremock` server.

use std::sync::Arc;

use twikey_core::auth::{SessionPolicy, TokenSession};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::auth::HttpCredentialExchange;
use super::transport::ApiTransport;
use crate::http::HttpClient;

pub(crate) const API_KEY: &str = "test-api-key";

/// Base URL of the mock creditor API.
pub(crate) fn base_url(server: &MockServer) -> String {
    format!("{}/creditor", server.uri())
}

/// Answer every credential exchange with `token`.
pub(crate) async fn mount_auth(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/creditor"))
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", token))
        .mount(server)
        .await;
}

pub(crate) fn transport_for(server: &MockServer) -> ApiTransport {
    let http = HttpClient::builder().user_agent("twikey-rust/test").build().unwrap();
    let exchange = HttpCredentialExchange::new(http.clone(), base_url(server), API_KEY);
    let session = Arc::new(TokenSession::new(Arc::new(exchange), SessionPolicy::default()));
    ApiTransport::new(http, session, base_url(server), "twikey-rust/test")
}
