//! Shared helpers for the integration tests: a `wiremock` creditor API and a
//! client pointed at it.

use std::sync::Arc;
use std::time::Duration;

use twikey_core::time::MockClock;
use twikey_domain::TwikeyConfig;
use twikey_infra::TwikeyClient;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "K";

/// Base URL of the mock creditor API.
pub fn base_url(server: &MockServer) -> String {
    format!("{}/creditor", server.uri())
}

pub fn config(server: &MockServer) -> TwikeyConfig {
    TwikeyConfig::new(API_KEY)
        .with_base_url(base_url(server))
        .with_merchant_id("1234")
        .with_timeout(Duration::from_secs(5))
}

/// Answer credential exchanges for [`API_KEY`] with `token`, at most
/// `times` times when given.
pub async fn mount_auth(server: &MockServer, token: &str, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path("/creditor"))
        .and(body_string(format!("apiToken={API_KEY}")))
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", token));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n).expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

pub fn client(server: &MockServer) -> TwikeyClient {
    TwikeyClient::new(config(server)).expect("client should build")
}

pub fn client_with_clock(server: &MockServer, clock: &MockClock) -> TwikeyClient {
    TwikeyClient::builder(config(server))
        .clock(Arc::new(clock.clone()))
        .build()
        .expect("client should build")
}
