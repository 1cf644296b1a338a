//! Authenticated access to the Twikey creditor API
//!
//! - `auth`: credential exchange against the base URL
//! - `transport`: token-carrying requests and error routing
//! - `errors`: mapping of flagged responses onto `TwikeyError`
//! - `client`: the `TwikeyClient` facade handing out resource services

pub mod auth;
pub mod client;
pub mod errors;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::HttpCredentialExchange;
pub use client::{TwikeyClient, TwikeyClientBuilder};
pub use transport::{ApiRequest, ApiResponse, ApiTransport, RequestBody};
