//! # Twikey Infrastructure
//!
//! HTTP implementation of the Twikey creditor API client.
//!
//! This crate contains:
//! - The reqwest-based HTTP client and error conversions
//! - Credential exchange and the authenticated transport
//! - Resource services (documents, invoices, transactions, paylinks,
//!   refunds) and their feed sources
//! - The [`TwikeyClient`] facade
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements the ports defined in `twikey-core`
//! - Contains all network and file system access

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod resources;

// Re-export commonly used items
pub use api::{ApiRequest, ApiResponse, ApiTransport, TwikeyClient, TwikeyClientBuilder};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use resources::{
    save_pdf, DocumentService, InvoiceService, ListFeed, PaylinkService, RefundService,
    TransactionService,
};
