//! # Twikey Core
//!
//! Protocol logic for the Twikey client, free of HTTP and file system code.
//!
//! This crate contains:
//! - The token session and its credential exchange port
//! - The generic feed drain loop and the per-resource handler traits
//! - A clock abstraction for deterministic expiry tests
//!
//! ## Architecture Principles
//! - Only depends on `twikey-domain`
//! - All network access goes through ports (traits) implemented in infra

pub mod auth;
pub mod feed;
pub mod time;

pub use auth::{CredentialExchange, IssuedToken, SessionPolicy, TokenSession};
pub use feed::{
    DocumentFeed, FeedConsumer, FeedHandler, FeedOptions, FeedOutcome, FeedReport, FeedSource,
    InvoiceFeed, PaylinkFeed, RefundFeed, TransactionFeed,
};
pub use time::{Clock, MockClock, SystemClock};
