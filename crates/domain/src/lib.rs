//! # Twikey Domain
//!
//! Domain types for the Twikey creditor API client.
//!
//! This crate contains:
//! - The error model and `Result` alias
//! - Client configuration
//! - Wire constants (headers, endpoints, error codes)
//! - Typed request/response models and feed events
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No network access; pure data and parsing

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
