//! HTTP plumbing shared by all Twikey endpoints

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
