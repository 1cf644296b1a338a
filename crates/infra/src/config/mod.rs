//! Configuration loading
//!
//! Builds a [`twikey_domain::TwikeyConfig`] from environment variables or
//! TOML/JSON files.

pub mod loader;

pub use loader::{discover_config_paths, load, load_from_env, load_from_file};
