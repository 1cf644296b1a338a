//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory is applied first (`dotenvy`)
//! 2. Environment variables are tried next
//! 3. If `TWIKEY_API_KEY` is missing, falls back to a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TWIKEY_API_KEY`: API key (required)
//! - `TWIKEY_API_URL`: Base URL, defaults to production
//! - `TWIKEY_MERCHANT_ID`: Merchant id for invoice URLs
//! - `TWIKEY_TIMEOUT_SECS`: Default request timeout in seconds
//! - `TWIKEY_USER_AGENT`: Overrides `twikey-rust/v<version>`
//!
//! ## File Locations
//! The loader searches `twikey.{toml,json}` then `config.{toml,json}` in the
//! current working directory and its two parents.

use std::path::{Path, PathBuf};

use twikey_domain::{Result, TwikeyConfig, TwikeyError};

pub const ENV_API_KEY: &str = "TWIKEY_API_KEY";
pub const ENV_API_URL: &str = "TWIKEY_API_URL";
pub const ENV_MERCHANT_ID: &str = "TWIKEY_MERCHANT_ID";
pub const ENV_TIMEOUT_SECS: &str = "TWIKEY_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "TWIKEY_USER_AGENT";

const FILE_NAMES: [&str; 4] = ["twikey.toml", "twikey.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `TwikeyError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<TwikeyConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `TwikeyError::Config` if `TWIKEY_API_KEY` is missing or a value
/// is invalid.
pub fn load_from_env() -> Result<TwikeyConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Applied .env file");
    }
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a configuration from a variable lookup.
fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<TwikeyConfig> {
    let api_key = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        TwikeyError::Config(format!("Missing required environment variable: {ENV_API_KEY}"))
    })?;

    let mut config = TwikeyConfig::new(api_key);
    if let Some(url) = lookup(ENV_API_URL) {
        config.base_url = url;
    }
    config.merchant_id = lookup(ENV_MERCHANT_ID).filter(|v| !v.is_empty());
    if let Some(agent) = lookup(ENV_USER_AGENT) {
        config.user_agent = agent;
    }
    if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
        config.timeout_secs = secs.trim().parse().map_err(|e| {
            TwikeyError::Config(format!("Invalid {ENV_TIMEOUT_SECS} '{secs}': {e}"))
        })?;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations.
///
/// # Errors
/// Returns `TwikeyError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or the result fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<TwikeyConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TwikeyError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => discover_config_paths().ok_or_else(|| {
            TwikeyError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TwikeyError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<TwikeyConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TwikeyError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TwikeyError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TwikeyError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the working directory or its two parents.
pub fn discover_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_from(&cwd)
}

fn discover_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}
