//! Error types used throughout the client

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::codes;

/// Broad classification of a [`TwikeyError`], useful for caller-side retry
/// policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Credential exchange rejected
    Authentication,
    /// Structured error returned by the server for one operation
    Api,
    /// DNS/connect/timeout/TLS failure or non-2xx without a structured body
    Transport,
    /// Response could not be decoded into the expected shape
    InvalidResponse,
    /// Local misconfiguration or invalid caller input
    Client,
}

/// Main error type for the Twikey client
///
/// Every variant exposes a machine `code`, a human `message` and an optional
/// `extra` map through the accessors below, regardless of its origin.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum TwikeyError {
    #[error("Authentication failed ({code}): {message}")]
    Authentication { code: String, message: String },

    #[error("{context}: {message} ({code})")]
    Api { context: String, code: String, message: String, extra: BTreeMap<String, String> },

    #[error("{context}: transport failure: {message}")]
    Transport { context: String, message: String, status: Option<u16> },

    #[error("{context}: invalid response: {message}")]
    InvalidResponse { context: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl TwikeyError {
    /// Build an API error without extra fields.
    pub fn api(
        context: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            context: context.into(),
            code: code.into(),
            message: message.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Build a transport error, optionally carrying the HTTP status.
    pub fn transport(
        context: impl Into<String>,
        message: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self::Transport { context: context.into(), message: message.into(), status }
    }

    pub fn invalid_response(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse { context: context.into(), message: message.into() }
    }

    /// Machine-readable code used for programmatic matching.
    pub fn code(&self) -> &str {
        match self {
            Self::Authentication { code, .. } | Self::Api { code, .. } => code,
            Self::Transport { .. } => codes::TRANSPORT,
            Self::InvalidResponse { .. } => codes::INVALID_RESPONSE,
            Self::Config(_) => codes::CONFIG,
            Self::InvalidInput(_) => codes::INVALID_INPUT,
            Self::Io(_) => codes::IO,
        }
    }

    /// Human-readable message without the context prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message, .. }
            | Self::Api { message, .. }
            | Self::Transport { message, .. }
            | Self::InvalidResponse { message, .. } => message,
            Self::Config(message) | Self::InvalidInput(message) | Self::Io(message) => message,
        }
    }

    /// Extra fields the server attached to an API error.
    pub fn extra(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Api { extra, .. } => Some(extra),
            _ => None,
        }
    }

    /// HTTP status attached to a transport error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Api { .. } => ErrorCategory::Api,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::InvalidResponse { .. } => ErrorCategory::InvalidResponse,
            Self::Config(_) | Self::InvalidInput(_) | Self::Io(_) => ErrorCategory::Client,
        }
    }

    /// Hint for callers layering their own retry policy on top.
    ///
    /// Only transport failures without a status, or with a 5xx/429 status,
    /// are considered worth retrying. The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport { status: Some(status), .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// True when the server reported the given code, or when the message
    /// contains it.
    pub fn matches(&self, needle: &str) -> bool {
        self.code() == needle || self.message().contains(needle)
    }
}

impl From<std::io::Error> for TwikeyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for Twikey operations
pub type Result<T> = std::result::Result<T, TwikeyError>;
