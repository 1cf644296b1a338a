//! Wire-level constants
//!
//! Header names, default endpoints and stable error codes shared by every
//! crate in the workspace.

use std::time::Duration;

// Endpoints
pub const PRODUCTION_BASE_URL: &str = "https://api.twikey.com/creditor";
pub const BETA_BASE_URL: &str = "https://api.beta.twikey.com/creditor";
pub const APP_URL: &str = "https://app.twikey.com";
pub const BETA_APP_URL: &str = "https://app.beta.twikey.com";

// Timeouts
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const BULK_TIMEOUT: Duration = Duration::from_secs(30);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(60);

// Session
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);
/// Upper bound accepted for a configured token lifetime.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

pub const USER_AGENT_PREFIX: &str = "twikey-rust/v";

/// Default user agent, `twikey-rust/v<crate version>`.
pub fn default_user_agent() -> String {
    format!("{USER_AGENT_PREFIX}{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP header names used by the API.
pub mod headers {
    pub const API_ERROR_CODE: &str = "ApiErrorCode";
    pub const API_ERROR: &str = "ApiError";
    pub const LAST_POSITION: &str = "X-LAST";
    pub const RESUME_AFTER: &str = "X-RESUME-AFTER";
    pub const STATE: &str = "X-STATE";
    pub const PARTNER: &str = "X-PARTNER";
    pub const PURPOSE: &str = "X-Purpose";
    pub const MANUAL: &str = "X-MANUAL";
    pub const INVOICE_ID: &str = "X-INVOICE-ID";
    pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
}

/// Content types sent by the client.
pub mod content_types {
    pub const FORM: &str = "application/x-www-form-urlencoded";
    pub const JSON: &str = "application/json";
    pub const PDF: &str = "application/pdf";
    pub const XML: &str = "text/xml";
}

/// Stable error codes for failures that do not carry a server code.
pub mod codes {
    pub const AUTHENTICATION: &str = "err_auth";
    pub const TRANSPORT: &str = "err_transport";
    pub const INVALID_RESPONSE: &str = "err_invalid_response";
    pub const CONFIG: &str = "err_config";
    pub const INVALID_INPUT: &str = "err_invalid_input";
    pub const IO: &str = "err_io";
    pub const INVALID_TOKEN: &str = "err_invalid_token";
    pub const NO_LOGIN: &str = "err_no_login";
}

pub const DEFAULT_PDF_FILENAME: &str = "mandate.pdf";
