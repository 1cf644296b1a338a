//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use twikey_domain::TwikeyError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TwikeyError);

impl From<InfraError> for TwikeyError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TwikeyError> for InfraError {
    fn from(value: TwikeyError) -> Self {
        InfraError(value)
    }
}

impl InfraError {
    /// Wrap a reqwest failure with the operation it happened in.
    pub fn http(context: &str, err: HttpError) -> TwikeyError {
        err.into_twikey(context)
    }

    /// Wrap a body decoding failure with the operation it happened in.
    pub fn json(context: &str, err: JsonError) -> TwikeyError {
        err.into_twikey(context)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTwikeyError {
    fn into_twikey(self, context: &str) -> TwikeyError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TwikeyError */
/* -------------------------------------------------------------------------- */

impl IntoTwikeyError for HttpError {
    fn into_twikey(self, context: &str) -> TwikeyError {
        if self.is_timeout() {
            return TwikeyError::transport(context, "HTTP request timed out", None);
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            let message = format!("HTTP connection failure: {self}");
            return TwikeyError::transport(context, message, None);
        }

        if self.is_builder() {
            return TwikeyError::InvalidInput(format!("{context}: invalid request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return TwikeyError::invalid_response(context, self.to_string());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            return TwikeyError::transport(context, message, Some(code));
        }

        TwikeyError::transport(context, self.to_string(), None)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_twikey("HTTP"))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → TwikeyError */
/* -------------------------------------------------------------------------- */

impl IntoTwikeyError for JsonError {
    fn into_twikey(self, context: &str) -> TwikeyError {
        TwikeyError::invalid_response(context, format!("malformed JSON body: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_twikey("JSON"))
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → TwikeyError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(TwikeyError::from(value))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
