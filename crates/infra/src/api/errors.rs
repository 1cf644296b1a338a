//! Mapping of Twikey error responses onto [`TwikeyError`]
//!
//! Twikey flags API-level failures out of band: an `ApiErrorCode` (or
//! `ApiError`) response header marks the response as an error whatever its
//! HTTP status. The body, when it is JSON, carries the human message and
//! optional `extra` details.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use twikey_domain::constants::headers as wire;
use twikey_domain::TwikeyError;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    extra: Option<Value>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok()).filter(|value| !value.is_empty())
}

/// Error code announced by the response headers, if any.
pub fn error_code_header(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, wire::API_ERROR_CODE).or_else(|| header_str(headers, wire::API_ERROR))
}

/// Build the API error for a response flagged by `ApiErrorCode`/`ApiError`.
///
/// Returns `None` when neither header is present.
pub fn api_error(context: &str, headers: &HeaderMap, body: &[u8]) -> Option<TwikeyError> {
    let header_code = error_code_header(headers)?;
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    let code = header_str(headers, wire::API_ERROR_CODE)
        .map(str::to_string)
        .or(parsed.code)
        .unwrap_or_else(|| header_code.to_string());
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .or_else(|| header_str(headers, wire::API_ERROR).map(str::to_string))
        .unwrap_or_else(|| code.clone());

    Some(TwikeyError::Api {
        context: context.to_string(),
        code,
        message,
        extra: extra_fields(parsed.extra),
    })
}

/// Error for a response that is neither flagged nor in the accepted range.
pub fn unexpected_status(context: &str, status: u16, body: &[u8]) -> TwikeyError {
    let snippet: String = String::from_utf8_lossy(body).chars().take(200).collect();
    let message = if snippet.trim().is_empty() {
        format!("unexpected HTTP status {status}")
    } else {
        format!("unexpected HTTP status {status}: {}", snippet.trim())
    };
    TwikeyError::transport(context, message, Some(status))
}

fn extra_fields(extra: Option<Value>) -> BTreeMap<String, String> {
    match extra {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
        Some(Value::String(s)) => BTreeMap::from([("extra".to_string(), s)]),
        Some(other) => BTreeMap::from([("extra".to_string(), other.to_string())]),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn no_error_header_means_no_api_error() {
        assert!(api_error("Invite", &HeaderMap::new(), br#"{"message":"x"}"#).is_none());
    }

    #[test]
    fn code_from_header_message_and_extra_from_body() {
        let err = api_error(
            "Invite",
            &headers(&[("ApiErrorCode", "err_invalid_params")]),
            br#"{"code":"err_invalid_params","message":"Invalid parameters","extra":"iban"}"#,
        )
        .unwrap();

        assert_eq!(err.code(), "err_invalid_params");
        assert_eq!(err.message(), "Invalid parameters");
        assert_eq!(err.extra().and_then(|e| e.get("extra")).map(String::as_str), Some("iban"));
    }

    #[test]
    fn falls_back_to_header_when_body_is_not_json() {
        let err = api_error(
            "Cancel",
            &headers(&[("ApiErrorCode", "err_no_contract"), ("ApiError", "No contract found")]),
            b"<html>oops</html>",
        )
        .unwrap();

        assert_eq!(err.code(), "err_no_contract");
        assert_eq!(err.message(), "No contract found");
        assert!(err.extra().is_some_and(BTreeMap::is_empty));
    }

    #[test]
    fn api_error_header_alone_is_enough() {
        let err = api_error("Sign", &headers(&[("ApiError", "err_already_signed")]), b"").unwrap();
        assert_eq!(err.code(), "err_already_signed");
        assert!(err.matches("already_signed"));
    }

    #[test]
    fn object_extra_is_stringified() {
        let err = api_error(
            "Invoice",
            &headers(&[("ApiErrorCode", "err_invalid_params")]),
            br#"{"message":"bad","extra":{"field":"amount","max":100}}"#,
        )
        .unwrap();
        let extra = err.extra().unwrap();
        assert_eq!(extra.get("field").map(String::as_str), Some("amount"));
        assert_eq!(extra.get("max").map(String::as_str), Some("100"));
    }

    #[test]
    fn unexpected_status_is_transport_with_status() {
        let err = unexpected_status("Feed", 500, b"");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.code(), "err_transport");
    }
}
