//! Authenticated request/response plumbing shared by every resource
//!
//! [`ApiTransport::call`] is the single path to the network for resource
//! calls. It makes sure the session holds a valid token, attaches the
//! standard headers, and routes flagged or unexpected responses into
//! [`TwikeyError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use twikey_core::auth::TokenSession;
use twikey_domain::constants::{codes, content_types};
use twikey_domain::utils::{to_form_pairs, FormPairs};
use twikey_domain::{Result, TwikeyError};

use super::errors::{api_error, unexpected_status};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded`; keys may repeat.
    Form(FormPairs),
    Json(Value),
    /// Raw bytes such as an uploaded PDF or XML file.
    Bytes { content_type: String, data: Vec<u8> },
}

/// One call against the creditor API, relative to the base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
    /// Overrides the client-wide timeout.
    pub timeout: Option<Duration>,
    /// Non-2xx statuses that are returned to the caller instead of failing.
    pub accepted: Vec<u16>,
    /// The only success status the caller accepts.
    pub expected: Option<u16>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            headers: Vec::new(),
            timeout: None,
            accepted: Vec::new(),
            expected: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Flatten `params` into query pairs.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidInput` for nested structures.
    pub fn query_from<T: Serialize + ?Sized>(self, params: &T) -> Result<Self> {
        Ok(self.query_pairs(to_form_pairs(params)?))
    }

    pub fn form(mut self, pairs: FormPairs) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    /// Serialize `body` as a form.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidInput` for nested structures.
    pub fn form_from<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        Ok(self.form(to_form_pairs(body)?))
    }

    /// Serialize `body` as JSON.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidInput` when serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| TwikeyError::InvalidInput(format!("cannot serialize body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = RequestBody::Bytes { content_type: content_type.into(), data };
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn accept_status(mut self, status: u16) -> Self {
        self.accepted.push(status);
        self
    }

    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected = Some(status);
        self
    }

    fn content_type(&self) -> &str {
        match &self.body {
            RequestBody::Json(_) => content_types::JSON,
            RequestBody::Bytes { content_type, .. } => content_type,
            RequestBody::Empty | RequestBody::Form(_) => content_types::FORM,
        }
    }
}

/// Raw response of a successful call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Decode the body as `T`.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidResponse` for an empty or malformed body.
    pub fn json<T: DeserializeOwned>(&self, context: &str) -> Result<T> {
        if self.is_empty() {
            return Err(TwikeyError::invalid_response(context, "empty response body"));
        }
        serde_json::from_slice(&self.body).map_err(|err| InfraError::json(context, err))
    }

    /// Decode the body as a JSON value; an empty body is `Value::Null`.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidResponse` for a malformed body.
    pub fn json_value(&self, context: &str) -> Result<Value> {
        if self.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|err| InfraError::json(context, err))
    }

    /// Decode the first element of the list stored under `field`.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidResponse` when the body is not an object
    /// holding a list under `field`.
    pub fn first_of<T: DeserializeOwned>(&self, context: &str, field: &str) -> Result<Option<T>> {
        let mut items: Vec<T> = self.list(context, field)?;
        Ok(if items.is_empty() { None } else { Some(items.swap_remove(0)) })
    }

    /// Decode the list stored under `field`; a missing or null field is empty.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidResponse` for a malformed body.
    pub fn list<T: DeserializeOwned>(&self, context: &str, field: &str) -> Result<Vec<T>> {
        match self.json_value(context)? {
            Value::Object(mut map) => match map.remove(field) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(value) => {
                    serde_json::from_value(value).map_err(|err| InfraError::json(context, err))
                }
            },
            Value::Null => Ok(Vec::new()),
            other => Err(TwikeyError::invalid_response(
                context,
                format!("expected an object with '{field}', got {}", json_kind(&other)),
            )),
        }
    }

    /// Decode the list stored under `field`, which must be present.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidResponse` for an empty body, a body that
    /// is not an object, or a missing or non-list `field`.
    pub fn list_required<T: DeserializeOwned>(&self, context: &str, field: &str) -> Result<Vec<T>> {
        let value = match self.json_value(context)? {
            Value::Object(mut map) => map.remove(field),
            other => {
                return Err(TwikeyError::invalid_response(
                    context,
                    format!("expected an object with '{field}', got {}", json_kind(&other)),
                ))
            }
        };
        match value {
            Some(list @ Value::Array(_)) => {
                serde_json::from_value(list).map_err(|err| InfraError::json(context, err))
            }
            Some(other) => Err(TwikeyError::invalid_response(
                context,
                format!("'{field}' must be a list, got {}", json_kind(&other)),
            )),
            None => Err(TwikeyError::invalid_response(context, format!("missing '{field}' list"))),
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Authenticated transport bound to one creditor base URL.
pub struct ApiTransport {
    http: HttpClient,
    session: Arc<TokenSession>,
    base_url: String,
    user_agent: String,
}

impl ApiTransport {
    pub fn new(
        http: HttpClient,
        session: Arc<TokenSession>,
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, session, base_url, user_agent: user_agent.into() }
    }

    pub fn session(&self) -> &Arc<TokenSession> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers for an authenticated call with the given content type.
    ///
    /// Authenticates first when the session holds no valid token.
    ///
    /// # Errors
    /// Propagates the session's authentication failure.
    pub async fn headers(&self, content_type: &str) -> Result<HeaderMap> {
        let token = self.session.ensure_authenticated().await?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, header_value(content_type)?);
        headers.insert(AUTHORIZATION, header_value(&token)?);
        headers.insert(ACCEPT, HeaderValue::from_static(content_types::JSON));
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);
        Ok(headers)
    }

    /// Issue one call.
    ///
    /// # Errors
    /// - `TwikeyError::Api` when the response carries an error header
    /// - `TwikeyError::Transport` on network failure or an unexpected status
    /// - Authentication failures from the session
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn call(&self, context: &str, request: ApiRequest) -> Result<ApiResponse> {
        let mut headers = self.headers(request.content_type()).await?;
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TwikeyError::InvalidInput(format!("invalid header name '{name}': {e}"))
            })?;
            headers.insert(name, header_value(value)?);
        }

        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url).headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Bytes { data, .. } => builder.body(data),
        };

        let response = self.http.send(context, builder).await?;
        let status = response.status().as_u16();
        let response_headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| InfraError::http(context, err))?.to_vec();

        if let Some(err) = api_error(context, &response_headers, &body) {
            if status == 401 || is_session_error(err.code()) {
                warn!(code = err.code(), "session rejected by server, dropping token");
                self.session.invalidate().await;
            }
            debug!(status, code = err.code(), "API error response");
            return Err(err);
        }

        if status == 401 {
            self.session.invalidate().await;
        }

        let accepted = match request.expected {
            Some(expected) => status == expected,
            None => (200..300).contains(&status) || request.accepted.contains(&status),
        };
        if !accepted {
            debug!(status, "unexpected response status");
            return Err(unexpected_status(context, status, &body));
        }

        debug!(status, bytes = body.len(), "API call completed");
        Ok(ApiResponse { status, headers: response_headers, body })
    }
}

fn is_session_error(code: &str) -> bool {
    matches!(code, codes::INVALID_TOKEN | codes::NO_LOGIN | codes::AUTHENTICATION)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| TwikeyError::InvalidInput(format!("invalid header value: {e}")))
}

/// Percent-encode a single path segment such as an id or IBAN.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
