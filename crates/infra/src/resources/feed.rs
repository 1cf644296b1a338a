//! HTTP feed source shared by every resource feed
//!
//! A feed endpoint returns a JSON object holding one list field and the
//! position of its last item in the `X-LAST` header. Items are parsed into
//! their typed form at the page boundary.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use twikey_core::feed::FeedSource;
use twikey_domain::constants::headers;
use twikey_domain::{DocumentEvent, FeedPage, Result, TwikeyError};

use crate::api::transport::json_kind;
use crate::api::{ApiRequest, ApiTransport};
use crate::errors::InfraError;

/// Parser from one raw list element into the feed's item type.
pub type ItemParser<T> = fn(&'static str, Value) -> Result<T>;

/// Feed backed by a `GET` endpoint returning `{ "<list_field>": [...] }`.
pub struct ListFeed<T> {
    transport: Arc<ApiTransport>,
    name: &'static str,
    path: &'static str,
    query: Vec<(String, String)>,
    list_field: &'static str,
    parse: ItemParser<T>,
}

impl<T> ListFeed<T> {
    pub fn new(
        transport: Arc<ApiTransport>,
        name: &'static str,
        path: &'static str,
        list_field: &'static str,
        parse: ItemParser<T>,
    ) -> Self {
        Self { transport, name, path, query: Vec::new(), list_field, parse }
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

#[async_trait]
impl<T: Send + 'static> FeedSource for ListFeed<T> {
    type Item = T;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_page(&self, resume_after: Option<&str>) -> Result<FeedPage<T>> {
        let mut request = ApiRequest::get(self.path).query_pairs(self.query.iter().cloned());
        if let Some(position) = resume_after {
            request = request.header(headers::RESUME_AFTER, position);
        }

        let response = self.transport.call(self.name, request).await?;
        let cursor = response.header(headers::LAST_POSITION).map(str::to_string);
        let raw: Vec<Value> = response.list_required(self.name, self.list_field)?;

        let items = raw
            .into_iter()
            .map(|value| (self.parse)(self.name, value))
            .collect::<Result<Vec<_>>>()?;

        debug!(feed = self.name, items = items.len(), cursor = ?cursor, "fetched feed page");
        Ok(FeedPage::new(items, cursor))
    }
}

/// Decode a list element with serde.
pub fn decode_item<T: DeserializeOwned>(context: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|err| InfraError::json(context, err))
}

/// Classify a document feed message.
pub fn classify_document(context: &'static str, value: Value) -> Result<DocumentEvent> {
    match value {
        Value::Object(raw) => DocumentEvent::classify(raw),
        other => Err(TwikeyError::invalid_response(
            context,
            format!("feed message must be an object, got {}", json_kind(&other)),
        )),
    }
}
