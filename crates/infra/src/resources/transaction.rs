//! Transaction (collection) operations and the transaction feed

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};
use twikey_core::feed::{FeedConsumer, FeedOptions, FeedReport, TransactionFeed};
use twikey_domain::constants::content_types;
use twikey_domain::{
    CollectionBatch, NewTransactionRequest, RemoveTransactionRequest, Result, Transaction,
    TransactionActionRequest, TransactionQueryRequest, TransactionRefund,
    TransactionRefundRequest, TransactionStatusRequest, TwikeyError, UpdateTransactionRequest,
};

use super::feed::{decode_item, ListFeed};
use crate::api::{ApiRequest, ApiTransport};
use crate::errors::InfraError;

const ENTRIES: &str = "Entries";

#[derive(Serialize)]
struct CollectRequest<'a> {
    ct: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    colltndt: Option<&'a str>,
}

/// Transaction operations.
#[derive(Clone)]
pub struct TransactionService {
    transport: Arc<ApiTransport>,
    long_timeout: Duration,
}

impl TransactionService {
    pub fn new(transport: Arc<ApiTransport>, long_timeout: Duration) -> Self {
        Self { transport, long_timeout }
    }

    /// Add a transaction to a mandate; returns the created entry.
    pub async fn create(&self, request: &NewTransactionRequest) -> Result<Transaction> {
        let response = self
            .transport
            .call("Create transaction", ApiRequest::post("/transaction").form_from(request)?)
            .await?;
        response.first_of("Create transaction", ENTRIES)?.ok_or_else(|| {
            TwikeyError::invalid_response("Create transaction", "no entry in response")
        })
    }

    /// # Errors
    /// Returns `TwikeyError::InvalidInput` unless an id, reference or mandate
    /// number selects the transactions.
    pub async fn status_details(
        &self,
        request: &TransactionStatusRequest,
    ) -> Result<Vec<Transaction>> {
        if !request.has_selector() {
            return Err(TwikeyError::InvalidInput("one of id, ref or mndtId is required".into()));
        }
        let call = ApiRequest::get("/transaction/detail").query_from(request)?;
        self.transport.call("Transaction status", call).await?.list("Transaction status", ENTRIES)
    }

    /// Transactions with an id greater than `from_id`.
    pub async fn query(&self, request: &TransactionQueryRequest) -> Result<Vec<Transaction>> {
        let call = ApiRequest::get("/transaction/query").query_from(request)?;
        self.transport.call("Query transactions", call).await?.list("Query transactions", ENTRIES)
    }

    pub async fn action(&self, request: &TransactionActionRequest) -> Result<()> {
        let call = ApiRequest::post("/transaction/action").form_from(request)?;
        self.transport.call("Transaction action", call).await?;
        Ok(())
    }

    pub async fn update(&self, request: &UpdateTransactionRequest) -> Result<()> {
        let call = ApiRequest::put("/transaction").form_from(request)?;
        self.transport.call("Update transaction", call).await?;
        Ok(())
    }

    /// Refund (part of) a paid transaction.
    pub async fn refund(&self, request: &TransactionRefundRequest) -> Result<TransactionRefund> {
        let call = ApiRequest::post("/transaction/refund").form_from(request)?;
        let response = self.transport.call("Refund transaction", call).await?;
        response.first_of("Refund transaction", ENTRIES)?.ok_or_else(|| {
            TwikeyError::invalid_response("Refund transaction", "no entry in response")
        })
    }

    pub async fn remove(&self, request: &RemoveTransactionRequest) -> Result<()> {
        if request.id.is_none() && request.reference.is_none() {
            return Err(TwikeyError::InvalidInput("one of id or ref is required".into()));
        }
        let call = ApiRequest::delete("/transaction").query_from(request)?;
        self.transport.call("Remove transaction", call).await?;
        Ok(())
    }

    /// Send the pending transactions of template `ct` to the bank.
    #[instrument(skip(self))]
    pub async fn batch_send(
        &self,
        ct: &str,
        collection_date: Option<&str>,
    ) -> Result<CollectionBatch> {
        let body = CollectRequest { ct, colltndt: collection_date };
        let call = ApiRequest::post("/collect").form_from(&body)?.timeout(self.long_timeout);
        let batch: CollectionBatch =
            self.transport.call("Send batch", call).await?.json("Send batch")?;
        info!(batch_id = ?batch.id, "collection batch sent");
        Ok(batch)
    }

    /// Import a pain.008 file for template `ct`.
    ///
    /// # Errors
    /// Returns `TwikeyError::Io` when the file cannot be read.
    #[instrument(skip(self, pain008), fields(path = %pain008.display()))]
    pub async fn batch_import(&self, ct: &str, pain008: &Path) -> Result<Value> {
        let content = tokio::fs::read(pain008).await.map_err(InfraError::from)?;
        let call = ApiRequest::post("/collect/import")
            .query("ct", ct)
            .bytes(content_types::XML, content)
            .timeout(self.long_timeout);
        self.transport.call("Import batch", call).await?.json_value("Import batch")
    }

    /// Upload a bank statement (CODA, CAMT or MT940).
    pub async fn reporting_import(&self, content: Vec<u8>) -> Result<()> {
        let call = ApiRequest::post("/reporting")
            .bytes(content_types::FORM, content)
            .timeout(self.long_timeout);
        self.transport.call("Import reporting", call).await?;
        Ok(())
    }

    pub fn feed_source(&self) -> ListFeed<Transaction> {
        ListFeed::new(
            self.transport.clone(),
            "Transaction feed",
            "/transaction",
            ENTRIES,
            decode_item,
        )
    }

    pub async fn feed<H: TransactionFeed + ?Sized>(
        &self,
        handler: &mut H,
        options: FeedOptions,
    ) -> Result<FeedReport> {
        FeedConsumer::drain(&self.feed_source(), handler, options).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::{mount_auth, transport_for};

    async fn service(server: &MockServer) -> TransactionService {
        mount_auth(server, "tok").await;
        TransactionService::new(Arc::new(transport_for(server)), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn create_returns_first_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/creditor/transaction"))
            .and(body_string_contains("mndtId=M1"))
            .and(body_string_contains("amount=12.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Entries": [{"id": 381563, "state": "OPEN", "amount": 12.5}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = NewTransactionRequest::new("M1", "Monthly", 12.5);
        let created = service(&server).await.create(&request).await.unwrap();
        assert_eq!(created.id.as_deref(), Some("381563"));
    }

    #[tokio::test]
    async fn status_details_requires_selector() {
        let server = MockServer::start().await;
        let err = service(&server)
            .await
            .status_details(&TransactionStatusRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TwikeyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn remove_sends_id_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/creditor/transaction"))
            .and(query_param("id", "42"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let request = RemoveTransactionRequest { id: Some("42".into()), reference: None };
        service(&server).await.remove(&request).await.unwrap();
    }

    #[tokio::test]
    async fn batch_send_posts_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/creditor/collect"))
            .and(body_string_contains("ct=1234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let batch = service(&server).await.batch_send("1234", None).await.unwrap();
        assert_eq!(batch.id.as_deref(), Some("7"));
    }
}
