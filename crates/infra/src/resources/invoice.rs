//! Invoice operations, bulk uploads and the invoice feed

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};
use twikey_core::feed::{FeedConsumer, FeedOptions, FeedReport, InvoiceFeed};
use twikey_domain::constants::{content_types, headers, APP_URL, BETA_APP_URL};
use twikey_domain::{
    BulkBatchItem, BulkInvoiceRequest, BulkInvoiceResponse, Invoice, InvoiceActionRequest,
    InvoiceCreateOptions, InvoiceInclude, InvoiceRequest, Result, TwikeyError, UblUploadRequest,
};

use super::feed::{decode_item, ListFeed};
use crate::api::errors::unexpected_status;
use crate::api::transport::segment;
use crate::api::{ApiRequest, ApiTransport};
use crate::errors::InfraError;

/// Invoice operations.
#[derive(Clone)]
pub struct InvoiceService {
    transport: Arc<ApiTransport>,
    merchant_id: Option<String>,
    beta: bool,
    bulk_timeout: Duration,
}

impl InvoiceService {
    pub fn new(
        transport: Arc<ApiTransport>,
        merchant_id: Option<String>,
        beta: bool,
        bulk_timeout: Duration,
    ) -> Self {
        Self { transport, merchant_id, beta, bulk_timeout }
    }

    /// Create an invoice; `options` map onto the `X-PARTNER`, `X-Purpose`
    /// and `X-MANUAL` headers.
    #[instrument(skip_all, fields(number = %request.number))]
    pub async fn create(
        &self,
        request: &InvoiceRequest,
        options: &InvoiceCreateOptions,
    ) -> Result<Invoice> {
        let mut call = ApiRequest::post("/invoice").json(request)?;
        if let Some(origin) = &options.origin {
            call = call.header(headers::PARTNER, origin.clone());
        }
        if let Some(purpose) = &options.purpose {
            call = call.header(headers::PURPOSE, purpose.clone());
        }
        if options.manual {
            call = call.header(headers::MANUAL, "true");
        }
        let invoice: Invoice =
            self.transport.call("Create invoice", call).await?.json("Create invoice")?;
        info!(id = ?invoice.id, "invoice created");
        Ok(invoice)
    }

    /// Replace the invoice identified by `request.id`.
    pub async fn update(&self, request: &InvoiceRequest) -> Result<Invoice> {
        if request.id.is_empty() {
            return Err(TwikeyError::InvalidInput("invoice id must not be empty".into()));
        }
        let path = format!("/invoice/{}", segment(&request.id));
        let call = ApiRequest::put(path).json(request)?;
        self.transport.call("Update invoice", call).await?.json("Update invoice")
    }

    pub async fn details(&self, id: &str, includes: &[InvoiceInclude]) -> Result<Invoice> {
        let mut call = ApiRequest::get(format!("/invoice/{}", segment(id)));
        for include in includes {
            call = call.query("include", include.as_str());
        }
        self.transport.call("Invoice details", call).await?.json("Invoice details")
    }

    /// Trigger a follow-up action; the server answers `204 No Content`.
    pub async fn action(&self, request: &InvoiceActionRequest) -> Result<()> {
        let path = format!("/invoice/{}/action", segment(&request.id));
        let call = ApiRequest::post(path).form_from(request)?.expect_status(204);
        self.transport.call("Invoice action", call).await?;
        Ok(())
    }

    /// Upload a UBL document to create an invoice from it.
    ///
    /// # Errors
    /// Returns `TwikeyError::Io` when the file cannot be read.
    #[instrument(skip_all, fields(path = %request.xml_path.display()))]
    pub async fn upload_ubl(&self, request: &UblUploadRequest) -> Result<Invoice> {
        let content = tokio::fs::read(&request.xml_path).await.map_err(InfraError::from)?;
        let mut call = ApiRequest::post("/invoice/ubl")
            .bytes(content_types::XML, content)
            .expect_status(200);
        if request.manual {
            call = call.header(headers::MANUAL, "true");
        }
        if let Some(id) = &request.invoice_id {
            call = call.header(headers::INVOICE_ID, id.clone());
        }
        self.transport.call("Upload UBL", call).await?.json("Upload UBL")
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/invoice/{}", segment(id));
        self.transport.call("Delete invoice", ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Submit invoices for asynchronous creation.
    #[instrument(skip_all, fields(count = request.invoices.len()))]
    pub async fn bulk_create(&self, request: &BulkInvoiceRequest) -> Result<BulkInvoiceResponse> {
        let call = ApiRequest::post("/invoice/bulk")
            .json(request)?
            .timeout(self.bulk_timeout)
            .expect_status(200);
        let batch: BulkInvoiceResponse =
            self.transport.call("Bulk create invoices", call).await?.json("Bulk create invoices")?;
        info!(batch_id = %batch.batch_id, "bulk batch submitted");
        Ok(batch)
    }

    /// Result of a bulk batch, or `None` while it is still processing.
    pub async fn bulk_details(&self, batch_id: &str) -> Result<Option<Vec<BulkBatchItem>>> {
        let call = ApiRequest::get("/invoice/bulk").query("batchId", batch_id).accept_status(409);
        let response = self.transport.call("Bulk batch details", call).await?;
        if response.status == 409 {
            debug!(batch_id, "bulk batch still processing");
            return Ok(None);
        }
        if response.status != 200 {
            return Err(unexpected_status("Bulk batch details", response.status, &response.body));
        }
        response.json("Bulk batch details").map(Some)
    }

    /// Customer-facing URL of an invoice.
    ///
    /// # Errors
    /// Returns `TwikeyError::Config` when no merchant id is configured.
    pub fn invoice_url(&self, id: &str) -> Result<String> {
        let merchant = self.merchant_id.as_deref().ok_or_else(|| {
            TwikeyError::Config("merchant_id is required to build invoice URLs".into())
        })?;
        let app = if self.beta { BETA_APP_URL } else { APP_URL };
        Ok(format!("{app}/{merchant}/{id}"))
    }

    /// The invoice feed as a pull source; `customer` is always included.
    pub fn feed_source(&self, includes: &[InvoiceInclude]) -> ListFeed<Invoice> {
        let mut source = ListFeed::new(
            self.transport.clone(),
            "Invoice feed",
            "/invoice",
            "Invoices",
            decode_item,
        )
        .with_query("include", InvoiceInclude::Customer.as_str());
        for include in includes.iter().filter(|i| **i != InvoiceInclude::Customer) {
            source = source.with_query("include", include.as_str());
        }
        source
    }

    pub async fn feed<H: InvoiceFeed + ?Sized>(
        &self,
        handler: &mut H,
        includes: &[InvoiceInclude],
        options: FeedOptions,
    ) -> Result<FeedReport> {
        FeedConsumer::drain(&self.feed_source(includes), handler, options).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::{mount_auth, transport_for};

    async fn service(server: &MockServer, merchant: Option<&str>) -> InvoiceService {
        mount_auth(server, "tok").await;
        InvoiceService::new(
            Arc::new(transport_for(server)),
            merchant.map(str::to_string),
            false,
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn create_sends_optional_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/creditor/invoice"))
            .and(header("X-PARTNER", "shop"))
            .and(header("X-MANUAL", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "abc", "state": "BOOKED"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = InvoiceRequest::new("INV-1", 10.0, "2024-01-01", "2024-01-31");
        let options =
            InvoiceCreateOptions { origin: Some("shop".into()), purpose: None, manual: true };
        let invoice = service(&server, None).await.create(&request, &options).await.unwrap();
        assert_eq!(invoice.state.as_deref(), Some("BOOKED"));
    }

    #[tokio::test]
    async fn bulk_details_is_none_while_processing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/creditor/invoice/bulk"))
            .and(query_param("batchId", "b1"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/creditor/invoice/bulk"))
            .and(query_param("batchId", "b2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": "i1", "status": "OK"}])),
            )
            .mount(&server)
            .await;

        let invoices = service(&server, None).await;
        assert_eq!(invoices.bulk_details("b1").await.unwrap(), None);
        let done = invoices.bulk_details("b2").await.unwrap().unwrap();
        assert_eq!(done[0].status.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn action_without_no_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/creditor/invoice/abc/action"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let request = InvoiceActionRequest {
            id: "abc".into(),
            action: twikey_domain::InvoiceActionType::Email,
        };
        let err = service(&server, None).await.action(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn invoice_url_needs_merchant() {
        let server = MockServer::start().await;
        let without = service(&server, None).await;
        assert!(matches!(without.invoice_url("abc"), Err(TwikeyError::Config(_))));

        let with = service(&server, Some("1234")).await;
        assert_eq!(with.invoice_url("abc").unwrap(), "https://app.twikey.com/1234/abc");
    }

    #[tokio::test]
    async fn update_requires_id() {
        let server = MockServer::start().await;
        let mut request = InvoiceRequest::new("INV-1", 10.0, "2024-01-01", "2024-01-31");
        request.id.clear();
        let err = service(&server, None).await.update(&request).await.unwrap_err();
        assert!(matches!(err, TwikeyError::InvalidInput(_)));
    }
}
