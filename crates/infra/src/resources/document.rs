//! Mandate (document) operations and the mandate feed

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use twikey_core::feed::{DocumentFeed, FeedConsumer, FeedOptions, FeedReport};
use twikey_domain::constants::{content_types, headers, DEFAULT_PDF_FILENAME};
use twikey_domain::utils::to_form_pairs;
use twikey_domain::{
    CancelMandateRequest, Contract, CustomerAccess, Document, DocumentEvent, FetchMandateRequest,
    InviteRequest, InviteResponse, Mandate, MandateActionRequest, PdfDocument, PdfUploadRequest,
    QueryMandateRequest, Result, SignRequest, SignResponse, TwikeyError, UpdateMandateRequest,
};

use super::feed::{classify_document, ListFeed};
use crate::api::transport::segment;
use crate::api::{ApiRequest, ApiTransport};
use crate::errors::InfraError;

#[derive(Deserialize)]
struct MandateDetail {
    #[serde(rename = "Mndt")]
    mandate: Mandate,
}

#[derive(Serialize)]
struct MandateNumber<'a> {
    #[serde(rename = "mndtId")]
    mandate_number: &'a str,
}

/// Mandate operations.
#[derive(Clone)]
pub struct DocumentService {
    transport: Arc<ApiTransport>,
}

impl DocumentService {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Invite a debtor to sign a new mandate.
    pub async fn create(&self, request: &InviteRequest) -> Result<InviteResponse> {
        let response =
            self.transport.call("Invite", ApiRequest::post("/invite").form_from(request)?).await?;
        response.json("Invite")
    }

    /// Create and sign a mandate in one call.
    pub async fn sign(&self, request: &SignRequest) -> Result<SignResponse> {
        let response =
            self.transport.call("Sign", ApiRequest::post("/sign").form_from(request)?).await?;
        response.json("Sign")
    }

    /// Mandate detail plus the state from the `X-STATE` header.
    pub async fn fetch(&self, request: &FetchMandateRequest) -> Result<Document> {
        let response = self
            .transport
            .call("Fetch mandate", ApiRequest::get("/mandate/detail").query_from(request)?)
            .await?;
        let state = response.header(headers::STATE).map(str::to_string);
        let detail: MandateDetail = response.json("Fetch mandate")?;
        Ok(Document { mandate: detail.mandate, state })
    }

    /// Contracts matching the given filters.
    pub async fn query(&self, request: &QueryMandateRequest) -> Result<Vec<Contract>> {
        let response = self
            .transport
            .call("Query mandates", ApiRequest::get("/mandate/query").query_from(request)?)
            .await?;
        response.list("Query mandates", "Contracts")
    }

    pub async fn action(&self, request: &MandateActionRequest) -> Result<()> {
        let form = to_form_pairs(request)?.into_iter().filter(|(key, _)| key != "mndtId").collect();
        let path = format!("/mandate/{}/action", segment(&request.mandate_number));
        self.transport.call("Mandate action", ApiRequest::post(path).form(form)).await?;
        Ok(())
    }

    pub async fn update(&self, request: &UpdateMandateRequest) -> Result<()> {
        self.transport
            .call("Update mandate", ApiRequest::post("/mandate/update").form_from(request)?)
            .await?;
        Ok(())
    }

    /// Cancel a mandate; `notify` also informs the debtor.
    #[instrument(skip(self, request), fields(mandate = %request.mandate_number))]
    pub async fn cancel(&self, request: &CancelMandateRequest) -> Result<()> {
        self.transport
            .call("Cancel mandate", ApiRequest::delete("/mandate").query_from(request)?)
            .await?;
        info!("mandate cancelled");
        Ok(())
    }

    /// Attach a signed PDF to an imported mandate.
    ///
    /// # Errors
    /// Returns `TwikeyError::Io` when the file cannot be read.
    #[instrument(skip(self, request), fields(mandate = %request.mandate_number))]
    pub async fn upload_pdf(&self, request: &PdfUploadRequest) -> Result<()> {
        let content = tokio::fs::read(&request.pdf_path).await.map_err(InfraError::from)?;
        let call = ApiRequest::post("/mandate/pdf")
            .query("mndtId", request.mandate_number.clone())
            .query("bankSignature", request.bank_signature.to_string())
            .bytes(content_types::PDF, content);
        self.transport.call("Upload pdf", call).await?;
        Ok(())
    }

    /// Download the PDF of a signed mandate.
    pub async fn retrieve_pdf(&self, mandate_number: &str) -> Result<PdfDocument> {
        let response = self
            .transport
            .call("Retrieve pdf", ApiRequest::get("/mandate/pdf").query("mndtId", mandate_number))
            .await?;
        let filename = response
            .header(headers::CONTENT_DISPOSITION)
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| DEFAULT_PDF_FILENAME.to_string());
        let content_type = response
            .header(reqwest::header::CONTENT_TYPE.as_str())
            .unwrap_or(content_types::PDF)
            .to_string();
        Ok(PdfDocument { content: response.body, filename, content_type })
    }

    /// Update customer data; `params` become query parameters.
    pub async fn update_customer<T: Serialize + ?Sized>(
        &self,
        customer_id: &str,
        params: &T,
    ) -> Result<()> {
        if customer_id.is_empty() {
            return Err(TwikeyError::InvalidInput("customer id must not be empty".into()));
        }
        let path = format!("/customer/{}", segment(customer_id));
        self.transport.call("Update customer", ApiRequest::patch(path).query_from(params)?).await?;
        Ok(())
    }

    /// One-time access link to the customer portal for a mandate.
    pub async fn customer_access(&self, mandate_number: &str) -> Result<CustomerAccess> {
        let request =
            ApiRequest::post("/customeraccess").form_from(&MandateNumber { mandate_number })?;
        let response = self.transport.call("Customer access", request).await?;
        response.json("Customer access")
    }

    /// The mandate feed as a pull source.
    pub fn feed_source(&self) -> ListFeed<DocumentEvent> {
        ListFeed::new(
            self.transport.clone(),
            "Mandate feed",
            "/mandate",
            "Messages",
            classify_document,
        )
        .with_query("include", "id")
        .with_query("include", "mandate")
        .with_query("include", "person")
    }

    /// Drain the mandate feed into `handler`.
    pub async fn feed<H: DocumentFeed + ?Sized>(
        &self,
        handler: &mut H,
        options: FeedOptions,
    ) -> Result<FeedReport> {
        FeedConsumer::drain(&self.feed_source(), handler, options).await
    }
}

/// Write `document` to `target`. A directory target receives the document
/// under its own file name, stripped of any directory components.
///
/// # Errors
/// Returns `TwikeyError::Io` when the file cannot be written.
pub async fn save_pdf(document: &PdfDocument, target: &Path) -> Result<PathBuf> {
    let is_dir = tokio::fs::metadata(target).await.is_ok_and(|meta| meta.is_dir());
    let path = if is_dir { target.join(document.file_name()) } else { target.to_path_buf() };
    tokio::fs::write(&path, &document.content).await.map_err(InfraError::from)?;
    info!(path = %path.display(), bytes = document.content.len(), "mandate pdf saved");
    Ok(path)
}

/// `attachment; filename="x.pdf"; size=12` -> `x.pdf`
fn filename_from_disposition(value: &str) -> Option<String> {
    let name = value
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("filename"))
        .map(|(_, name)| name.trim().trim_matches('"'))?;
    PdfDocument::base_name(name).map(str::to_string)
}
