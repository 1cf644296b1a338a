//! Payment link operations and the paylink feed

use std::sync::Arc;

use twikey_core::feed::{FeedConsumer, FeedOptions, FeedReport, PaylinkFeed};
use twikey_domain::{
    CreatedPaylink, Paylink, PaylinkRefundRequest, PaylinkRequest, PaylinkStatusRequest, Result,
    TwikeyError,
};

use super::feed::{decode_item, ListFeed};
use crate::api::{ApiRequest, ApiTransport};

const LINKS: &str = "Links";

/// Payment link operations.
#[derive(Clone)]
pub struct PaylinkService {
    transport: Arc<ApiTransport>,
}

impl PaylinkService {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    pub async fn create(&self, request: &PaylinkRequest) -> Result<CreatedPaylink> {
        let call = ApiRequest::post("/payment/link").form_from(request)?;
        self.transport.call("Create paylink", call).await?.json("Create paylink")
    }

    /// The link selected by id or reference, if it exists.
    pub async fn status_details(&self, request: &PaylinkStatusRequest) -> Result<Option<Paylink>> {
        if request.id.is_none() && request.reference.is_none() {
            return Err(TwikeyError::InvalidInput("one of id or ref is required".into()));
        }
        let call = ApiRequest::get("/payment/link").query_pairs(request.to_query());
        self.transport.call("Paylink status", call).await?.first_of("Paylink status", LINKS)
    }

    pub async fn refund(&self, request: &PaylinkRefundRequest) -> Result<Paylink> {
        let call = ApiRequest::post("/payment/link/refund").form_from(request)?;
        self.transport.call("Refund paylink", call).await?.json("Refund paylink")
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        let call = ApiRequest::delete("/payment/link").query("id", id);
        self.transport.call("Remove paylink", call).await?;
        Ok(())
    }

    pub fn feed_source(&self) -> ListFeed<Paylink> {
        ListFeed::new(
            self.transport.clone(),
            "Paylink feed",
            "/payment/link/feed",
            LINKS,
            decode_item,
        )
    }

    pub async fn feed<H: PaylinkFeed + ?Sized>(
        &self,
        handler: &mut H,
        options: FeedOptions,
    ) -> Result<FeedReport> {
        FeedConsumer::drain(&self.feed_source(), handler, options).await
    }
}
