//! Credit transfers (refunds), beneficiary accounts and the refund feed

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use twikey_core::feed::{FeedConsumer, FeedOptions, FeedReport, RefundFeed};
use twikey_domain::{
    Beneficiary, CreditTransferBatch, DisableBeneficiaryRequest, NewBeneficiaryRequest,
    NewRefundBatchRequest, NewRefundRequest, Refund, RefundBatchStatusRequest, Result,
};

use super::feed::{decode_item, ListFeed};
use crate::api::transport::segment;
use crate::api::{ApiRequest, ApiTransport};

const ENTRIES: &str = "Entries";
const CREDIT_TRANSFERS: &str = "CreditTransfers";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BeneficiaryQuery {
    with_address: bool,
}

/// Credit transfer operations.
#[derive(Clone)]
pub struct RefundService {
    transport: Arc<ApiTransport>,
}

impl RefundService {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Register a beneficiary account; returns the server's JSON as is.
    pub async fn create_beneficiary_account(
        &self,
        request: &NewBeneficiaryRequest,
    ) -> Result<Value> {
        let call = ApiRequest::post("/transfers/beneficiaries").form_from(request)?;
        self.transport.call("Create beneficiary", call).await?.json_value("Create beneficiary")
    }

    pub async fn create(&self, request: &NewRefundRequest) -> Result<Option<Refund>> {
        let call = ApiRequest::post("/transfer").form_from(request)?;
        self.transport.call("Create transfer", call).await?.first_of("Create transfer", ENTRIES)
    }

    pub async fn details(&self, id: &str) -> Result<Option<Refund>> {
        let call = ApiRequest::get("/transfer/detail").query("id", id);
        self.transport.call("Transfer detail", call).await?.first_of("Transfer detail", ENTRIES)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        let call = ApiRequest::delete("/transfer").query("id", id);
        self.transport.call("Remove transfer", call).await?;
        Ok(())
    }

    /// Bundle the pending transfers of a template into one batch.
    pub async fn create_batch(
        &self,
        request: &NewRefundBatchRequest,
    ) -> Result<Option<CreditTransferBatch>> {
        let call = ApiRequest::post("/transfer/complete").form_from(request)?;
        self.transport
            .call("Create transfer batch", call)
            .await?
            .first_of("Create transfer batch", CREDIT_TRANSFERS)
    }

    pub async fn batch_detail(
        &self,
        request: &RefundBatchStatusRequest,
    ) -> Result<Option<CreditTransferBatch>> {
        let call = ApiRequest::get("/transfer/complete").query_from(request)?;
        self.transport
            .call("Transfer batch detail", call)
            .await?
            .first_of("Transfer batch detail", CREDIT_TRANSFERS)
    }

    pub async fn beneficiary_accounts(&self, with_address: bool) -> Result<Vec<Beneficiary>> {
        let call = ApiRequest::get("/transfers/beneficiaries")
            .query_from(&BeneficiaryQuery { with_address })?;
        self.transport.call("Beneficiaries", call).await?.list("Beneficiaries", "beneficiaries")
    }

    pub async fn disable_beneficiary(&self, request: &DisableBeneficiaryRequest) -> Result<()> {
        let mut call =
            ApiRequest::delete(format!("/transfers/beneficiaries/{}", segment(&request.iban)));
        if let Some(customer_number) = &request.customer_number {
            call = call.query("customerNumber", customer_number.clone());
        }
        self.transport.call("Disable beneficiary", call).await?;
        Ok(())
    }

    pub fn feed_source(&self) -> ListFeed<Refund> {
        ListFeed::new(self.transport.clone(), "Refund feed", "/transfer", ENTRIES, decode_item)
    }

    pub async fn feed<H: RefundFeed + ?Sized>(
        &self,
        handler: &mut H,
        options: FeedOptions,
    ) -> Result<FeedReport> {
        FeedConsumer::drain(&self.feed_source(), handler, options).await
    }
}
