//! Invoice requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Invoice as returned by create, details, update and the invoice feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub remittance: Option<String>,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "duedate", default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::wire::opt_string_or_number")]
    pub ct: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
    /// Present when `lastpayment` was included.
    #[serde(rename = "lastpayment", default)]
    pub last_payment: Vec<BTreeMap<String, Value>>,
    /// Present when `meta` was included.
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
    /// Present when `customer` was included.
    #[serde(default)]
    pub customer: Option<InvoiceCustomer>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.state.as_deref() == Some("PAID")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    /// Unit of measure, e.g. `st`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(rename = "unitprice", default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(rename = "vatcode", default, skip_serializing_if = "Option::is_none")]
    pub vat_code: Option<String>,
    #[serde(rename = "vatrate", default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    #[serde(rename = "vatsum", default, skip_serializing_if = "Option::is_none")]
    pub vat_sum: Option<f64>,
}

/// Customer block used both when creating invoices and in responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "firstname", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    /// Link the invoice to the customer of an existing mandate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_by_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_by_ref: Option<String>,
}

/// Body for `POST /invoice` and `PUT /invoice/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub id: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remittance: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<u64>,
    pub amount: f64,
    pub date: String,
    #[serde(rename = "duedate")]
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<bool>,
    /// Base64 encoded PDF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<InvoiceCustomer>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub lines: Vec<InvoiceLine>,
}

impl InvoiceRequest {
    /// New request with a freshly generated invoice id.
    pub fn new(
        number: impl Into<String>,
        amount: f64,
        date: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            number: number.into(),
            amount,
            date: date.into(),
            due_date: due_date.into(),
            ..Self::default()
        }
    }
}

/// Optional headers accepted by `POST /invoice`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceCreateOptions {
    /// Sent as `X-PARTNER`.
    pub origin: Option<String>,
    /// Sent as `X-Purpose`.
    pub purpose: Option<String>,
    /// Sent as `X-MANUAL: true`.
    pub manual: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceActionType {
    Email,
    Sms,
    Reminder,
    #[serde(rename = "smsreminder")]
    SmsReminder,
    Letter,
    LetterWithInvoice,
    Invoice,
    Reoffer,
    Peppol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceActionRequest {
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(rename = "type")]
    pub action: InvoiceActionType,
}

/// Extra blocks that can be requested on invoice details and the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceInclude {
    Customer,
    Meta,
    #[serde(rename = "lastpayment")]
    LastPayment,
}

impl InvoiceInclude {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Meta => "meta",
            Self::LastPayment => "lastpayment",
        }
    }
}

/// Upload of a UBL document (`POST /invoice/ubl`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UblUploadRequest {
    pub xml_path: std::path::PathBuf,
    /// Sent as `X-MANUAL: true`.
    pub manual: bool,
    /// Sent as `X-INVOICE-ID`.
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkInvoiceRequest {
    pub invoices: Vec<InvoiceRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkInvoiceResponse {
    #[serde(rename = "batchId")]
    pub batch_id: String,
}

/// Status of one invoice in a processed bulk batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkBatchItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
