//! Transaction (collection) requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::wire::opt_string_or_number;

/// A collection transaction as returned by create, detail and the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "mndtId", default)]
    pub mandate_number: Option<String>,
    #[serde(rename = "msg", default)]
    pub message: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(rename = "reqcolldt", default)]
    pub requested_collection_date: Option<String>,
    #[serde(rename = "admincharge", default)]
    pub admin_charge: Option<f64>,
    #[serde(rename = "final", default)]
    pub is_final: Option<bool>,
    #[serde(rename = "bkerror", default)]
    pub bank_error: Option<String>,
    #[serde(rename = "bkmsg", default)]
    pub bank_message: Option<String>,
    #[serde(rename = "bkdate", default)]
    pub bank_date: Option<String>,
    #[serde(rename = "lastupdate", default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub collection: Option<Value>,
    #[serde(default)]
    pub link: Option<Value>,
}

impl Transaction {
    /// Whether the transaction was paid. The state can still change later.
    pub fn is_paid(&self) -> bool {
        self.state.as_deref() == Some("PAID")
    }

    pub fn is_error(&self) -> bool {
        self.state.as_deref() == Some("ERROR")
    }
}

/// `POST /transaction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTransactionRequest {
    #[serde(rename = "mndtId")]
    pub mandate_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "reqcolldt", skip_serializing_if = "Option::is_none")]
    pub requested_collection_date: Option<String>,
    pub message: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    /// Use the reference as end-to-end id.
    #[serde(rename = "refase2e", skip_serializing_if = "Option::is_none")]
    pub reference_as_e2e: Option<bool>,
}

impl NewTransactionRequest {
    pub fn new(mandate_number: impl Into<String>, message: impl Into<String>, amount: f64) -> Self {
        Self {
            mandate_number: mandate_number.into(),
            message: message.into(),
            amount,
            ..Self::default()
        }
    }
}

/// `GET /transaction/detail`; at least one of `id`, `reference` or
/// `mandate_number` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatusRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "mndtId", skip_serializing_if = "Option::is_none")]
    pub mandate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub include: Vec<String>,
}

impl TransactionStatusRequest {
    pub fn has_selector(&self) -> bool {
        self.id.is_some() || self.reference.is_some() || self.mandate_number.is_some()
    }
}

/// `GET /transaction/query`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQueryRequest {
    #[serde(rename = "fromId")]
    pub from_id: u64,
    #[serde(rename = "mndtId", skip_serializing_if = "Option::is_none")]
    pub mandate_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionAction {
    Paid,
    Reoffer,
    Backtobank,
    Archive,
}

/// `POST /transaction/action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionActionRequest {
    pub id: String,
    pub action: TransactionAction,
}

/// `PUT /transaction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub id: String,
    #[serde(rename = "reqcolldt", skip_serializing_if = "Option::is_none")]
    pub requested_collection_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

/// `POST /transaction/refund`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRefundRequest {
    pub id: String,
    pub message: String,
    pub amount: f64,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRefund {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(alias = "msg", default)]
    pub message: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// `DELETE /transaction`; one of `id` or `reference` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveTransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Result of `POST /collect`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionBatch {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "pmtInfId", default)]
    pub payment_info_id: Option<String>,
    #[serde(default)]
    pub progress: Option<Value>,
}
