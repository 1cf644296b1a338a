//! Credit transfer (refund) requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::wire::opt_string_or_number;

/// Outbound credit transfer, as returned by create, detail and the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(rename = "msg", default)]
    pub message: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    /// Date the transfer was requested.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Date the transfer was executed by the bank.
    #[serde(rename = "bkdate", default)]
    pub bank_date: Option<String>,
}

impl Refund {
    pub fn is_paid(&self) -> bool {
        self.state.as_deref() == Some("PAID")
    }
}

/// `POST /transfer`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRefundRequest {
    pub customer_number: String,
    pub iban: String,
    pub message: String,
    pub amount: f64,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

/// `POST /transfer/complete`: bundle pending transfers of a template into a
/// batch paid from `iban`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRefundBatchRequest {
    pub ct: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
}

/// `GET /transfer/complete`; select by `id` or `payment_info_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundBatchStatusRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "pmtinfid", skip_serializing_if = "Option::is_none")]
    pub payment_info_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditTransferBatch {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "pmtinfid", default)]
    pub payment_info_id: Option<String>,
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default)]
    pub entries: Option<Value>,
}

/// `POST /transfers/beneficiaries`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBeneficiaryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "l", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(rename = "vatno", skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    pub iban: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl BeneficiaryAddress {
    /// Single line rendering: `country zip city street`.
    pub fn one_line(&self) -> String {
        [&self.country, &self.zip, &self.city, &self.street]
            .iter()
            .filter_map(|part| part.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub address: Option<BeneficiaryAddress>,
}

/// `DELETE /transfers/beneficiaries/{iban}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisableBeneficiaryRequest {
    pub iban: String,
    pub customer_number: Option<String>,
}
