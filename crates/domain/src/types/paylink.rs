//! Payment link requests and responses.

use serde::{Deserialize, Serialize};

use crate::utils::wire::opt_string_or_number;

/// `POST /payment/link`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaylinkRequest {
    pub title: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "lastname", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "firstname", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coc: Option<String>,
    #[serde(rename = "l", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remittance: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_invite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "txref", skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Invoice number this link pays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
}

impl PaylinkRequest {
    pub fn new(title: impl Into<String>, amount: f64) -> Self {
        Self { title: title.into(), amount, ..Self::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedPaylink {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(rename = "msg", default)]
    pub message: Option<String>,
}

/// `GET /payment/link`; select by `id` or `reference`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaylinkStatusRequest {
    pub id: Option<String>,
    pub reference: Option<String>,
    pub include_meta: bool,
    pub include_refunds: bool,
}

impl PaylinkStatusRequest {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    /// Query pairs, with repeated `include` keys.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(id) = &self.id {
            query.push(("id".to_string(), id.clone()));
        }
        if let Some(reference) = &self.reference {
            query.push(("ref".to_string(), reference.clone()));
        }
        if self.include_meta {
            query.push(("include".to_string(), "meta".to_string()));
        }
        if self.include_refunds {
            query.push(("include".to_string(), "refunds".to_string()));
        }
        query
    }
}

/// `POST /payment/link/refund`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaylinkRefundRequest {
    pub id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
}

/// A payment link as returned by status and the paylink feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paylink {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub ct: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(rename = "msg", default)]
    pub message: Option<String>,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub customer: Option<PaylinkCustomer>,
    #[serde(default)]
    pub meta: Option<PaylinkMeta>,
    #[serde(default)]
    pub time: Option<PaylinkTimes>,
}

impl Paylink {
    pub fn is_paid(&self) -> bool {
        self.state.as_deref() == Some("paid")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaylinkCustomer {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "firstname", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastname", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "customerNumber", default)]
    pub customer_number: Option<String>,
    #[serde(rename = "l", default)]
    pub language: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaylinkMeta {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub sdd: Option<serde_json::Value>,
    #[serde(default)]
    pub tx: Option<serde_json::Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub invoice: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaylinkTimes {
    #[serde(default)]
    pub creation: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(rename = "lastupdate", default)]
    pub last_update: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_query_repeats_include() {
        let request = PaylinkStatusRequest {
            id: Some("42".into()),
            reference: None,
            include_meta: true,
            include_refunds: true,
        };
        assert_eq!(
            request.to_query(),
            vec![
                ("id".to_string(), "42".to_string()),
                ("include".to_string(), "meta".to_string()),
                ("include".to_string(), "refunds".to_string()),
            ]
        );
    }

    #[test]
    fn paylink_parses_nested_blocks() {
        let link: Paylink = serde_json::from_value(serde_json::json!({
            "id": 1_398_754,
            "amount": 55.66,
            "msg": "Test",
            "ref": "ref-1",
            "state": "paid",
            "customer": {"customerNumber": "C1", "l": "nl"},
            "meta": {"active": false, "method": "bancontact"},
            "time": {"creation": "2024-01-01T10:00:00Z", "lastupdate": "2024-01-02T10:00:00Z"}
        }))
        .unwrap();

        assert_eq!(link.id.as_deref(), Some("1398754"));
        assert!(link.is_paid());
        assert_eq!(link.customer.and_then(|c| c.language).as_deref(), Some("nl"));
        assert_eq!(link.meta.and_then(|m| m.method).as_deref(), Some("bancontact"));
        assert_eq!(
            link.time.and_then(|t| t.last_update).as_deref(),
            Some("2024-01-02T10:00:00Z")
        );
    }
}
