//! Mandate (document) requests, responses and the mandate payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_PDF_FILENAME;

// ============================================================================
// Mandate payload (as returned by detail and feed endpoints)
// ============================================================================

/// Mandate as returned by `/mandate/detail` and the document feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mandate {
    #[serde(rename = "MndtId", default)]
    pub mandate_number: Option<String>,
    #[serde(rename = "LclInstrm", default)]
    pub local_instrument: Option<String>,
    #[serde(rename = "Ocrncs", default)]
    pub occurrences: Option<Occurrences>,
    #[serde(rename = "CdtrSchmeId", default)]
    pub creditor_scheme_id: Option<String>,
    #[serde(rename = "Dbtr", default)]
    pub debtor: Option<Debtor>,
    #[serde(rename = "DbtrAcct", default)]
    pub debtor_account: Option<String>,
    #[serde(rename = "DbtrAgt", default)]
    pub debtor_agent: Option<DebtorAgent>,
    #[serde(rename = "RfrdDoc", default)]
    pub referenced_document: Option<String>,
    #[serde(rename = "SplmtryData", default)]
    pub supplementary_data: Vec<KeyValue>,
}

impl Mandate {
    /// Supplementary data as a key/value map.
    pub fn supplementary(&self) -> BTreeMap<String, String> {
        self.supplementary_data.iter().map(|kv| (kv.key.clone(), kv.value.clone())).collect()
    }

    pub fn debtor_name(&self) -> Option<&str> {
        self.debtor.as_ref().and_then(|d| d.name.as_deref())
    }

    pub fn debtor_email(&self) -> Option<&str> {
        self.debtor.as_ref().and_then(|d| d.contact.as_ref()).and_then(|c| c.email.as_deref())
    }

    pub fn customer_number(&self) -> Option<&str> {
        self.debtor
            .as_ref()
            .and_then(|d| d.contact.as_ref())
            .and_then(|c| c.customer_number.as_deref())
    }

    pub fn bic(&self) -> Option<&str> {
        self.debtor_agent
            .as_ref()
            .and_then(|a| a.financial_institution.as_ref())
            .and_then(|f| f.bic.as_deref())
    }

    pub fn sign_date(&self) -> Option<&str> {
        self.occurrences.as_ref().and_then(|o| o.duration.as_ref()).and_then(|d| d.from.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrences {
    #[serde(rename = "SeqTp", default)]
    pub sequence_type: Option<String>,
    #[serde(rename = "Frqcy", default)]
    pub frequency: Option<String>,
    #[serde(rename = "Drtn", default)]
    pub duration: Option<DurationRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    #[serde(rename = "FrDt", default)]
    pub from: Option<String>,
    #[serde(rename = "ToDt", default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debtor {
    #[serde(rename = "Nm", default)]
    pub name: Option<String>,
    #[serde(rename = "PstlAdr", default)]
    pub postal_address: Option<PostalAddress>,
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(rename = "CtryOfRes", default)]
    pub country_of_residence: Option<String>,
    #[serde(rename = "CtctDtls", default)]
    pub contact: Option<ContactDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(rename = "AdrLine", default)]
    pub address_line: Option<String>,
    #[serde(rename = "PstCd", default)]
    pub post_code: Option<String>,
    #[serde(rename = "TwnNm", default)]
    pub town: Option<String>,
    #[serde(rename = "Ctry", default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(rename = "EmailAdr", default)]
    pub email: Option<String>,
    #[serde(rename = "MobNb", default)]
    pub mobile: Option<String>,
    #[serde(rename = "Othr", default)]
    pub customer_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtorAgent {
    #[serde(rename = "FinInstnId", default)]
    pub financial_institution: Option<FinancialInstitution>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialInstitution {
    #[serde(rename = "BICFI", default)]
    pub bic: Option<String>,
    #[serde(rename = "Nm", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

/// Amendment or cancellation reason attached to a feed event.
///
/// `Rsn` holds the reason text or code; any other fields the server sends
/// (e.g. `Orgtr`) are kept verbatim in `details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    #[serde(rename = "Rsn", default)]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

/// Mandate detail together with the state reported in the `X-STATE` header.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub mandate: Mandate,
    pub state: Option<String>,
}

// ============================================================================
// Requests
// ============================================================================

/// Invitation for a new mandate (`POST /invite`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    /// Template (contract type) id.
    pub ct: String,
    #[serde(rename = "l", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "lastname", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "firstname", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<bool>,
    /// Expiry of the invitation link (epoch seconds or date).
    #[serde(rename = "ed", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_invite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_validation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_recurrence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_stop_after: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_ref: Option<String>,
}

impl InviteRequest {
    pub fn new(ct: impl Into<String>) -> Self {
        Self { ct: ct.into(), ..Self::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "mndtId", default)]
    pub mandate_number: Option<String>,
}

/// Signing method accepted by `POST /sign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignMethod {
    #[serde(rename = "sms")]
    Sms,
    #[serde(rename = "digisign")]
    Digisign,
    #[serde(rename = "import")]
    Import,
    #[serde(rename = "itsme")]
    Itsme,
    #[serde(rename = "emachtiging")]
    Emachtiging,
    #[serde(rename = "paper")]
    Paper,
    #[serde(rename = "iDIN")]
    Idin,
}

/// Create and sign a mandate in one call (`POST /sign`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(flatten)]
    pub invite: InviteRequest,
    pub method: SignMethod,
    /// Wet signature as base64 PNG, required for `digisign`.
    #[serde(rename = "digsig", skip_serializing_if = "Option::is_none")]
    pub digital_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_signature: Option<bool>,
}

impl SignRequest {
    pub fn new(invite: InviteRequest, method: SignMethod) -> Self {
        Self {
            invite,
            method,
            digital_signature: None,
            key: None,
            sign_date: None,
            place: None,
            bank_signature: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResponse {
    #[serde(rename = "MndtId", default)]
    pub mandate_number: Option<String>,
}

/// `GET /mandate/detail` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchMandateRequest {
    #[serde(rename = "mndtId")]
    pub mandate_number: String,
    /// Also return mandates that are not yet signed or were cancelled.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub force: bool,
}

impl FetchMandateRequest {
    pub fn new(mandate_number: impl Into<String>) -> Self {
        Self { mandate_number: mandate_number.into(), force: false }
    }
}

/// `GET /mandate/query` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMandateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Defaults to `SIGNED` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// One contract returned by `/mandate/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default, deserialize_with = "crate::utils::wire::opt_string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub suspended: Option<bool>,
    #[serde(default)]
    pub pdf_available: Option<bool>,
    #[serde(default)]
    pub mandate_number: Option<String>,
    #[serde(default)]
    pub contract_number: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::wire::opt_string_or_number")]
    pub ct: Option<String>,
    #[serde(default)]
    pub sign_date: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
}

/// Action on a mandate (`POST /mandate/{mndtId}/action`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MandateActionType {
    Invite,
    Reminder,
    Access,
    AutomaticCheck,
    ManualCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandateActionRequest {
    #[serde(rename = "mndtId")]
    pub mandate_number: String,
    #[serde(rename = "type")]
    pub action: MandateActionType,
    /// Which reminder (1 to 4) to send when `action` is `Reminder`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<u8>,
}

/// Update of an existing mandate (`POST /mandate/update`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMandateRequest {
    #[serde(rename = "mndtId")]
    pub mandate_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coc: Option<String>,
    #[serde(rename = "l", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Cancellation of a mandate (`DELETE /mandate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelMandateRequest {
    #[serde(rename = "mndtId")]
    pub mandate_number: String,
    /// Free text or an R-message code.
    #[serde(rename = "rsn")]
    pub reason: String,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub notify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfUploadRequest {
    pub mandate_number: String,
    pub pdf_path: std::path::PathBuf,
    pub bank_signature: bool,
}

/// Downloaded mandate PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub content: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl PdfDocument {
    /// Last path component of `name`, or `None` when nothing usable is left.
    pub fn base_name(name: &str) -> Option<&str> {
        let base = name.rsplit(['/', '\\']).next()?.trim();
        (!base.is_empty() && base != "." && base != "..").then_some(base)
    }

    /// File name that is safe to join onto a directory.
    pub fn file_name(&self) -> &str {
        Self::base_name(&self.filename).unwrap_or(DEFAULT_PDF_FILENAME)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAccess {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
