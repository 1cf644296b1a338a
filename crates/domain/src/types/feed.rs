//! Feed pages, per-item control flow and document feed events.
//!
//! Feed items are parsed into typed events once, at the page boundary, so the
//! generic drain loop never looks at resource-specific field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::{Mandate, Reason};
use crate::errors::{Result, TwikeyError};

/// One page of a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Resumption cursor from the `X-LAST` response header.
    pub cursor: Option<String>,
}

impl<T> FeedPage<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new(), cursor: None }
    }

    /// An empty page marks the end of the currently available feed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Returned by feed callbacks to continue or halt a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedControl {
    #[default]
    Continue,
    /// Skip the rest of the page and stop fetching further pages.
    Stop,
}

impl FeedControl {
    /// `Stop` when `condition` holds.
    pub fn stop_if(condition: bool) -> Self {
        if condition {
            Self::Stop
        } else {
            Self::Continue
        }
    }

    pub fn is_stop(self) -> bool {
        self == Self::Stop
    }
}

impl From<bool> for FeedControl {
    /// `true` requests a stop.
    fn from(stop: bool) -> Self {
        Self::stop_if(stop)
    }
}

impl From<()> for FeedControl {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

/// Marker fields that decide how a document feed message is classified.
mod markers {
    pub const AMENDMENT_REASON: &str = "AmdmntRsn";
    pub const CANCEL_REASON: &str = "CxlRsn";
    pub const ORIGINAL_MANDATE: &str = "OrgnlMndtId";
    pub const MANDATE: &str = "Mndt";
    pub const EVENT_TIME: &str = "EvtTime";
}

/// A classified document feed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentEvent {
    Created {
        mandate: Mandate,
        at: String,
    },
    Updated {
        /// Mandate number before the amendment.
        original_mandate_number: String,
        mandate: Mandate,
        reason: Reason,
        at: String,
    },
    Cancelled {
        mandate_number: String,
        reason: Reason,
        at: String,
    },
}

impl DocumentEvent {
    /// Classify a raw feed message by marker presence.
    ///
    /// An amendment reason wins over a cancel reason; a message with neither
    /// is a newly created mandate.
    ///
    /// # Errors
    /// Returns `TwikeyError::InvalidResponse` when `EvtTime` or a field the
    /// chosen variant needs is missing or malformed.
    pub fn classify(raw: Map<String, Value>) -> Result<Self> {
        let mut raw = raw;
        let at = require_string(&mut raw, markers::EVENT_TIME)?;

        if raw.contains_key(markers::AMENDMENT_REASON) {
            let reason = take_reason(&mut raw, markers::AMENDMENT_REASON)?;
            let original_mandate_number = require_string(&mut raw, markers::ORIGINAL_MANDATE)?;
            let mandate = take_mandate(&mut raw)?;
            return Ok(Self::Updated { original_mandate_number, mandate, reason, at });
        }

        if raw.contains_key(markers::CANCEL_REASON) {
            let reason = take_reason(&mut raw, markers::CANCEL_REASON)?;
            let mandate_number = require_string(&mut raw, markers::ORIGINAL_MANDATE)?;
            return Ok(Self::Cancelled { mandate_number, reason, at });
        }

        let mandate = take_mandate(&mut raw)?;
        Ok(Self::Created { mandate, at })
    }

    /// Raw event time as sent by the server (ISO 8601).
    pub fn at(&self) -> &str {
        match self {
            Self::Created { at, .. } | Self::Updated { at, .. } | Self::Cancelled { at, .. } => at,
        }
    }

    /// Event time parsed as RFC 3339, if it is well formed.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.at()).ok().map(|t| t.with_timezone(&Utc))
    }
}

const CONTEXT: &str = "Mandate feed";

fn take_string(raw: &mut Map<String, Value>, key: &str) -> Option<String> {
    match raw.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn require_string(raw: &mut Map<String, Value>, key: &str) -> Result<String> {
    take_string(raw, key).ok_or_else(|| {
        TwikeyError::invalid_response(CONTEXT, format!("message without '{key}'"))
    })
}

fn take_reason(raw: &mut Map<String, Value>, key: &str) -> Result<Reason> {
    match raw.remove(key) {
        None | Some(Value::Null) => Ok(Reason::default()),
        Some(Value::String(text)) => Ok(Reason { reason: Some(text), ..Reason::default() }),
        Some(value) => serde_json::from_value(value).map_err(|e| {
            TwikeyError::invalid_response(CONTEXT, format!("malformed '{key}': {e}"))
        }),
    }
}

fn take_mandate(raw: &mut Map<String, Value>) -> Result<Mandate> {
    let value = raw.remove(markers::MANDATE).ok_or_else(|| {
        TwikeyError::invalid_response(CONTEXT, format!("message without '{}'", markers::MANDATE))
    })?;
    serde_json::from_value(value).map_err(|e| {
        TwikeyError::invalid_response(CONTEXT, format!("malformed '{}': {e}", markers::MANDATE))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn message_without_markers_is_created() {
        let event = DocumentEvent::classify(object(json!({
            "Mndt": {"MndtId": "A1"},
            "EvtTime": "2024-03-01T10:00:00Z"
        })))
        .unwrap();

        match &event {
            DocumentEvent::Created { mandate, at } => {
                assert_eq!(mandate.mandate_number.as_deref(), Some("A1"));
                assert_eq!(at, "2024-03-01T10:00:00Z");
            }
            other => panic!("expected Created, got {other:?}"),
        }
        assert!(event.occurred_at().is_some());
    }

    #[test]
    fn amendment_reason_yields_updated_with_verbatim_fields() {
        let event = DocumentEvent::classify(object(json!({
            "OrgnlMndtId": "OLD-1",
            "Mndt": {"MndtId": "NEW-1"},
            "AmdmntRsn": {"Rsn": "_T50", "Orgtr": {"Nm": "debtor"}},
            "EvtTime": "2024-03-02T10:00:00Z"
        })))
        .unwrap();

        match event {
            DocumentEvent::Updated { original_mandate_number, mandate, reason, at } => {
                assert_eq!(original_mandate_number, "OLD-1");
                assert_eq!(mandate.mandate_number.as_deref(), Some("NEW-1"));
                assert_eq!(reason.reason.as_deref(), Some("_T50"));
                assert!(reason.details.contains_key("Orgtr"));
                assert_eq!(at, "2024-03-02T10:00:00Z");
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn cancel_reason_yields_cancelled() {
        let event = DocumentEvent::classify(object(json!({
            "OrgnlMndtId": "M-9",
            "CxlRsn": {"Rsn": "MS02"},
            "EvtTime": "2024-03-03T10:00:00Z"
        })))
        .unwrap();

        assert_eq!(
            event,
            DocumentEvent::Cancelled {
                mandate_number: "M-9".into(),
                reason: Reason { reason: Some("MS02".into()), ..Reason::default() },
                at: "2024-03-03T10:00:00Z".into(),
            }
        );
    }

    #[test]
    fn amendment_marker_takes_precedence_over_cancel_marker() {
        let event = DocumentEvent::classify(object(json!({
            "OrgnlMndtId": "M-1",
            "Mndt": {"MndtId": "M-1"},
            "AmdmntRsn": {"Rsn": "upd"},
            "CxlRsn": {"Rsn": "cxl"},
            "EvtTime": "t"
        })))
        .unwrap();
        assert!(matches!(event, DocumentEvent::Updated { .. }));
    }

    #[test]
    fn marker_presence_counts_even_when_null() {
        let event = DocumentEvent::classify(object(json!({
            "OrgnlMndtId": "M-2",
            "CxlRsn": null,
            "EvtTime": "t"
        })))
        .unwrap();
        assert!(matches!(event, DocumentEvent::Cancelled { .. }));
    }

    #[test]
    fn created_without_mandate_is_invalid_response() {
        let err = DocumentEvent::classify(object(json!({"EvtTime": "t"}))).unwrap_err();
        assert!(matches!(err, TwikeyError::InvalidResponse { .. }));
    }

    #[test]
    fn message_without_event_time_is_invalid_response() {
        let err = DocumentEvent::classify(object(json!({"Mndt": {"MndtId": "A1"}}))).unwrap_err();
        assert!(matches!(
            err,
            TwikeyError::InvalidResponse { ref message, .. } if message.contains("EvtTime")
        ));
    }

    #[test]
    fn feed_control_from_bool() {
        assert_eq!(FeedControl::from(true), FeedControl::Stop);
        assert_eq!(FeedControl::from(false), FeedControl::Continue);
        assert_eq!(FeedControl::from(()), FeedControl::Continue);
        assert!(FeedControl::stop_if(true).is_stop());
    }
}
