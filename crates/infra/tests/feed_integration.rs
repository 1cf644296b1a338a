//! Feed drains through the client against a mock creditor API
//!
//! **Coverage:**
//! - Document feed classification and the start hook
//! - Resume cursor sent on the first fetch only
//! - Cooperative stop, page budget and external cancellation
//! - Invoice, paylink and refund feeds use their own list fields

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use twikey_core::feed::{
    DocumentFeed, FeedOptions, FeedOutcome, InvoiceFeed, PaylinkFeed, RefundFeed,
    TransactionFeed,
};
use twikey_domain::{
    FeedControl, Invoice, InvoiceInclude, Mandate, Paylink, Reason, Refund, Transaction,
    TwikeyError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    starts: Vec<(Option<String>, usize)>,
    events: Vec<String>,
    stop_after: Option<usize>,
}

impl Recorder {
    fn record(&mut self, event: String) -> FeedControl {
        self.events.push(event);
        FeedControl::stop_if(self.stop_after == Some(self.events.len()))
    }
}

impl DocumentFeed for Recorder {
    fn start(&mut self, cursor: Option<&str>, count: usize) {
        self.starts.push((cursor.map(str::to_string), count));
    }

    fn new_document(&mut self, mandate: Mandate, _at: String) -> FeedControl {
        self.record(format!("new:{}", mandate.mandate_number.unwrap_or_default()))
    }

    fn updated_document(
        &mut self,
        original_mandate_number: String,
        _mandate: Mandate,
        reason: Reason,
        _at: String,
    ) -> FeedControl {
        self.record(format!(
            "updated:{original_mandate_number}:{}",
            reason.reason.unwrap_or_default()
        ))
    }

    fn cancelled_document(
        &mut self,
        mandate_number: String,
        reason: Reason,
        _at: String,
    ) -> FeedControl {
        self.record(format!("cancelled:{mandate_number}:{}", reason.reason.unwrap_or_default()))
    }
}

impl TransactionFeed for Recorder {
    fn start(&mut self, cursor: Option<&str>, count: usize) {
        self.starts.push((cursor.map(str::to_string), count));
    }

    fn transaction(&mut self, transaction: Transaction) -> FeedControl {
        self.record(format!("tx:{}", transaction.id.unwrap_or_default()))
    }
}

impl InvoiceFeed for Recorder {
    fn invoice(&mut self, invoice: Invoice) -> FeedControl {
        self.record(format!("invoice:{}", invoice.number.unwrap_or_default()))
    }
}

impl PaylinkFeed for Recorder {
    fn paylink(&mut self, link: Paylink) -> FeedControl {
        self.record(format!("link:{}", link.id.unwrap_or_default()))
    }
}

impl RefundFeed for Recorder {
    fn refund(&mut self, refund: Refund) -> FeedControl {
        self.record(format!("refund:{}", refund.id.unwrap_or_default()))
    }
}

async fn mount_pages(
    server: &MockServer,
    feed_path: &str,
    field: &str,
    pages: Vec<serde_json::Value>,
) {
    let count = pages.len();
    for (index, items) in pages.into_iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/creditor{feed_path}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-LAST", (index + 1).to_string())
                    .set_body_json(json!({ field: items })),
            )
            .up_to_n_times(1)
            .with_priority(u8::try_from(index + 1).unwrap_or(u8::MAX))
            .named(format!("page {} of {count}", index + 1))
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/creditor{feed_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ field: [] })))
        .with_priority(u8::MAX)
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_created_document_then_empty_page() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", Some(1)).await;
    Mock::given(method("GET"))
        .and(path("/creditor/mandate"))
        .and(query_param("include", "person"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-LAST", "42")
                .set_body_json(json!({"Messages": [
                    {"Mndt": {"MndtId": "A1"}, "EvtTime": "2024-03-01T10:00:00Z"}
                ]})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/creditor/mandate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Messages": []})))
        .mount(&server)
        .await;

    let mut recorder = Recorder::default();
    let report = support::client(&server)
        .document()
        .feed(&mut recorder, FeedOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, FeedOutcome::Exhausted);
    assert_eq!(report.fetches, 2);
    assert_eq!(recorder.starts, vec![(Some("42".to_string()), 1)]);
    assert_eq!(recorder.events, vec!["new:A1"]);
}

#[tokio::test]
async fn document_events_are_classified_in_page_order() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    mount_pages(
        &server,
        "/mandate",
        "Messages",
        vec![
            json!([
                {"Mndt": {"MndtId": "M1"}, "EvtTime": "t1"},
                {
                    "OrgnlMndtId": "M1",
                    "Mndt": {"MndtId": "M1"},
                    "AmdmntRsn": {"Rsn": "_T50"},
                    "EvtTime": "t2"
                }
            ]),
            json!([{"OrgnlMndtId": "M1", "CxlRsn": {"Rsn": "MS02"}, "EvtTime": "t3"}]),
        ],
    )
    .await;

    let mut recorder = Recorder::default();
    let report = support::client(&server)
        .document()
        .feed(&mut recorder, FeedOptions::default())
        .await
        .unwrap();

    assert_eq!(report.fetches, 3);
    assert_eq!(report.events, 3);
    assert_eq!(report.last_cursor.as_deref(), Some("2"));
    assert_eq!(recorder.events, vec!["new:M1", "updated:M1:_T50", "cancelled:M1:MS02"]);
    assert_eq!(recorder.starts, vec![(Some("1".into()), 2), (Some("2".into()), 1)]);
}

#[tokio::test]
async fn resume_cursor_is_sent_on_first_fetch_only() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    mount_pages(&server, "/transaction", "Entries", vec![json!([{"id": 11}])]).await;

    let mut recorder = Recorder::default();
    support::client(&server)
        .transaction()
        .feed(&mut recorder, FeedOptions::default().resume_after("10"))
        .await
        .unwrap();

    let feed_requests: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/creditor/transaction")
        .collect();
    assert_eq!(feed_requests.len(), 2);
    assert_eq!(
        feed_requests[0].headers.get("X-RESUME-AFTER").and_then(|v| v.to_str().ok()),
        Some("10")
    );
    assert!(feed_requests[1].headers.get("X-RESUME-AFTER").is_none());
}

#[tokio::test]
async fn stop_request_skips_rest_of_page_and_further_fetches() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    mount_pages(
        &server,
        "/transaction",
        "Entries",
        vec![json!([{"id": 1}, {"id": 2}, {"id": 3}]), json!([{"id": 4}])],
    )
    .await;

    let mut recorder = Recorder { stop_after: Some(2), ..Recorder::default() };
    let report = support::client(&server)
        .transaction()
        .feed(&mut recorder, FeedOptions::default())
        .await
        .unwrap();

    assert_eq!(report.outcome, FeedOutcome::StoppedByCallback);
    assert_eq!(report.fetches, 1);
    assert_eq!(recorder.events, vec!["tx:1", "tx:2"]);
}

#[tokio::test]
async fn page_budget_and_cancellation_bound_the_drain() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    mount_pages(
        &server,
        "/payment/link/feed",
        "Links",
        vec![json!([{"id": 1}]), json!([{"id": 2}]), json!([{"id": 3}])],
    )
    .await;

    let client = support::client(&server);
    let mut recorder = Recorder::default();
    let report =
        client.paylink().feed(&mut recorder, FeedOptions::default().max_pages(2)).await.unwrap();
    assert_eq!(report.outcome, FeedOutcome::PageBudgetReached);
    assert_eq!(recorder.events, vec!["link:1", "link:2"]);

    let token = CancellationToken::new();
    token.cancel();
    let report = client
        .paylink()
        .feed(&mut recorder, FeedOptions::default().cancel_on(token))
        .await
        .unwrap();
    assert_eq!(report.outcome, FeedOutcome::Cancelled);
    assert_eq!(report.fetches, 0);
}

#[tokio::test]
async fn invoice_feed_always_includes_customer() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    Mock::given(method("GET"))
        .and(path("/creditor/invoice"))
        .and(query_param("include", "customer"))
        .and(query_param("include", "meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Invoices": [{"id": "i1", "number": "INV-1", "state": "PAID"}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/creditor/invoice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Invoices": []})))
        .mount(&server)
        .await;

    let mut recorder = Recorder::default();
    support::client(&server)
        .invoice()
        .feed(&mut recorder, &[InvoiceInclude::Meta], FeedOptions::default())
        .await
        .unwrap();
    assert_eq!(recorder.events, vec!["invoice:INV-1"]);
}

#[tokio::test]
async fn refund_feed_reads_entries() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    mount_pages(&server, "/transfer", "Entries", vec![json!([{"id": "R1", "state": "PAID"}])])
        .await;

    let mut recorder = Recorder::default();
    let report = support::client(&server)
        .refund()
        .feed(&mut recorder, FeedOptions::default())
        .await
        .unwrap();
    assert!(report.is_exhausted());
    assert_eq!(recorder.events, vec!["refund:R1"]);
}

#[tokio::test]
async fn page_with_wrong_list_field_fails_the_drain() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    Mock::given(method("GET"))
        .and(path("/creditor/transaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Messages": [{"id": 1}]})))
        .mount(&server)
        .await;

    let mut recorder = Recorder::default();
    let err = support::client(&server)
        .transaction()
        .feed(&mut recorder, FeedOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, TwikeyError::InvalidResponse { .. }));
    assert!(recorder.events.is_empty());
}
