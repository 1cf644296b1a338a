//! Binary and XML uploads and downloads through the client
//!
//! **Coverage:**
//! - Signed mandate PDF upload with content type and raw body
//! - PDF download honours `Content-Disposition` and saves into a directory
//! - Server-supplied file names never leave the target directory
//! - UBL upload headers and pain.008 import
//! - Missing local files surface as I/O errors before any request

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::io::Write;

use serde_json::json;
use tempfile::{Builder, TempDir};
use twikey_domain::{PdfUploadRequest, TwikeyError, UblUploadRequest};
use twikey_infra::save_pdf;
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.4\n%fake mandate\n";

fn temp_file(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn mandate_pdf_upload_sends_raw_pdf() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", Some(1)).await;
    Mock::given(method("POST"))
        .and(path("/creditor/mandate/pdf"))
        .and(query_param("mndtId", "MNDT-1"))
        .and(query_param("bankSignature", "false"))
        .and(header("Content-Type", "application/pdf"))
        .and(header("Authorization", "tok"))
        .and(body_bytes(PDF_BYTES))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let pdf = temp_file(".pdf", PDF_BYTES);
    let request = PdfUploadRequest {
        mandate_number: "MNDT-1".into(),
        pdf_path: pdf.path().to_path_buf(),
        bank_signature: false,
    };

    support::client(&server).document().upload_pdf(&request).await.unwrap();
}

#[tokio::test]
async fn missing_pdf_fails_before_any_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let request = PdfUploadRequest {
        mandate_number: "MNDT-1".into(),
        pdf_path: dir.path().join("absent.pdf"),
        bank_signature: true,
    };

    let err = support::client(&server).document().upload_pdf(&request).await.unwrap_err();

    assert!(matches!(err, TwikeyError::Io(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn retrieved_pdf_is_saved_under_server_filename() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    Mock::given(method("GET"))
        .and(path("/creditor/mandate/pdf"))
        .and(query_param("mndtId", "MNDT-7"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"MNDT-7.pdf\"")
                .set_body_raw(PDF_BYTES, "application/pdf"),
        )
        .mount(&server)
        .await;

    let document = support::client(&server).document().retrieve_pdf("MNDT-7").await.unwrap();
    assert_eq!(document.filename, "MNDT-7.pdf");
    assert_eq!(document.content_type, "application/pdf");

    let dir = TempDir::new().unwrap();
    let saved = save_pdf(&document, dir.path()).await.unwrap();
    assert_eq!(saved, dir.path().join("MNDT-7.pdf"));
    assert_eq!(std::fs::read(saved).unwrap(), PDF_BYTES);
}

#[tokio::test]
async fn server_filename_cannot_escape_target_directory() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    Mock::given(method("GET"))
        .and(path("/creditor/mandate/pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    "attachment; filename=\"../../escape.pdf\"; size=24",
                )
                .set_body_raw(PDF_BYTES, "application/pdf"),
        )
        .mount(&server)
        .await;

    let document = support::client(&server).document().retrieve_pdf("MNDT-9").await.unwrap();
    assert_eq!(document.filename, "escape.pdf");

    let root = TempDir::new().unwrap();
    let target = root.path().join("a").join("b");
    std::fs::create_dir_all(&target).unwrap();
    let saved = save_pdf(&document, &target).await.unwrap();

    assert_eq!(saved, target.join("escape.pdf"));
    assert!(!root.path().join("escape.pdf").exists());
}

#[tokio::test]
async fn retrieved_pdf_without_disposition_uses_default_name() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    Mock::given(method("GET"))
        .and(path("/creditor/mandate/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BYTES, "application/pdf"))
        .mount(&server)
        .await;

    let document = support::client(&server).document().retrieve_pdf("MNDT-8").await.unwrap();
    assert_eq!(document.filename, "mandate.pdf");
}

#[tokio::test]
async fn ubl_upload_sends_xml_with_flags() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    let xml = b"<Invoice xmlns=\"urn:oasis:names:tc:ubl:schema:xsd:Invoice-2\"/>";
    Mock::given(method("POST"))
        .and(path("/creditor/invoice/ubl"))
        .and(header("Content-Type", "text/xml"))
        .and(header("X-MANUAL", "true"))
        .and(header("X-INVOICE-ID", "inv-42"))
        .and(body_bytes(xml.as_slice()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "inv-42", "number": "UBL-1", "state": "BOOKED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = temp_file(".xml", xml);
    let request = UblUploadRequest {
        xml_path: file.path().to_path_buf(),
        manual: true,
        invoice_id: Some("inv-42".into()),
    };

    let invoice = support::client(&server).invoice().upload_ubl(&request).await.unwrap();
    assert_eq!(invoice.number.as_deref(), Some("UBL-1"));
}

#[tokio::test]
async fn pain008_import_posts_xml_for_template() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    let xml = b"<Document><CstmrDrctDbtInitn/></Document>";
    Mock::given(method("POST"))
        .and(path("/creditor/collect/import"))
        .and(query_param("ct", "1"))
        .and(header("Content-Type", "text/xml"))
        .and(body_bytes(xml.as_slice()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"imported": 3})))
        .mount(&server)
        .await;

    let file = temp_file(".xml", xml);
    let result =
        support::client(&server).transaction().batch_import("1", file.path()).await.unwrap();
    assert_eq!(result["imported"], 3);
}

#[tokio::test]
async fn reporting_import_posts_statement_bytes() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "tok", None).await;
    let coda = b"0000001012400005        00000000  TWIKEY";
    Mock::given(method("POST"))
        .and(path("/creditor/reporting"))
        .and(body_bytes(coda.as_slice()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    support::client(&server).transaction().reporting_import(coda.to_vec()).await.unwrap();
}
