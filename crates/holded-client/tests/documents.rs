//! Document routes and document type validation.

mod common;

use common::{client_with, RecordingTransport};
use holded_client::{DocumentType, Error, DOCUMENT_TYPES};
use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn test_every_type_routes_under_documents() {
    let transport = RecordingTransport::new();
    let client = client_with(transport.clone());
    let docs = client.documents();

    for document_type in DocumentType::ALL {
        docs.list(document_type).await.unwrap();
        docs.create(document_type, &json!({})).await.unwrap();
        docs.get(document_type, "d").await.unwrap();
        docs.update(document_type, "d", &json!({})).await.unwrap();
        docs.delete(document_type, "d").await.unwrap();
        docs.download_pdf(document_type, "d").await.unwrap();
        docs.pay(document_type, "d", None).await.unwrap();
    }

    let expected: Vec<(Method, String)> = DocumentType::ALL
        .iter()
        .flat_map(|t| {
            vec![
                (Method::GET, format!("/documents/{t}")),
                (Method::POST, format!("/documents/{t}")),
                (Method::GET, format!("/documents/{t}/d")),
                (Method::PUT, format!("/documents/{t}/d")),
                (Method::DELETE, format!("/documents/{t}/d")),
                (Method::GET, format!("/documents/{t}/d/pdf")),
                (Method::POST, format!("/documents/{t}/d/pay")),
            ]
        })
        .collect();
    assert_eq!(transport.routes(), expected);
}

#[tokio::test]
async fn test_unknown_type_is_rejected_before_any_request() {
    let transport = RecordingTransport::new();
    let client = client_with(transport.clone());
    let docs = client.documents();
    let body = json!({"notes": "ignored"});

    for bad in ["", "invoices", "Invoice", "INVOICE", "receipt"] {
        let errors = vec![
            docs.list(bad).await.unwrap_err(),
            docs.create(bad, &body).await.unwrap_err(),
            docs.get(bad, "1").await.unwrap_err(),
            docs.update(bad, "1", &body).await.unwrap_err(),
            docs.delete(bad, "1").await.unwrap_err(),
            docs.download_pdf(bad, "1").await.unwrap_err(),
            docs.pay(bad, "1", Some(json!({"amount": 1}))).await.unwrap_err(),
        ];

        for err in errors {
            assert!(err.is_validation_error(), "{bad}: {err}");
            let message = err.to_string();
            assert!(message.contains(&format!("\"{bad}\"")), "{message}");
            for t in DocumentType::ALL {
                assert!(message.contains(t.as_str()), "{message} lacks {t}");
            }
        }
    }

    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_validation_error_is_not_normalized() {
    let transport = RecordingTransport::new();
    let client = client_with(transport);

    let err = client.documents().get("nope", "1").await.unwrap_err();
    assert!(matches!(err, Error::InvalidDocumentType { .. }));
    assert!(!err.is_not_found());
}

#[test]
fn test_type_lookup_is_fixed() {
    let transport = RecordingTransport::new();
    let client = client_with(transport);
    let types = client.documents().types();

    // Same instance on every access.
    assert!(std::ptr::eq(types, client.documents().types()));
    assert!(std::ptr::eq(types, &DOCUMENT_TYPES));

    let entries: Vec<(&str, &str)> = client
        .documents()
        .types()
        .iter()
        .map(|(name, t)| (name, t.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("CREDITNOTE", "creditnote"),
            ("ESTIMATE", "estimate"),
            ("INVOICE", "invoice"),
            ("PROFORM", "proform"),
            ("PURCHASE", "purchase"),
            ("PURCHASEREFUND", "purchaserefund"),
            ("SALESORDER", "salesorder"),
            ("SALESRECEIPT", "salesreceipt"),
        ]
    );
}

#[tokio::test]
async fn test_lookup_values_are_accepted_by_the_guard() {
    let transport = RecordingTransport::new();
    let client = client_with(transport.clone());
    let docs = client.documents();

    let receipt = docs.types().get("SALESRECEIPT").unwrap();
    docs.list(receipt).await.unwrap();
    docs.list(receipt.as_str().to_string()).await.unwrap();

    assert_eq!(transport.request_count(), 2);
}
