//! Documents API.
//!
//! Documents share the CRUD shape of the other resources but every route is
//! parameterized by a [`DocumentType`]. Each operation checks the supplied type
//! against the fixed set before doing any network work; the check is registered
//! once through [`Middleware::with_type_guard`] rather than repeated per method.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::middleware::{CallContext, Middleware, Operation};
use crate::transport::{HttpRequest, Transport};

/// Resource name used for document routes and error messages.
pub const DOCUMENTS_RESOURCE: &str = "documents";

/// Operations that validate the document type before dispatching.
const TYPE_GUARDED_OPERATIONS: [Operation; 7] = [
    Operation::List,
    Operation::Create,
    Operation::Get,
    Operation::Delete,
    Operation::Update,
    Operation::DownloadPdf,
    Operation::Pay,
];

/// Kinds of invoicing documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    CreditNote,
    Estimate,
    Invoice,
    Proform,
    Purchase,
    PurchaseRefund,
    SalesOrder,
    SalesReceipt,
}

impl DocumentType {
    /// Every document type, in declaration order.
    pub const ALL: [DocumentType; 8] = [
        DocumentType::CreditNote,
        DocumentType::Estimate,
        DocumentType::Invoice,
        DocumentType::Proform,
        DocumentType::Purchase,
        DocumentType::PurchaseRefund,
        DocumentType::SalesOrder,
        DocumentType::SalesReceipt,
    ];

    /// Path segment used by the upstream API.
    pub const fn as_str(self) -> &'static str {
        match self {
            DocumentType::CreditNote => "creditnote",
            DocumentType::Estimate => "estimate",
            DocumentType::Invoice => "invoice",
            DocumentType::Proform => "proform",
            DocumentType::Purchase => "purchase",
            DocumentType::PurchaseRefund => "purchaserefund",
            DocumentType::SalesOrder => "salesorder",
            DocumentType::SalesReceipt => "salesreceipt",
        }
    }

    /// Constant name in the [`DocumentTypes`] lookup, e.g. `SALESRECEIPT`.
    pub const fn constant_name(self) -> &'static str {
        match self {
            DocumentType::CreditNote => "CREDITNOTE",
            DocumentType::Estimate => "ESTIMATE",
            DocumentType::Invoice => "INVOICE",
            DocumentType::Proform => "PROFORM",
            DocumentType::Purchase => "PURCHASE",
            DocumentType::PurchaseRefund => "PURCHASEREFUND",
            DocumentType::SalesOrder => "SALESORDER",
            DocumentType::SalesReceipt => "SALESRECEIPT",
        }
    }

    /// Comma separated wire names of every type.
    pub fn allowed() -> String {
        DocumentType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for DocumentType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidDocumentType {
                value: s.to_string(),
                allowed: DocumentType::allowed(),
            })
    }
}

/// Read-only lookup from constant name to [`DocumentType`].
///
/// The only instance is [`DOCUMENT_TYPES`]; it is handed out by shared
/// reference, so it cannot be replaced or modified:
///
/// ```compile_fail
/// let client = holded_client::HoldedClient::new("api-key").unwrap();
/// let types = client.documents().types();
/// *types = holded_client::DOCUMENT_TYPES.clone();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypes {
    entries: [(&'static str, DocumentType); 8],
}

/// The fixed document type lookup.
pub static DOCUMENT_TYPES: DocumentTypes = DocumentTypes {
    entries: [
        ("CREDITNOTE", DocumentType::CreditNote),
        ("ESTIMATE", DocumentType::Estimate),
        ("INVOICE", DocumentType::Invoice),
        ("PROFORM", DocumentType::Proform),
        ("PURCHASE", DocumentType::Purchase),
        ("PURCHASEREFUND", DocumentType::PurchaseRefund),
        ("SALESORDER", DocumentType::SalesOrder),
        ("SALESRECEIPT", DocumentType::SalesReceipt),
    ],
};

impl DocumentTypes {
    /// Look up a type by constant name, e.g. `"INVOICE"`.
    pub fn get(&self, constant_name: &str) -> Option<DocumentType> {
        self.entries
            .iter()
            .find(|(name, _)| *name == constant_name)
            .map(|(_, t)| *t)
    }

    /// Whether `value` is the wire name of a known type.
    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|(_, t)| t.as_str() == value)
    }

    /// `(constant name, type)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, DocumentType)> + '_ {
        self.entries.iter().copied()
    }

    /// Types in declaration order.
    pub fn values(&self) -> impl Iterator<Item = DocumentType> + '_ {
        self.entries.iter().map(|(_, t)| *t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Documents API client.
#[derive(Debug, Clone)]
pub struct DocumentsApi {
    transport: Arc<dyn Transport>,
    middleware: Middleware,
}

impl DocumentsApi {
    /// Create a client whose every operation is type-guarded.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        tracing::debug!(
            types = %DocumentType::allowed(),
            "Documents API created"
        );
        Self {
            transport,
            middleware: Middleware::new().with_type_guard(&TYPE_GUARDED_OPERATIONS),
        }
    }

    /// Normalize upstream not-found failures for the given operations.
    pub fn with_not_found(mut self, operations: &[Operation]) -> Self {
        self.middleware = self.middleware.with_not_found(operations);
        self
    }

    /// Always `"documents"`.
    pub fn resource_name(&self) -> &'static str {
        DOCUMENTS_RESOURCE
    }

    /// The fixed document type lookup.
    pub fn types(&self) -> &'static DocumentTypes {
        &DOCUMENT_TYPES
    }

    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    /// List documents of a type.
    pub async fn list(&self, document_type: impl AsRef<str>) -> Result<Value> {
        let document_type = document_type.as_ref();
        tracing::debug!(document_type, "Fetching documents");
        let ctx = context(Operation::List, document_type, None);
        self.middleware
            .run(ctx, move || {
                self.dispatch(HttpRequest::get(collection_path(document_type)))
            })
            .await
    }

    /// Create a document.
    pub async fn create<B>(&self, document_type: impl AsRef<str>, document: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let document_type = document_type.as_ref();
        tracing::debug!(document_type, "Creating document");
        let ctx = context(Operation::Create, document_type, None);
        self.middleware
            .run(ctx, move || async move {
                let body = serde_json::to_value(document)?;
                self.dispatch(HttpRequest::post(collection_path(document_type)).body(body))
                    .await
            })
            .await
    }

    /// Get a document by ID.
    pub async fn get(&self, document_type: impl AsRef<str>, id: &str) -> Result<Value> {
        let document_type = document_type.as_ref();
        tracing::debug!(document_type, id, "Fetching document");
        let ctx = context(Operation::Get, document_type, Some(id));
        self.middleware
            .run(ctx, move || {
                self.dispatch(HttpRequest::get(record_path(document_type, id)))
            })
            .await
    }

    /// Replace a document.
    pub async fn update<B>(
        &self,
        document_type: impl AsRef<str>,
        id: &str,
        document: &B,
    ) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let document_type = document_type.as_ref();
        tracing::debug!(document_type, id, "Updating document");
        let ctx = context(Operation::Update, document_type, Some(id));
        self.middleware
            .run(ctx, move || async move {
                let body = serde_json::to_value(document)?;
                self.dispatch(HttpRequest::put(record_path(document_type, id)).body(body))
                    .await
            })
            .await
    }

    /// Delete a document.
    pub async fn delete(&self, document_type: impl AsRef<str>, id: &str) -> Result<Value> {
        let document_type = document_type.as_ref();
        tracing::debug!(document_type, id, "Deleting document");
        let ctx = context(Operation::Delete, document_type, Some(id));
        self.middleware
            .run(ctx, move || {
                self.dispatch(HttpRequest::delete(record_path(document_type, id)))
            })
            .await
    }

    /// Fetch the document rendered as PDF.
    ///
    /// Upstream answers with the base64-encoded file; the body is returned
    /// exactly as decoded by the transport.
    pub async fn download_pdf(&self, document_type: impl AsRef<str>, id: &str) -> Result<Value> {
        let document_type = document_type.as_ref();
        tracing::debug!(document_type, id, "Downloading document PDF");
        let ctx = context(Operation::DownloadPdf, document_type, Some(id));
        self.middleware
            .run(ctx, move || {
                let path = format!("{}/pdf", record_path(document_type, id));
                self.dispatch(HttpRequest::get(path))
            })
            .await
    }

    /// Record a payment against a document. Without a payment the request is
    /// sent with no body.
    pub async fn pay(
        &self,
        document_type: impl AsRef<str>,
        id: &str,
        payment: Option<Value>,
    ) -> Result<Value> {
        let document_type = document_type.as_ref();
        tracing::debug!(document_type, id, "Paying document");
        let ctx = context(Operation::Pay, document_type, Some(id));
        self.middleware
            .run(ctx, move || {
                let path = format!("{}/pay", record_path(document_type, id));
                self.dispatch(HttpRequest::post(path).maybe_body(payment))
            })
            .await
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<Value> {
        let data = self.transport.send(request).await?.into_data()?;
        tracing::trace!(data = %data, "Documents response");
        Ok(data)
    }
}

fn context<'a>(operation: Operation, document_type: &'a str, id: Option<&'a str>) -> CallContext<'a> {
    let ctx = CallContext::new(operation, DOCUMENTS_RESOURCE).document_type(document_type);
    match id {
        Some(id) => ctx.id(id),
        None => ctx,
    }
}

fn collection_path(document_type: &str) -> String {
    format!("/{}/{}", DOCUMENTS_RESOURCE, document_type)
}

fn record_path(document_type: &str, id: &str) -> String {
    format!("/{}/{}/{}", DOCUMENTS_RESOURCE, document_type, id)
}
