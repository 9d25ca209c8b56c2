//! Per-operation wrappers around client calls.
//!
//! Two behaviors wrap the base request of an operation:
//!
//! - [`guard_document_type`] rejects unknown document types before the base
//!   operation runs.
//! - [`normalize_not_found`] re-tags the upstream "not found" signature as
//!   [`Error::NotFound`].
//!
//! A [`Middleware`] records which [`Operation`]s each wrapper applies to, and
//! [`Middleware::run`] composes them around the base call. Adding a wrapped
//! method means registering its [`Operation`], nothing more.

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::documents::DocumentType;
use crate::error::{Error, NotFoundError, Result};

/// Names of the client operations that can be wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Get,
    Update,
    Delete,
    DownloadPdf,
    Pay,
}

impl Operation {
    /// Method name as used in log events.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Get => "get",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::DownloadPdf => "download_pdf",
            Operation::Pay => "pay",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a wrapper knows about the call it wraps.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// The operation being invoked.
    pub operation: Operation,
    /// Resource collection name, `"documents"` for document calls.
    pub resource: &'a str,
    /// Target identifier, for operations addressing a single record.
    pub id: Option<&'a str>,
    /// Document type as supplied by the caller, for document calls.
    pub document_type: Option<&'a str>,
}

impl<'a> CallContext<'a> {
    pub fn new(operation: Operation, resource: &'a str) -> Self {
        Self {
            operation,
            resource,
            id: None,
            document_type: None,
        }
    }

    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn document_type(mut self, document_type: &'a str) -> Self {
        self.document_type = Some(document_type);
        self
    }
}

/// Fail with [`Error::InvalidDocumentType`] unless the context carries a known
/// document type, otherwise run `next`.
pub async fn guard_document_type<F, Fut, T>(ctx: CallContext<'_>, next: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let value = ctx.document_type.unwrap_or_default();
    let document_type: DocumentType = value.parse()?;
    tracing::trace!(
        operation = %ctx.operation,
        document_type = %document_type,
        "Document type accepted"
    );
    next().await
}

/// Run `next`, replacing an upstream not-found failure with [`Error::NotFound`].
///
/// Every other outcome passes through untouched.
pub async fn normalize_not_found<F, Fut, T>(ctx: CallContext<'_>, next: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    next().await.map_err(|err| {
        if !is_not_found_signature(&err) {
            return err;
        }
        let id = ctx.id.unwrap_or_default();
        tracing::debug!(
            operation = %ctx.operation,
            resource = ctx.resource,
            id,
            "Upstream reported resource not found"
        );
        Error::NotFound(NotFoundError::new(ctx.resource, id, err))
    })
}

/// Whether an error is the upstream's way of saying "not found": HTTP 400 with
/// a body carrying a numeric `status` of zero and an `info` (or, when `info` is
/// not a string, `message`) containing "not found" in any letter case.
pub fn is_not_found_signature(err: &Error) -> bool {
    let Error::Api {
        status: 400, data, ..
    } = err
    else {
        return false;
    };

    let upstream_status_is_zero = data.get("status").and_then(Value::as_f64) == Some(0.0);

    let info = data
        .get("info")
        .and_then(Value::as_str)
        .or_else(|| data.get("message").and_then(Value::as_str));
    let info_says_not_found =
        info.is_some_and(|info| info.to_lowercase().contains("not found"));

    upstream_status_is_zero && info_says_not_found
}

/// Registry of which wrappers apply to which operations.
#[derive(Debug, Clone, Default)]
pub struct Middleware {
    type_guarded: Vec<Operation>,
    not_found: Vec<Operation>,
}

impl Middleware {
    /// Middleware wrapping nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply [`guard_document_type`] to the given operations.
    pub fn with_type_guard(mut self, operations: &[Operation]) -> Self {
        extend_unique(&mut self.type_guarded, operations);
        self
    }

    /// Apply [`normalize_not_found`] to the given operations.
    pub fn with_not_found(mut self, operations: &[Operation]) -> Self {
        extend_unique(&mut self.not_found, operations);
        self
    }

    /// Whether `operation` is type-guarded.
    pub fn guards(&self, operation: Operation) -> bool {
        self.type_guarded.contains(&operation)
    }

    /// Whether `operation` has not-found normalization.
    pub fn normalizes(&self, operation: Operation) -> bool {
        self.not_found.contains(&operation)
    }

    /// Run `base` wrapped in whichever behaviors are registered for
    /// `ctx.operation`. The type guard runs inside the normalization, so a
    /// rejected type never reaches `base`.
    pub async fn run<F, Fut, T>(&self, ctx: CallContext<'_>, base: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let guarded = self.guards(ctx.operation);
        let inner = async move {
            if guarded {
                guard_document_type(ctx, base).await
            } else {
                base().await
            }
        };

        if self.normalizes(ctx.operation) {
            normalize_not_found(ctx, move || inner).await
        } else {
            inner.await
        }
    }
}

fn extend_unique(target: &mut Vec<Operation>, operations: &[Operation]) {
    for operation in operations {
        if !target.contains(operation) {
            target.push(*operation);
        }
    }
}
