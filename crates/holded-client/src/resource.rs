//! Generic CRUD client for the fixed resource collections.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::middleware::{CallContext, Middleware, Operation};
use crate::transport::{HttpRequest, Transport};

/// Resource collections addressable through uniform CRUD paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceName {
    Contacts,
    SalesChannels,
    Products,
    Warehouses,
    Treasury,
    ExpensesAccounts,
    Payments,
}

impl ResourceName {
    /// Every resource, in declaration order.
    pub const ALL: [ResourceName; 7] = [
        ResourceName::Contacts,
        ResourceName::SalesChannels,
        ResourceName::Products,
        ResourceName::Warehouses,
        ResourceName::Treasury,
        ResourceName::ExpensesAccounts,
        ResourceName::Payments,
    ];

    /// Path segment used by the upstream API.
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceName::Contacts => "contacts",
            ResourceName::SalesChannels => "saleschannels",
            ResourceName::Products => "products",
            ResourceName::Warehouses => "warehouses",
            ResourceName::Treasury => "treasury",
            ResourceName::ExpensesAccounts => "expensesaccounts",
            ResourceName::Payments => "payments",
        }
    }

    /// Position in [`ResourceName::ALL`].
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for ResourceName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownResource(s.to_string()))
    }
}

/// CRUD client bound to one resource collection.
///
/// Non-2xx responses come back as [`Error::Api`] with the upstream body.
#[derive(Debug, Clone)]
pub struct ResourceApi {
    name: ResourceName,
    transport: Arc<dyn Transport>,
    middleware: Middleware,
}

impl ResourceApi {
    /// Create an undecorated client for `name`.
    pub fn new(name: ResourceName, transport: Arc<dyn Transport>) -> Self {
        tracing::debug!(resource = %name, "Resource API created");
        Self {
            name,
            transport,
            middleware: Middleware::new(),
        }
    }

    /// Normalize upstream not-found failures for the given operations.
    pub fn with_not_found(mut self, operations: &[Operation]) -> Self {
        self.middleware = self.middleware.with_not_found(operations);
        self
    }

    /// The resource this client is bound to.
    pub fn resource_name(&self) -> ResourceName {
        self.name
    }

    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    /// List all records.
    pub async fn list(&self) -> Result<Value> {
        tracing::debug!(resource = %self.name, "Fetching resources");
        let ctx = CallContext::new(Operation::List, self.name.as_str());
        self.middleware
            .run(ctx, move || self.dispatch(HttpRequest::get(self.collection_path())))
            .await
    }

    /// Create a record. The response normally carries the assigned id.
    pub async fn create<B>(&self, resource: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(resource = %self.name, "Creating resource");
        let ctx = CallContext::new(Operation::Create, self.name.as_str());
        self.middleware
            .run(ctx, move || async move {
                let body = serde_json::to_value(resource)?;
                self.dispatch(HttpRequest::post(self.collection_path()).body(body))
                    .await
            })
            .await
    }

    /// Get a record by ID.
    pub async fn get(&self, id: &str) -> Result<Value> {
        tracing::debug!(resource = %self.name, id, "Fetching resource");
        let ctx = CallContext::new(Operation::Get, self.name.as_str()).id(id);
        self.middleware
            .run(ctx, move || self.dispatch(HttpRequest::get(self.record_path(id))))
            .await
    }

    /// Replace a record.
    pub async fn update<B>(&self, id: &str, resource: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(resource = %self.name, id, "Updating resource");
        let ctx = CallContext::new(Operation::Update, self.name.as_str()).id(id);
        self.middleware
            .run(ctx, move || async move {
                let body = serde_json::to_value(resource)?;
                self.dispatch(HttpRequest::put(self.record_path(id)).body(body))
                    .await
            })
            .await
    }

    /// Delete a record.
    pub async fn delete(&self, id: &str) -> Result<Value> {
        tracing::debug!(resource = %self.name, id, "Deleting resource");
        let ctx = CallContext::new(Operation::Delete, self.name.as_str()).id(id);
        self.middleware
            .run(ctx, move || self.dispatch(HttpRequest::delete(self.record_path(id))))
            .await
    }

    fn collection_path(&self) -> String {
        format!("/{}", self.name)
    }

    fn record_path(&self, id: &str) -> String {
        format!("/{}/{}", self.name, id)
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<Value> {
        let data = self.transport.send(request).await?.into_data()?;
        tracing::trace!(resource = %self.name, data = %data, "Resource response");
        Ok(data)
    }
}
