//! Typed client for the Holded invoicing API.
//!
//! # Example
//!
//! ```no_run
//! use holded_client::{DocumentType, HoldedClient, Result};
//! use serde_json::json;
//!
//! # async fn example() -> Result<()> {
//! let client = HoldedClient::builder()
//!     .api_key("secret")
//!     .build()?;
//!
//! // Generic resources
//! let created = client.products().create(&json!({"name": "Radiometer"})).await?;
//! let id = created["id"].as_str().unwrap_or_default();
//! let product = client.products().get(id).await?;
//! println!("Product: {}", product);
//!
//! // Documents are addressed by type
//! let receipt = client
//!     .documents()
//!     .create(DocumentType::SalesReceipt, &json!({"contactName": "Antoine"}))
//!     .await?;
//! let id = receipt["id"].as_str().unwrap_or_default();
//! client
//!     .documents()
//!     .pay(DocumentType::SalesReceipt, id, Some(json!({"amount": 360})))
//!     .await?;
//!
//! // Missing records surface as a dedicated error
//! match client.contacts().get("does-not-exist").await {
//!     Err(err) if err.is_not_found() => println!("{}", err),
//!     other => println!("{:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Resources**: contacts, saleschannels, products, warehouses, treasury,
//!   expensesaccounts, payments (list, create, get, update, delete)
//! - **Documents**: list, create, get, update, delete, PDF download and payment
//!   for every [`DocumentType`]

pub mod client;
pub mod documents;
pub mod error;
pub mod middleware;
pub mod resource;
pub mod transport;

pub use client::{ClientBuilder, HoldedClient, DEFAULT_BASE_URL};
pub use documents::{DocumentType, DocumentTypes, DocumentsApi, DOCUMENT_TYPES};
pub use error::{Error, NotFoundError, Result};
pub use middleware::{CallContext, Middleware, Operation};
pub use resource::{ResourceApi, ResourceName};
pub use transport::{HttpRequest, HttpTransport, ResponseEnvelope, Transport};
