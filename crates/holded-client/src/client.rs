//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::documents::DocumentsApi;
use crate::error::{Error, Result};
use crate::middleware::Operation;
use crate::resource::{ResourceApi, ResourceName};
use crate::transport::{HttpTransport, Transport};

/// Base URL of the invoicing API.
pub const DEFAULT_BASE_URL: &str = "https://api.holded.com/api/invoicing/v1";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "key";

/// Environment variable read by [`ClientBuilder::from_env`] for the API key.
pub const API_KEY_ENV: &str = "HOLDED_API_KEY";

/// Environment variable read by [`ClientBuilder::from_env`] for the base URL.
pub const BASE_URL_ENV: &str = "HOLDED_API_URL";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resource operations whose upstream not-found failures are normalized.
const RESOURCE_NOT_FOUND_OPERATIONS: [Operation; 3] =
    [Operation::Get, Operation::Delete, Operation::Update];

/// Document operations whose upstream not-found failures are normalized.
const DOCUMENT_NOT_FOUND_OPERATIONS: [Operation; 5] = [
    Operation::DownloadPdf,
    Operation::Delete,
    Operation::Update,
    Operation::Get,
    Operation::Pay,
];

/// Holded invoicing API client.
///
/// Owns one transport shared by a client per resource collection and one
/// documents client. Single-record operations report upstream "not found"
/// answers as [`Error::NotFound`].
///
/// # Example
///
/// ```no_run
/// use holded_client::{DocumentType, HoldedClient};
///
/// # async fn example() -> holded_client::Result<()> {
/// let client = HoldedClient::new("api-key")?;
///
/// let contacts = client.contacts().list().await?;
/// let invoice = client.documents().get(DocumentType::Invoice, "5ae61a9b").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HoldedClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
#[derive(Debug)]
struct ClientInner {
    base_url: String,
    transport: Arc<dyn Transport>,
    /// Indexed by [`ResourceName::index`].
    resources: [ResourceApi; 7],
    documents: DocumentsApi,
}

impl HoldedClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    fn assemble(base_url: String, transport: Arc<dyn Transport>) -> Self {
        tracing::debug!(
            version = env!("CARGO_PKG_VERSION"),
            base_url = %base_url,
            "Creating Holded API client"
        );

        let resources = ResourceName::ALL.map(|name| {
            ResourceApi::new(name, transport.clone()).with_not_found(&RESOURCE_NOT_FOUND_OPERATIONS)
        });
        let documents =
            DocumentsApi::new(transport.clone()).with_not_found(&DOCUMENT_NOT_FOUND_OPERATIONS);

        tracing::debug!("Holded API client created");

        Self {
            inner: Arc::new(ClientInner {
                base_url,
                transport,
                resources,
                documents,
            }),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Get the shared transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the client for a resource collection.
    pub fn resource(&self, name: ResourceName) -> &ResourceApi {
        &self.inner.resources[name.index()]
    }

    /// Access the contacts API.
    pub fn contacts(&self) -> &ResourceApi {
        self.resource(ResourceName::Contacts)
    }

    /// Access the sales channels API.
    pub fn saleschannels(&self) -> &ResourceApi {
        self.resource(ResourceName::SalesChannels)
    }

    /// Access the products API.
    pub fn products(&self) -> &ResourceApi {
        self.resource(ResourceName::Products)
    }

    /// Access the warehouses API.
    pub fn warehouses(&self) -> &ResourceApi {
        self.resource(ResourceName::Warehouses)
    }

    /// Access the treasury API.
    pub fn treasury(&self) -> &ResourceApi {
        self.resource(ResourceName::Treasury)
    }

    /// Access the expenses accounts API.
    pub fn expensesaccounts(&self) -> &ResourceApi {
        self.resource(ResourceName::ExpensesAccounts)
    }

    /// Access the payments API.
    pub fn payments(&self) -> &ResourceApi {
        self.resource(ResourceName::Payments)
    }

    /// Access the documents API.
    pub fn documents(&self) -> &DocumentsApi {
        &self.inner.documents
    }
}

/// Builder for creating a HoldedClient.
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            headers: Vec::new(),
            transport: None,
        }
    }

    /// Create a builder seeded from `HOLDED_API_KEY` and, when set,
    /// `HOLDED_API_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Seed a builder from `lookup`, called with each variable name.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::new();
        if let Some(key) = lookup(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(url) = lookup(BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        builder
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use a custom transport instead of reqwest.
    ///
    /// The transport is used as-is: it is responsible for the base URL and the
    /// default headers, including the API key.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HoldedClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config("api_key is required".to_string()))?;

        Url::parse(&self.base_url)?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let headers = default_headers(&api_key, &self.headers)?;
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("holded-client/{}", env!("CARGO_PKG_VERSION")));
                let http = reqwest::Client::builder()
                    .user_agent(user_agent)
                    .timeout(self.timeout)
                    .build()?;
                Arc::new(HttpTransport::with_client(
                    http,
                    Some(self.base_url.clone()),
                    headers,
                ))
            }
        };

        Ok(HoldedClient::assemble(self.base_url, transport))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

/// API key plus JSON accept/content-type, then any extra headers.
fn default_headers(api_key: &str, extra: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let key = HeaderValue::from_str(api_key)
        .map_err(|_| Error::Config("Invalid API key".to_string()))?;
    headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::Config(format!("Invalid header name: {}", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::Config(format!("Invalid value for header {}", name)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}
