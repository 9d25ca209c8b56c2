//! HTTP transport.
//!
//! A [`Transport`] takes an [`HttpRequest`] descriptor and returns a
//! [`ResponseEnvelope`]. Non-2xx responses are ordinary envelopes; only
//! failures to complete the exchange surface as errors. Turning an envelope
//! into data (or an [`Error::Api`]) is left to [`ResponseEnvelope::into_data`].

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::{Error, Result};

/// An HTTP request described as plain data.
///
/// Built fresh for every call and consumed by [`Transport::send`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the transport's base URL, or an absolute URL when the
    /// transport has no base URL.
    pub path: String,
    /// Call-site headers. These override the transport defaults on collision.
    pub headers: HeaderMap,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a request from a method name in any letter case.
    pub fn with_method_name(method: &str, path: impl Into<String>) -> Result<Self> {
        let upper = method.to_ascii_uppercase();
        let method = Method::from_bytes(upper.as_bytes())
            .map_err(|_| Error::InvalidMethod(method.to_string()))?;
        Ok(Self::new(method, path))
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an optional JSON body.
    pub fn maybe_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    /// Set a call-site header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Uniform response returned by every transport call.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for `status` (empty for unregistered codes).
    /// A custom phrase sent by the server is not preserved.
    pub status_text: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body: JSON when the content type says so, a JSON string otherwise.
    pub data: Value,
}

impl ResponseEnvelope {
    /// Build an envelope with a JSON body and the canonical reason phrase.
    pub fn json(status: u16, data: Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status,
            status_text: reason_phrase(status),
            headers,
            data,
        }
    }

    /// Returns true if status is in 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Extract the body, turning non-2xx responses into [`Error::Api`].
    pub fn into_data(self) -> Result<Value> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(Error::Api {
                status: self.status,
                status_text: self.status_text,
                data: self.data,
            })
        }
    }
}

/// Something that can execute an [`HttpRequest`].
///
/// Implementations must be safe to share across concurrent calls; all
/// configuration is read-only after construction.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Execute the request and return the response envelope.
    async fn send(&self, request: HttpRequest) -> Result<ResponseEnvelope>;
}

/// Join a base URL and a path, consuming one slash on each side of the join.
///
/// Without a base URL the path is returned as-is.
pub fn join_url(base_url: Option<&str>, path: &str) -> String {
    match base_url {
        Some(base) => {
            let base = base.strip_suffix('/').unwrap_or(base);
            let path = path.strip_prefix('/').unwrap_or(path);
            format!("{}/{}", base, path)
        }
        None => path.to_string(),
    }
}

/// Canonical reason phrase for a status code, empty when unknown.
pub(crate) fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

/// Overlay call-site headers on the defaults. A name present at the call site
/// replaces every default value for that name.
pub(crate) fn merge_headers(defaults: &HeaderMap, call: &HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    for name in call.keys() {
        merged.remove(name);
    }
    for (name, value) in call {
        merged.append(name.clone(), value.clone());
    }
    merged
}

/// Decode a response body according to its content type.
pub(crate) fn decode_body(content_type: Option<&str>, text: String) -> Result<Value> {
    if text.is_empty() {
        return Ok(Value::Null);
    }
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return Ok(Value::String(text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Production transport using reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Option<String>,
    default_headers: HeaderMap,
}

impl HttpTransport {
    /// Create a transport with a default reqwest client.
    pub fn new(base_url: Option<String>, default_headers: HeaderMap) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, default_headers)
    }

    /// Create a transport around an existing reqwest client.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Option<String>,
        default_headers: HeaderMap,
    ) -> Self {
        Self {
            http,
            base_url,
            default_headers,
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values carry the API key.
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<ResponseEnvelope> {
        let url = join_url(self.base_url.as_deref(), &request.path);
        let headers = merge_headers(&self.default_headers, &request.headers);

        tracing::debug!(
            method = %request.method,
            url = %url,
            headers = ?headers.keys().collect::<Vec<_>>(),
            "Sending request"
        );

        let mut builder = self.http.request(request.method, &url).headers(headers);
        if let Some(body) = &request.body {
            tracing::trace!(body = %body, "Request body");
            builder = builder.body(serde_json::to_string(body)?);
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        let data = decode_body(content_type.as_deref(), text)?;

        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            status_text = %status_text,
            "Received response"
        );
        tracing::trace!(data = %data, "Response body");

        Ok(ResponseEnvelope {
            status: status.as_u16(),
            status_text,
            headers,
            data,
        })
    }
}
