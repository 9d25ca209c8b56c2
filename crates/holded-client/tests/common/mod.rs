//! Shared stub transports for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use holded_client::{Error, HoldedClient, HttpRequest, ResponseEnvelope, Result, Transport};
use reqwest::Method;
use serde_json::{json, Value};

static TRACING: Once = Once::new();

/// Route library logs to the test writer, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Build a facade over `transport`.
pub fn client_with(transport: Arc<dyn Transport>) -> HoldedClient {
    init_tracing();
    HoldedClient::builder()
        .api_key("test-key")
        .transport(transport)
        .build()
        .unwrap()
}

/// Records every request and answers from a scripted queue, then with `200 {}`.
///
/// A transport built with [`RecordingTransport::failing`] answers every
/// request with [`Error::Transport`] instead.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<Vec<ResponseEnvelope>>,
    requests: Mutex<Vec<HttpRequest>>,
    failure: Option<String>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_responses(responses: Vec<ResponseEnvelope>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            ..Self::default()
        })
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.into()),
            ..Self::default()
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(method, path)` of every recorded request.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<ResponseEnvelope> {
        self.requests.lock().unwrap().push(request);
        if let Some(message) = &self.failure {
            return Err(Error::Transport(message.clone()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(ResponseEnvelope::json(200, json!({})));
        }
        Ok(responses.remove(0))
    }
}

/// In-memory store that echoes bodies back.
///
/// `POST /{collection}` stores the body (adding an `id` when missing) and
/// returns it; `GET`, `PUT` and `DELETE` on `/{collection}/{id}` read, replace
/// and remove it. Unknown ids answer the way upstream does: HTTP 400 with
/// `{"status": 0, "info": "<collection> not found"}`.
#[derive(Debug, Default)]
pub struct EchoTransport {
    records: Mutex<HashMap<String, Value>>,
    next_id: Mutex<u64>,
}

impl EchoTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn assign_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("rec-{}", *next)
    }

    fn not_found(collection: &str) -> ResponseEnvelope {
        ResponseEnvelope::json(
            400,
            json!({"status": 0, "info": format!("{} not found", collection)}),
        )
    }
}

/// Collection paths have one segment, or two under `documents/`.
fn is_collection(path: &str) -> bool {
    let segments = path.split('/').count();
    if path.starts_with("documents/") {
        segments == 2
    } else {
        segments == 1
    }
}

#[async_trait]
impl Transport for EchoTransport {
    async fn send(&self, request: HttpRequest) -> Result<ResponseEnvelope> {
        let path = request.path.trim_start_matches('/').to_string();
        let mut records = self.records.lock().unwrap();

        if request.method == Method::POST {
            let mut body = request.body.unwrap_or_else(|| json!({}));
            let id = match body.get("id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => {
                    let id = self.assign_id();
                    body["id"] = json!(id);
                    id
                }
            };
            records.insert(format!("{}/{}", path, id), body.clone());
            return Ok(ResponseEnvelope::json(201, body));
        }

        if is_collection(&path) {
            let prefix = format!("{}/", path);
            let items: Vec<Value> = records
                .iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .map(|(_, value)| value.clone())
                .collect();
            return Ok(ResponseEnvelope::json(200, Value::Array(items)));
        }

        let collection = path.rsplit_once('/').map(|(c, _)| c).unwrap_or(&path);
        let response = if request.method == Method::GET {
            records
                .get(&path)
                .cloned()
                .map(|record| ResponseEnvelope::json(200, record))
        } else if request.method == Method::PUT {
            records.get_mut(&path).map(|record| {
                *record = request.body.clone().unwrap_or(Value::Null);
                ResponseEnvelope::json(200, record.clone())
            })
        } else if request.method == Method::DELETE {
            records
                .remove(&path)
                .map(|_| ResponseEnvelope::json(200, json!({"status": 1, "info": "Deleted"})))
        } else {
            None
        };

        Ok(response.unwrap_or_else(|| Self::not_found(collection)))
    }
}
