//! JSON-RPC transport.
//!
//! [`RpcSender`] is the seam between [`Connection`](super::Connection) and
//! the network: it posts one request and returns the raw response envelope.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::RpcConfig;
use super::error::ClientError;

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Unwraps a response envelope into its `result`.
///
/// # Errors
///
/// Returns [`ClientError::Rpc`] when the envelope carries an `error`
/// object, or a deserialization error when it carries neither field.
pub(crate) fn into_result(envelope: Value) -> Result<Value, ClientError> {
    let response: RpcResponse = serde_json::from_value(envelope)?;
    if let Some(error) = response.error {
        return Err(ClientError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| ClientError::Deserialization("response has no result".to_string()))
}

/// Sends JSON-RPC requests to a node.
#[async_trait]
pub trait RpcSender: Send + Sync {
    /// Sends one request and returns the response envelope.
    async fn send(&self, method: &str, params: Value) -> Result<Value, ClientError>;

    /// Endpoint description, for logs.
    fn url(&self) -> &str;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug)]
pub struct HttpSender {
    url: String,
    http: reqwest::Client,
    request_id: AtomicU64,
}

impl HttpSender {
    /// Creates a new transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &RpcConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            url: config.url.clone(),
            http,
            request_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcSender for HttpSender {
    async fn send(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(e) if status.is_success() => Err(ClientError::Deserialization(e.to_string())),
            Err(_) => Err(ClientError::Rpc {
                code: i64::from(status.as_u16()),
                message: body,
            }),
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Scripted node: answers each method with queued envelopes, in order,
    /// and records every request it sees.
    #[derive(Debug, Default)]
    pub(crate) struct MockSender {
        responses: Mutex<HashMap<String, VecDeque<Value>>>,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl MockSender {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Queues a `result` envelope for `method`.
        pub(crate) fn respond(&self, method: &str, result: Value) {
            self.push(method, json!({ "jsonrpc": "2.0", "id": 1, "result": result }));
        }

        /// Queues a raw envelope for `method`.
        pub(crate) fn push(&self, method: &str, envelope: Value) {
            self.responses
                .lock()
                .expect("lock")
                .entry(method.to_string())
                .or_default()
                .push_back(envelope);
        }

        /// Requests received so far.
        pub(crate) fn requests(&self) -> Vec<(String, Value)> {
            self.requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl RpcSender for MockSender {
        async fn send(&self, method: &str, params: Value) -> Result<Value, ClientError> {
            self.requests
                .lock()
                .expect("lock")
                .push((method.to_string(), params));
            self.responses
                .lock()
                .expect("lock")
                .get_mut(method)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| ClientError::Deserialization(format!("no response for {}", method)))
        }

        fn url(&self) -> &str {
            "mock://node"
        }
    }

    #[test]
    fn test_into_result_ok() {
        let value = into_result(json!({ "jsonrpc": "2.0", "id": 1, "result": 42 }))
            .expect("result");
        assert_eq!(value, json!(42));
    }

    #[test]
    fn test_into_result_error_message_verbatim() {
        let err = into_result(json!({ "error": { "message": "x" } })).expect_err("error");
        assert!(matches!(err, ClientError::Rpc { code: 0, .. }));
        assert_eq!(err.to_string(), "x");
    }

    #[test]
    fn test_into_result_missing_result() {
        let err = into_result(json!({ "jsonrpc": "2.0", "id": 1 })).expect_err("error");
        assert!(matches!(err, ClientError::Deserialization(_)));
    }

    #[test]
    fn test_http_sender_rejects_invalid_config() {
        let result = HttpSender::new(&RpcConfig::new("not-a-url"));
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_request_envelope() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "getSlot",
            params: json!([]),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({ "jsonrpc": "2.0", "id": 7, "method": "getSlot", "params": [] })
        );
    }
}
