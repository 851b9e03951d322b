use crate::core::config::Config;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

pub const MCP_SESSION_ID_HEADER: &str = "Mcp-Session-Id";

const MCP_HTTP_CONNECT_TIMEOUT_SECONDS: u64 = 10;
const MCP_HTTP_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Serialize)]
struct RpcEnvelope<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 client for the MCP tool server.
///
/// Every failure mode is normalized to an `Err(String)` with a
/// human-readable message; the client never panics and never surfaces a
/// transport error type to its callers. A successful call returns the parsed
/// response body unchanged, so callers inspect it for a `result` or `error`
/// member per JSON-RPC convention (see [`rpc_result`]).
pub struct RpcClient {
    http: reqwest::Client,
    next_request_id: u64,
}

impl RpcClient {
    pub fn new() -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(MCP_HTTP_CONNECT_TIMEOUT_SECONDS))
            .timeout(Duration::from_secs(MCP_HTTP_REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|err| format!("Failed to build HTTP client: {err}"))?;
        Ok(Self {
            http,
            next_request_id: 0,
        })
    }

    // Unique per outstanding request: calls are sequential, never pipelined.
    fn next_request_id(&mut self) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.saturating_add(1);
        request_id
    }

    /// Send one JSON-RPC request. `params` defaults to an empty object;
    /// the session header is attached only when a session id is held.
    pub async fn call(
        &mut self,
        config: &Config,
        session_id: Option<&str>,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, String> {
        let token = config.mcp_token.trim();
        if token.is_empty() {
            return Err("MCP token is not set.".to_string());
        }

        let envelope = RpcEnvelope {
            jsonrpc: "2.0",
            id: self.next_request_id(),
            method,
            params: params.unwrap_or_else(|| Value::Object(Map::new())),
        };

        debug!(url = %config.mcp_url, method, "Sending MCP request");
        let mut request = self
            .http
            .post(&config.mcp_url)
            .bearer_auth(token)
            .json(&envelope);
        if let Some(session_id) = session_id {
            request = request.header(MCP_SESSION_ID_HEADER, session_id);
        }

        let response = request.send().await.map_err(describe_transport_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| format!("Failed to read MCP response: {err}"))?;

        if !status.is_success() {
            if let Some(message) = error_message_from_body(&body) {
                return Err(message);
            }
            return Err(format!("HTTP {}: {}", status.as_u16(), body.trim()));
        }

        serde_json::from_str(&body).map_err(|err| format!("Invalid JSON-RPC response: {err}"))
    }
}

fn describe_transport_error(err: reqwest::Error) -> String {
    if err.is_timeout() {
        "MCP request timed out.".to_string()
    } else if err.is_connect() {
        format!("Could not connect to MCP server: {err}")
    } else {
        format!("MCP request failed: {err}")
    }
}

/// Pull the JSON-RPC `error.message` out of an HTTP error body, if the body
/// is shaped that way.
fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Extract the `result` member of a successful JSON-RPC response, or render
/// its `error` member as a message.
pub fn rpc_result(value: &Value) -> Result<Value, String> {
    if let Some(error) = value.get("error") {
        return Err(format_rpc_error(error));
    }
    value
        .get("result")
        .cloned()
        .ok_or_else(|| "MCP response is missing a result.".to_string())
}

pub fn format_rpc_error(error: &Value) -> String {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    match error.get("code").and_then(Value::as_i64) {
        Some(code) => format!("MCP error {code}: {message}"),
        None => message.to_string(),
    }
}
