use crate::core::config::Config;
use crate::mcp::rpc::{rpc_result, RpcClient};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Protocol revision advertised during the `initialize` handshake.
pub const MCP_PROTOCOL_VERSION: &str = "2025-03-26";

/// A tool advertised by the MCP server via `tools/list`. The discovered set
/// is only trusted for the lifetime of the session id it was fetched under.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Owns the tool-server session lifecycle: uninitialized until the first
/// caller needs the session, active once the server has issued a session id.
/// A failed initialize attempt leaves the manager uninitialized; there is no
/// retained failure state.
pub struct McpSession {
    rpc: RpcClient,
    session_id: Option<String>,
    tools: Vec<ToolDescriptor>,
}

impl McpSession {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            rpc: RpcClient::new()?,
            session_id: None,
            tools: Vec::new(),
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    /// Drop the session id and the discovered tool set. Called when the chat
    /// is cleared or the auth token changes, since either invalidates the
    /// server-side session.
    pub fn reset(&mut self) {
        self.session_id = None;
        self.tools.clear();
    }

    /// Negotiate a session with the tool server. On success the session id
    /// from `result.sessionId` is stored and an `initialized` notification is
    /// fired; its outcome is logged but never propagated. On failure the
    /// manager stays uninitialized and the error string starts with
    /// `"Error:"`.
    pub async fn initialize(&mut self, config: &Config) -> Result<String, String> {
        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {"tools": {}},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        let response = self
            .rpc
            .call(config, None, "initialize", Some(params))
            .await
            .map_err(|err| format!("Error: {err}"))?;
        let result = rpc_result(&response).map_err(|err| format!("Error: {err}"))?;

        let session_id = result
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "Error: MCP server did not return a session id.".to_string())?
            .to_string();

        debug!(session_id = %session_id, "MCP session established");
        self.session_id = Some(session_id);

        // Fire-and-forget: servers are not required to answer this
        // notification meaningfully.
        if let Err(err) = self
            .rpc
            .call(config, self.session_id.as_deref(), "initialized", None)
            .await
        {
            warn!(error = %err, "initialized notification failed");
        }

        Ok("MCP session initialized.".to_string())
    }

    /// Discover the server's tools, lazily initializing a session first. A
    /// failed initialize propagates unchanged; repeated calls while a session
    /// is active never re-initialize.
    pub async fn list_tools(&mut self, config: &Config) -> Result<String, String> {
        if self.session_id.is_none() {
            self.initialize(config).await?;
        }

        let response = self
            .rpc
            .call(config, self.session_id.as_deref(), "tools/list", None)
            .await
            .map_err(|err| format!("Error: {err}"))?;
        let result = rpc_result(&response).map_err(|err| format!("Error: {err}"))?;

        let tools: Vec<ToolDescriptor> =
            serde_json::from_value(result.get("tools").cloned().unwrap_or_else(|| json!([])))
                .map_err(|err| format!("Error: Malformed tools/list response: {err}"))?;

        debug!(count = tools.len(), "MCP tools discovered");
        self.tools = tools;

        if self.tools.is_empty() {
            return Ok("MCP server advertised no tools.".to_string());
        }
        let names: Vec<&str> = self.tools.iter().map(|tool| tool.name.as_str()).collect();
        Ok(format!("Available tools: {}", names.join(", ")))
    }

    /// Invoke a discovered tool with a single `query` argument and return the
    /// raw JSON-RPC response body for the caller to interpret.
    pub(crate) async fn call_tool(
        &mut self,
        config: &Config,
        name: &str,
        query: &str,
    ) -> Result<Value, String> {
        let params = json!({
            "name": name,
            "arguments": {"query": query},
        });
        self.rpc
            .call(config, self.session_id.as_deref(), "tools/call", Some(params))
            .await
    }

    #[cfg(test)]
    pub(crate) fn set_state_for_test(
        &mut self,
        session_id: Option<String>,
        tools: Vec<ToolDescriptor>,
    ) {
        self.session_id = session_id;
        self.tools = tools;
    }
}

#[cfg(test)]
pub(crate) fn tool_named(name: &str) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: None,
        metadata: Map::new(),
    }
}
