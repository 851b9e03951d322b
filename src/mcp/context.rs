use crate::core::config::Config;
use crate::mcp::rpc::rpc_result;
use crate::mcp::session::{McpSession, ToolDescriptor};
use tracing::debug;

pub const NO_SUITABLE_TOOL: &str = "Error: No suitable data query tool found on MCP server.";

/// First discovered tool whose name contains `"data_query"` or `"query"`
/// (case-sensitive). Discovery order breaks ties; this is a naming heuristic,
/// not a negotiated capability match.
pub fn select_data_tool(tools: &[ToolDescriptor]) -> Option<&ToolDescriptor> {
    tools
        .iter()
        .find(|tool| tool.name.contains("data_query") || tool.name.contains("query"))
}

/// Resolve contextual data for a user query by invoking the best-matching
/// remote tool. Always returns a text value: the stringified tool result on
/// success, or a descriptive error the orchestrator can embed in the prompt.
pub async fn query_context(session: &mut McpSession, config: &Config, query: &str) -> String {
    if !config.token_is_set() {
        return "Please set your MCP token first.".to_string();
    }

    if session.session_id().is_none() {
        if let Err(err) = session.initialize(config).await {
            return err;
        }
    }

    if session.tools().is_empty() {
        if let Err(err) = session.list_tools(config).await {
            return err;
        }
    }

    let Some(tool) = select_data_tool(session.tools()) else {
        return NO_SUITABLE_TOOL.to_string();
    };
    let tool_name = tool.name.clone();
    debug!(tool = %tool_name, "Fetching MCP context");

    let response = match session.call_tool(config, &tool_name, query).await {
        Ok(response) => response,
        Err(err) => return format!("MCP Error: {err}"),
    };
    match rpc_result(&response) {
        Ok(result) => result.to_string(),
        Err(err) => format!("MCP Error: {err}"),
    }
}
