//! MCP stdio transport exposing the `perplexity_search` tool.

use crate::error::SearchToolError;
use crate::tool::{PerplexitySearchTool, SearchArgs};
use anyhow::Result;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct SearchServer {
    tool: Arc<PerplexitySearchTool>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SearchServer {
    pub fn new(tool: PerplexitySearchTool) -> Self {
        Self {
            tool: Arc::new(tool),
            tool_router: Self::tool_router(),
        }
    }

    /// Tools advertised by this server
    pub fn tools(&self) -> Vec<rmcp::model::Tool> {
        self.tool_router.list_all()
    }

    #[tool(
        name = "perplexity_search",
        description = "Run a Perplexity web search and return structured results. Inputs: query (required, at most 4096 characters), num_results (default 10, clamped to 1..=30), search_domain_filter (optional list of hostnames). Output: {\"results\": [{\"title\", \"url\", \"date\"?, \"last_update\", \"snippet\"}]}"
    )]
    pub async fn perplexity_search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.tool.search(args).await.map_err(to_mcp_error)?;
        let payload = serde_json::to_value(&response)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::structured(payload))
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Single tool server: perplexity_search runs one Perplexity web search and returns normalized results."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Translate the tool's error taxonomy into an MCP error reply.
pub fn to_mcp_error(err: SearchToolError) -> McpError {
    match &err {
        SearchToolError::Validation(_) => McpError::invalid_params(err.to_string(), None),
        SearchToolError::Config(_) => McpError::internal_error(
            err.to_string(),
            Some(json!({ "kind": err.kind() })),
        ),
        SearchToolError::Provider(provider) => McpError::internal_error(
            err.to_string(),
            Some(json!({
                "kind": err.kind(),
                "provider_status": provider.provider_status,
                "retry_after_ms": provider.retry_after.map(|d| d.as_millis() as u64),
            })),
        ),
    }
}

/// Serve the tool over stdio until the client disconnects.
pub async fn serve_stdio(tool: PerplexitySearchTool) -> Result<()> {
    let service = SearchServer::new(tool)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "failed to start MCP server");
        })?;

    let reason = service.waiting().await?;
    tracing::info!(reason = ?reason, "MCP client disconnected");
    Ok(())
}
