//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    FindIssuesParams,
    cache::{clear_impl, stats_impl},
    find_issues::find_impl,
};

use gfi_client::{GithubClient, IssueFinder};
use gfi_core::{AppConfig, SessionStore};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// Issue finder as wired in the running server.
pub type Finder = IssueFinder<GithubClient, Box<dyn SessionStore>>;

/// The main MCP server handler for good-first-issues.
#[derive(Clone)]
pub struct GfiServer {
    tool_router: ToolRouter<Self>,
    finder: Arc<Finder>,
    config: Arc<AppConfig>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl GfiServer {
    /// Create a new server handler.
    pub fn new(finder: Finder, config: AppConfig) -> Self {
        Self { tool_router: Self::tool_router(), finder: Arc::new(finder), config: Arc::new(config) }
    }

    /// Search GitHub for open "good first issue" tickets.
    #[tool(
        description = "Find open GitHub issues labelled \"good first issue\". Accepts a filter token and/or \
                       overrides for languages, creation dates or a date preset, sort or a sort preset, and \
                       page. Returns issues, totals, the canonical filter token and whether the result was \
                       cached."
    )]
    async fn find_issues(&self, params: Parameters<FindIssuesParams>) -> Result<CallToolResult, McpError> {
        find_impl(&self.finder, self.config.share_base_url.as_deref(), params.0).await
    }

    /// Report what the result cache holds.
    #[tool(description = "Show the number of cached search results and their keys.")]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.finder).await
    }

    /// Drop every cached search result.
    #[tool(description = "Clear all cached search results so the next search hits GitHub.")]
    async fn cache_clear(&self) -> Result<CallToolResult, McpError> {
        clear_impl(&self.finder).await
    }
}

impl ServerHandler for GfiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "good-first-issues".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
