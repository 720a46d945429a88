//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{ControlParams, FetchParams, control_impl, fetch_impl};

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
use shelter_client::{Transport, Worker};

/// The main MCP server handler for shelter.
#[derive(Clone)]
pub struct ShelterServer {
    tool_router: ToolRouter<Self>,
    worker: Worker,
    transport: Arc<dyn Transport>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ShelterServer {
    /// Create a new server handler around a booted worker.
    ///
    /// `transport` serves the requests the worker declines to intercept.
    pub fn new(worker: Worker, transport: Arc<dyn Transport>) -> Self {
        Self { tool_router: Self::tool_router(), worker, transport }
    }

    /// Issue a request through the worker.
    #[tool(
        description = "Issue a request through the offline cache. Reports whether it was intercepted, the caching \
                       strategy used, and the response."
    )]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, self.transport.as_ref(), params.0).await
    }

    /// Send a control command to the worker.
    #[tool(description = "Send a control command (SKIP_WAITING, CLEAR_CACHE, GET_VERSION) and return the reply.")]
    async fn control(&self, params: Parameters<ControlParams>) -> Result<CallToolResult, McpError> {
        control_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for ShelterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shelter".into(),
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
