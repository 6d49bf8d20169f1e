//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::analyze::{AnalyzeWithLlmParams, analyze_impl};
use crate::tools::parse_article::{ParseArticleParams, parse_article_impl};

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
use wxarticle_core::AppConfig;

/// The main MCP server handler for the WeChat article parser.
#[derive(Clone)]
pub struct WxArticleServer {
    config: AppConfig,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WxArticleServer {
    /// Create a new server handler around the loaded configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config, tool_router: Self::tool_router() }
    }

    /// Parse a WeChat article and generate a detailed LLM summary.
    ///
    /// Validates the URL, extracts metadata and body text, generates a
    /// ten-plus-sentence third-person summary, and optionally saves it as
    /// a Markdown report.
    #[tool(
        description = "Parse a WeChat public-account article, generate a detailed LLM summary (thesis plus sub-points, at least ten sentences), and optionally save it as a Markdown file."
    )]
    async fn parse_article(&self, params: Parameters<ParseArticleParams>) -> Result<CallToolResult, McpError> {
        Ok(parse_article_impl(&self.config, params.0).await)
    }

    /// Run a deep LLM analysis of an article from a URL or supplied text.
    #[tool(
        description = "Analyze a WeChat article with an LLM (comprehensive, viewpoint, or structure mode) and save the analysis report. Accepts a URL or directly supplied title/author/content."
    )]
    async fn analyze_with_llm(&self, params: Parameters<AnalyzeWithLlmParams>) -> Result<CallToolResult, McpError> {
        Ok(analyze_impl(&self.config, params.0).await)
    }
}

impl ServerHandler for WxArticleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-wechat-article".into(),
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
