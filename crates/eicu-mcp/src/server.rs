//! The MCP tool handler.

use std::sync::Arc;

use eicu_query::{FilterError, QueryTable};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    ToolsCapability,
};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

/// Rows returned by `get_head` when `n` is omitted.
pub const DEFAULT_HEAD_ROWS: usize = 5;
pub const MAX_HEAD_ROWS: usize = 100;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetHeadParams {
    /// Number of rows to return (default: 5, max: 100)
    pub n: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FilterRowsParams {
    /// Column to filter on (e.g., 'patientunitstayid', 'has_wbc', 'heartrate_mean')
    pub column: String,
    /// One of: ==, !=, >, <, >=, <=, contains, in
    pub operator: String,
    /// Value to compare against; converted to the column's type. 'in' takes a list.
    pub value: serde_json::Value,
}

/// Serves one immutable patient table to any number of clients.
#[derive(Clone)]
pub struct EicuDataServer {
    table: Option<Arc<QueryTable>>,
    name: String,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl EicuDataServer {
    pub fn new(table: QueryTable, name: impl Into<String>) -> Self {
        Self::with_table(Some(Arc::new(table)), name)
    }

    /// A server whose table failed to load; every tool answers "No data loaded".
    pub fn empty(name: impl Into<String>) -> Self {
        Self::with_table(None, name)
    }

    fn with_table(table: Option<Arc<QueryTable>>, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
            tool_router: Self::tool_router(),
        }
    }

    fn table(&self) -> Result<&QueryTable, FilterError> {
        self.table.as_deref().ok_or(FilterError::NotLoaded)
    }

    pub fn schema_text(&self) -> Result<String, FilterError> {
        self.table()?.schema_json()
    }

    pub fn head_text(&self, n: Option<usize>) -> Result<String, FilterError> {
        let n = n.unwrap_or(DEFAULT_HEAD_ROWS).min(MAX_HEAD_ROWS);
        self.table()?.head_json(n)
    }

    pub fn filter_text(
        &self,
        column: &str,
        operator: &str,
        value: &serde_json::Value,
    ) -> Result<String, FilterError> {
        self.table()?.filter_rows_json(column, operator, value)
    }

    #[tool(
        description = "Get the schema of the eICU patient table: row count, and each column's name, dtype and filter type."
    )]
    async fn get_schema(&self) -> Result<CallToolResult, McpError> {
        Ok(tool_result("get_schema", self.schema_text()))
    }

    #[tool(
        description = "Get the first rows of the eICU patient table as a JSON array of objects (default: 5 rows, max: 100)."
    )]
    async fn get_head(
        &self,
        params: Parameters<GetHeadParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(tool_result("get_head", self.head_text(params.0.n)))
    }

    #[tool(
        description = "Filter the eICU patient table on one column. Operators: ==, !=, >, <, >=, <=, contains, in. The value is converted to the column's type; 'in' requires a list. Returns matching rows as a JSON array of objects."
    )]
    async fn filter_rows(
        &self,
        params: Parameters<FilterRowsParams>,
    ) -> Result<CallToolResult, McpError> {
        let FilterRowsParams {
            column,
            operator,
            value,
        } = params.0;
        Ok(tool_result(
            "filter_rows",
            self.filter_text(&column, &operator, &value),
        ))
    }
}

/// Failures become tool errors so the client can read the message and retry.
fn tool_result(tool: &str, result: Result<String, FilterError>) -> CallToolResult {
    match result {
        Ok(body) => {
            debug!(tool, bytes = body.len(), "tool call succeeded");
            CallToolResult::success(vec![Content::text(body)])
        }
        Err(e) => {
            warn!(tool, error = %e, "tool call failed");
            CallToolResult::error(vec![Content::text(e.to_string())])
        }
    }
}

#[tool_handler]
impl ServerHandler for EicuDataServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: self.name.clone(),
                title: Some("eICU Patient Data Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Merged eICU patient table, one row per ICU stay, with APACHE severity \
                 scores, lab counts and flags, vital sign summaries and an expired flag. \
                 Call get_schema first, then get_head or filter_rows."
                    .to_string(),
            ),
        }
    }
}
