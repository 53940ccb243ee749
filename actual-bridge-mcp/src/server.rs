//! MCP Server implementation for the Actual Budget bridge.
//!
//! Exposes 7 tools for AI agents to read and mutate the budget. Every tool
//! forwards to one bridge HTTP endpoint through the gateway seam.

use async_trait::async_trait;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

use crate::client::{BridgeClient, ClientResult};
use crate::schemas::{
    AccountsArg, AddTransactionParams, DeleteTransactionParams, EditTransactionParams,
    ListAccountsParams, ListCategoriesParams, MonthlySummaryParams, QueryTransactionsParams,
};

// Timeout constants for bridge calls
const READ_TIMEOUT_SECS: u64 = 30;
const WRITE_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Copy)]
struct ToolTimeouts {
    read: Duration,
    write: Duration,
}

impl Default for ToolTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(READ_TIMEOUT_SECS),
            write: Duration::from_secs(WRITE_TIMEOUT_SECS),
        }
    }
}

/// Seam over the bridge HTTP hop so tests can script responses.
#[async_trait]
trait BridgeGateway: Send + Sync {
    async fn get_accounts(&self) -> ClientResult<Value>;
    async fn get_categories(&self) -> ClientResult<Value>;
    async fn get_monthly_summary(&self, month: &str) -> ClientResult<Value>;
    async fn add_transaction(&self, payload: &Value) -> ClientResult<Value>;
    async fn edit_transaction(&self, id: &str, payload: &Value) -> ClientResult<Value>;
    async fn delete_transaction(&self, id: &str) -> ClientResult<Value>;
    async fn query_transactions(&self, payload: &Value) -> ClientResult<Value>;
}

struct DefaultBridgeGateway {
    client: BridgeClient,
}

#[async_trait]
impl BridgeGateway for DefaultBridgeGateway {
    async fn get_accounts(&self) -> ClientResult<Value> {
        self.client.get_accounts().await
    }

    async fn get_categories(&self) -> ClientResult<Value> {
        self.client.get_categories().await
    }

    async fn get_monthly_summary(&self, month: &str) -> ClientResult<Value> {
        self.client.get_monthly_summary(month).await
    }

    async fn add_transaction(&self, payload: &Value) -> ClientResult<Value> {
        self.client.add_transaction(payload).await
    }

    async fn edit_transaction(&self, id: &str, payload: &Value) -> ClientResult<Value> {
        self.client.edit_transaction(id, payload).await
    }

    async fn delete_transaction(&self, id: &str) -> ClientResult<Value> {
        self.client.delete_transaction(id).await
    }

    async fn query_transactions(&self, payload: &Value) -> ClientResult<Value> {
        self.client.query_transactions(payload).await
    }
}

/// Sanitize error messages to prevent sensitive information leakage.
///
/// Logs the full error to stderr but returns a generic message to the client.
fn sanitize_internal_error(error: impl std::fmt::Display, context: &str) -> McpError {
    tracing::error!("{context} error: {error}");
    McpError::internal_error(
        format!("{context} failed - check server logs for details"),
        None,
    )
}

fn map_bridge_error(context: &str, error: &crate::client::ClientError) -> McpError {
    tracing::warn!("{context} error: {error}");
    McpError::internal_error(error.to_string(), None)
}

/// Execute a bridge call with timeout, error mapping, and JSON serialization.
async fn run_bridge_tool(
    duration: Duration,
    future: impl std::future::Future<Output = ClientResult<Value>>,
    tool_name: &str,
) -> Result<CallToolResult, McpError> {
    let result = timeout(duration, future)
        .await
        .map_err(|_| McpError::internal_error(format!("{tool_name} timeout"), None))?
        .map_err(|e| map_bridge_error(tool_name, &e))?;

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| sanitize_internal_error(e, &format!("Serialize {tool_name} result")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

/// Bridge payload for a create: required fields plus only the options the
/// caller supplied.
fn add_payload(params: &AddTransactionParams) -> Value {
    let mut map = Map::new();
    map.insert("account".to_string(), json!(params.account));
    map.insert("amount".to_string(), json!(params.amount));
    map.insert("date".to_string(), json!(params.date));
    insert_opt(&mut map, "notes", params.notes.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "payee", params.payee.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "category", params.category.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "requestId", params.request_id.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "dryRun", params.dry_run.map(|v| json!(v)));
    Value::Object(map)
}

/// Bridge payload for a partial edit: absent fields stay absent so the
/// bridge leaves them untouched.
fn edit_payload(params: &EditTransactionParams) -> Value {
    let mut map = Map::new();
    insert_opt(&mut map, "amount", params.amount.map(|v| json!(v)));
    insert_opt(&mut map, "date", params.date.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "category", params.category.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "notes", params.notes.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "cleared", params.cleared.map(|v| json!(v)));
    insert_opt(&mut map, "account", params.account.as_deref().map(|v| json!(v)));
    Value::Object(map)
}

fn query_payload(params: &QueryTransactionsParams) -> Value {
    let mut map = Map::new();
    let accounts = params.accounts.as_ref().map(|arg| match arg {
        AccountsArg::One(name) => json!(name),
        AccountsArg::Many(names) => json!(names),
    });
    insert_opt(&mut map, "accounts", accounts);
    insert_opt(&mut map, "category", params.category.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "start_date", params.start_date.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "end_date", params.end_date.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "min_amount", params.min_amount.map(|v| json!(v)));
    insert_opt(&mut map, "max_amount", params.max_amount.map(|v| json!(v)));
    insert_opt(&mut map, "search", params.search.as_deref().map(|v| json!(v)));
    insert_opt(&mut map, "limit", params.limit.map(|v| json!(v)));
    Value::Object(map)
}

/// MCP Server for the Actual Budget bridge.
///
/// Provides AI agents with read and mutation access to the budget
/// through the Model Context Protocol.
#[derive(Clone)]
pub struct ActualBridgeMcp {
    /// Bridge gateway for all HTTP calls.
    gateway: Arc<dyn BridgeGateway>,
    /// Timeout configuration for bridge calls.
    timeouts: ToolTimeouts,
    /// Tool router generated by macro.
    tool_router: ToolRouter<Self>,
}

impl ActualBridgeMcp {
    /// Create a new MCP server instance over `client`.
    #[must_use]
    pub fn new(client: BridgeClient) -> Self {
        Self::with_gateway_and_timeouts(
            Arc::new(DefaultBridgeGateway { client }),
            ToolTimeouts::default(),
        )
    }

    fn with_gateway_and_timeouts(gateway: Arc<dyn BridgeGateway>, timeouts: ToolTimeouts) -> Self {
        Self {
            gateway,
            timeouts,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ActualBridgeMcp {
    /// List all accounts with their current balances.
    #[tool(description = "List all accounts with their current balances (decimal format)")]
    async fn list_accounts(
        &self,
        _params: Parameters<ListAccountsParams>,
    ) -> Result<CallToolResult, McpError> {
        run_bridge_tool(self.timeouts.read, self.gateway.get_accounts(), "List accounts").await
    }

    /// List all budget categories.
    #[tool(description = "List all budget categories available for transactions")]
    async fn list_categories(
        &self,
        _params: Parameters<ListCategoriesParams>,
    ) -> Result<CallToolResult, McpError> {
        run_bridge_tool(
            self.timeouts.read,
            self.gateway.get_categories(),
            "List categories",
        )
        .await
    }

    /// Get a monthly income/expense/net summary.
    #[tool(description = "Get a monthly budget summary (income, expenses, net) for a month in YYYY-MM format")]
    async fn get_monthly_summary(
        &self,
        Parameters(params): Parameters<MonthlySummaryParams>,
    ) -> Result<CallToolResult, McpError> {
        run_bridge_tool(
            self.timeouts.read,
            self.gateway.get_monthly_summary(&params.month),
            "Monthly summary",
        )
        .await
    }

    /// Add a new transaction.
    #[tool(
        description = "Add a transaction. Account and category are NAMES from list_accounts/list_categories. \
                       Amount is decimal: negative for expenses, positive for income. \
                       Use 'notes' for purchase descriptions; use 'payee' only for transfers (exact account name). \
                       Set dry_run to validate without writing; pass request_id to make retries safe."
    )]
    async fn add_transaction(
        &self,
        Parameters(params): Parameters<AddTransactionParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = add_payload(&params);
        run_bridge_tool(
            self.timeouts.write,
            self.gateway.add_transaction(&payload),
            "Add transaction",
        )
        .await
    }

    /// Edit an existing transaction.
    #[tool(
        description = "Edit an existing transaction. Only the supplied fields change; \
                       everything else is left untouched. Amount is decimal, negative for expenses."
    )]
    async fn edit_transaction(
        &self,
        Parameters(params): Parameters<EditTransactionParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = edit_payload(&params);
        run_bridge_tool(
            self.timeouts.write,
            self.gateway
                .edit_transaction(&params.transaction_id, &payload),
            "Edit transaction",
        )
        .await
    }

    /// Delete a transaction.
    #[tool(description = "Delete a transaction. This action cannot be undone. Returns a snapshot of what was deleted.")]
    async fn delete_transaction(
        &self,
        Parameters(params): Parameters<DeleteTransactionParams>,
    ) -> Result<CallToolResult, McpError> {
        run_bridge_tool(
            self.timeouts.write,
            self.gateway.delete_transaction(&params.transaction_id),
            "Delete transaction",
        )
        .await
    }

    /// Query transactions with flexible filters.
    #[tool(
        description = "Query transactions with flexible filters (accounts, category, date range, \
                       amount range, text search). All parameters optional; results are newest first, \
                       default limit 100. Unknown category names return an empty list."
    )]
    async fn query_transactions(
        &self,
        Parameters(params): Parameters<QueryTransactionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = query_payload(&params);
        run_bridge_tool(
            self.timeouts.read,
            self.gateway.query_transactions(&payload),
            "Query transactions",
        )
        .await
    }
}

#[tool_handler]
impl ServerHandler for ActualBridgeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Actual Budget MCP Server - Read and mutate an Actual Budget ledger. \
                 Use list_accounts and list_categories to discover exact names first; \
                 mutations reference accounts and categories by those names. \
                 Amounts are decimals: negative for expenses, positive for income. \
                 query_transactions supports account/category/date/amount/text filters. \
                 add_transaction supports dry_run validation and request_id idempotency keys."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
#[path = "test_mocks.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod test_mocks;

#[cfg(test)]
#[path = "server_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;
