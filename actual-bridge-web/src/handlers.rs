//! HTTP surface of the bridge.
//!
//! Handlers are plumbing only: resolve the target budget from the request
//! headers, call one core service, shape the JSON. All state machines live
//! in the core crate.

use actix_web::{middleware, web, HttpRequest, HttpResponse};
use actual_bridge_core::types::{
    AccountView, CategoryView, EditRequest, QueryFilter, TransactionDraft,
};
use chrono::NaiveDate;
use actual_bridge_core::BridgeError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

/// Route table.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/accounts", web::get().to(accounts_raw))
        .route("/transactions/recent", web::get().to(recent_transactions))
        .service(
            web::scope("/mcp")
                .wrap(middleware::from_fn(auth::require_api_key))
                .route("/status", web::get().to(status))
                .route("/capabilities", web::get().to(capabilities))
                .route("/execute", web::post().to(execute_tool))
                .route("/accounts", web::get().to(mcp_accounts))
                .route("/categories", web::get().to(mcp_categories))
                .route("/summary/month", web::get().to(monthly_summary))
                .route("/transactions/preview", web::post().to(preview_transaction))
                .route("/transactions/add", web::post().to(add_transaction))
                .route("/transactions/query", web::post().to(query_transactions))
                .route("/transactions/{id}", web::put().to(edit_transaction))
                .route("/transactions/{id}", web::delete().to(delete_transaction)),
        );
}

/// Ensure the request's target budget is loaded. The sync id and file
/// password come from headers, falling back to configured defaults.
async fn ensure_session(state: &AppState, req: &HttpRequest) -> Result<(), ApiError> {
    let sync_id = header(req, "x-actual-sync-id");
    let password = header(req, "x-actual-file-password");
    state
        .context
        .sessions
        .resolve(sync_id.as_deref(), password.as_deref())
        .await?;
    Ok(())
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Liveness probe. Never touches the engine.
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// Readiness as data: always 200, never an error.
async fn status(state: web::Data<AppState>) -> HttpResponse {
    let budgets = state.context.connections.cached_sync_ids().await;
    let ready = state.context.connections.is_connected() && !budgets.is_empty();
    HttpResponse::Ok().json(json!({
        "ok": true,
        "ready": ready,
        "budgets": budgets,
    }))
}

/// Static tool manifest for generic MCP frontends.
async fn capabilities() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "read": {
            "accounts": {
                "description": "List all accounts in Actual Budget",
                "args": []
            },
            "categories": {
                "description": "List all categories available for transactions",
                "args": []
            },
            "transactions": {
                "description": "Query recent transactions. Optional argument 'since' in YYYY-MM-DD format",
                "args": [
                    { "name": "since", "type": "string", "format": "YYYY-MM-DD", "required": false }
                ]
            },
            "monthly_summary": {
                "description": "Get a monthly summary for a given month (YYYY-MM)",
                "args": [
                    { "name": "month", "type": "string", "format": "YYYY-MM", "required": true }
                ]
            }
        },
        "write": {
            "add_transaction": {
                "description": "Add a transaction to Actual Budget",
                "args": [
                    { "name": "account", "type": "string", "required": true },
                    { "name": "category", "type": "string", "required": true },
                    { "name": "amount", "type": "number", "required": true },
                    { "name": "date", "type": "string", "format": "YYYY-MM-DD", "required": true },
                    { "name": "payee", "type": "string", "required": false },
                    { "name": "notes", "type": "string", "required": false },
                    { "name": "dryRun", "type": "boolean", "required": false },
                    { "name": "requestId", "type": "string", "required": false }
                ]
            }
        },
        "features": {
            "dryRun": true,
            "idempotency": true
        }
    }))
}

/// Engine-native account list.
async fn accounts_raw(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let accounts = state.context.entities.accounts().await?;
    Ok(HttpResponse::Ok().json(accounts))
}

/// Name/type/decimal-balance shaped account list.
async fn mcp_accounts(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let accounts = state.context.entities.accounts().await?;
    let views: Vec<AccountView> = accounts.iter().map(AccountView::from_account).collect();
    Ok(HttpResponse::Ok().json(views))
}

async fn mcp_categories(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let categories = state.context.entities.categories().await?;
    let views: Vec<CategoryView> = categories.iter().map(CategoryView::from_category).collect();
    Ok(HttpResponse::Ok().json(views))
}

async fn preview_transaction(
    state: web::Data<AppState>,
    req: HttpRequest,
    draft: web::Json<TransactionDraft>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let receipt = state.context.transactions.preview_add(&draft).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

async fn add_transaction(
    state: web::Data<AppState>,
    req: HttpRequest,
    draft: web::Json<TransactionDraft>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let receipt = state.context.transactions.apply_add(&draft).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

async fn edit_transaction(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    edit: web::Json<EditRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let receipt = state
        .context
        .transactions
        .apply_edit(&path, &edit)
        .await?;
    Ok(HttpResponse::Ok().json(receipt))
}

async fn delete_transaction(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let receipt = state.context.transactions.apply_delete(&path).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

async fn query_transactions(
    state: web::Data<AppState>,
    req: HttpRequest,
    filter: web::Json<QueryFilter>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let transactions = state.context.transactions.query(&filter).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

/// Generic dispatcher for frontends driving the capabilities manifest:
/// routes `{ tool, arguments }` onto the same services as the dedicated
/// endpoints. Unknown tools are a validation error.
async fn execute_tool(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ExecuteRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    match body.tool.as_str() {
        "accounts" => {
            let accounts = state.context.entities.accounts().await?;
            let views: Vec<AccountView> = accounts.iter().map(AccountView::from_account).collect();
            Ok(HttpResponse::Ok().json(views))
        }
        "categories" => {
            let categories = state.context.entities.categories().await?;
            let views: Vec<CategoryView> =
                categories.iter().map(CategoryView::from_category).collect();
            Ok(HttpResponse::Ok().json(views))
        }
        "transactions" => {
            let since = match body.arguments.get("since").and_then(Value::as_str) {
                Some(raw) => Some(raw.parse::<NaiveDate>().map_err(|_| {
                    BridgeError::ValidationError(format!(
                        "invalid 'since' date '{raw}', expected YYYY-MM-DD"
                    ))
                })?),
                None => None,
            };
            let transactions = state.context.transactions.recent(since).await?;
            Ok(HttpResponse::Ok().json(transactions))
        }
        "monthly_summary" => {
            let month = body
                .arguments
                .get("month")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    BridgeError::ValidationError(
                        "monthly_summary requires a 'month' argument".to_string(),
                    )
                })?;
            let summary = state.context.transactions.monthly_summary(month).await?;
            Ok(HttpResponse::Ok().json(summary))
        }
        "add_transaction" => {
            // The manifest advertises these as required for this tool.
            for field in ["account", "category", "amount", "date"] {
                if body.arguments.get(field).is_none() {
                    return Err(BridgeError::ValidationError(format!(
                        "add_transaction requires a '{field}' argument"
                    ))
                    .into());
                }
            }
            let draft: TransactionDraft =
                serde_json::from_value(body.arguments.clone()).map_err(|e| {
                    BridgeError::ValidationError(format!("invalid add_transaction arguments: {e}"))
                })?;
            let receipt = state.context.transactions.apply_add(&draft).await?;
            Ok(HttpResponse::Ok().json(receipt))
        }
        other => Err(BridgeError::ValidationError(format!("unknown tool '{other}'")).into()),
    }
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    since: Option<NaiveDate>,
}

/// Query sugar: transactions on/after `since`, newest first.
async fn recent_transactions(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<RecentQuery>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let transactions = state.context.transactions.recent(query.since).await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[derive(Debug, Deserialize)]
struct MonthQuery {
    month: String,
}

async fn monthly_summary(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, ApiError> {
    ensure_session(&state, &req).await?;
    let summary = state.context.transactions.monthly_summary(&query.month).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use actual_bridge_core::engine::LedgerEngine;
    use actual_bridge_core::error::BridgeResult;
    use actual_bridge_core::types::{
        Account, BudgetDefaults, BudgetMonth, Category, ConnectionConfig, NewTransaction,
        TransactionPatch, TransactionRecord,
    };
    use actual_bridge_core::ServiceContext;
    use async_trait::async_trait;
    use serde_json::Value;

    /// Minimal scriptable engine for handler tests.
    #[derive(Default)]
    struct StubEngine {
        accounts: Mutex<Vec<Account>>,
        categories: Mutex<Vec<Category>>,
        transactions: Mutex<Vec<TransactionRecord>>,
        adds: Mutex<usize>,
    }

    #[async_trait]
    impl LedgerEngine for StubEngine {
        async fn init(&self, _config: &ConnectionConfig) -> BridgeResult<()> {
            Ok(())
        }

        async fn download_budget(
            &self,
            _sync_id: &str,
            _password: Option<&str>,
        ) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_accounts(&self) -> BridgeResult<Vec<Account>> {
            Ok(self.accounts.lock().unwrap().clone())
        }

        async fn get_categories(&self) -> BridgeResult<Vec<Category>> {
            Ok(self.categories.lock().unwrap().clone())
        }

        async fn get_transactions(&self) -> BridgeResult<Vec<TransactionRecord>> {
            Ok(self.transactions.lock().unwrap().clone())
        }

        async fn add_transaction(
            &self,
            _account_id: &str,
            _tx: &NewTransaction,
        ) -> BridgeResult<String> {
            let mut adds = self.adds.lock().unwrap();
            *adds += 1;
            Ok(format!("tx-{adds}"))
        }

        async fn update_transaction(
            &self,
            _id: &str,
            _patch: &TransactionPatch,
        ) -> BridgeResult<()> {
            Ok(())
        }

        async fn delete_transaction(&self, _id: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_budget_month(&self, month: &str) -> BridgeResult<BudgetMonth> {
            Ok(BudgetMonth {
                month: month.to_string(),
                total_income: 300_000,
                total_spent: -22000,
            })
        }

        async fn shutdown(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn seeded_engine() -> Arc<StubEngine> {
        let engine = Arc::new(StubEngine::default());
        engine.accounts.lock().unwrap().push(Account {
            id: "acc-1".to_string(),
            name: "Checking".to_string(),
            kind: Some("checking".to_string()),
            balance: 123_45,
            closed: false,
        });
        engine.categories.lock().unwrap().push(Category {
            id: "cat-1".to_string(),
            name: "Food".to_string(),
            group_id: None,
            is_income: false,
        });
        engine
    }

    fn test_state(engine: Arc<StubEngine>, api_key: Option<&str>) -> web::Data<AppState> {
        let context = ServiceContext::new(
            engine,
            ConnectionConfig {
                server_url: "http://localhost:5006".to_string(),
                password: None,
            },
            BudgetDefaults::default(),
        );
        web::Data::new(AppState {
            context,
            api_key: api_key.map(str::to_string),
        })
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn health_works_without_engine() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], json!(true));
    }

    #[actix_web::test]
    async fn status_reports_not_ready_as_ok() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/mcp/status").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["ready"], json!(false));
        assert_eq!(body["budgets"], json!([]));
    }

    #[actix_web::test]
    async fn mcp_routes_require_the_configured_api_key() {
        let state = test_state(seeded_engine(), Some("secret"));
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/mcp/status").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/mcp/status")
                .insert_header(("x-api-key", "secret"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn add_transaction_resolves_names_and_returns_receipt() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/mcp/transactions/add")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .set_json(json!({
                    "account": "Checking",
                    "category": "Food",
                    "amount": -12.5,
                    "date": "2026-01-12",
                    "payee": "Lunch"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["transaction"]["account"], json!("Checking"));
        assert_eq!(body["transaction"]["category"], json!("Food"));
        assert_eq!(body["transaction"]["amount"], json!("-12.50"));
        assert!(body["transaction"]["id"].is_string());
    }

    #[actix_web::test]
    async fn dry_run_add_omits_id_and_skips_the_write() {
        let engine = seeded_engine();
        let state = test_state(Arc::clone(&engine), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/mcp/transactions/add")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .set_json(json!({
                    "account": "Checking",
                    "amount": -12.5,
                    "date": "2026-01-12",
                    "dryRun": true
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["transaction"]["id"].is_null());
        assert_eq!(*engine.adds.lock().unwrap(), 0);
    }

    #[actix_web::test]
    async fn missing_sync_id_without_default_is_bad_request() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/mcp/accounts").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("sync id"));
    }

    #[actix_web::test]
    async fn edit_of_unknown_transaction_is_not_found() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/mcp/transactions/ghost")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .set_json(json!({ "notes": "x" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("Transaction not found: ghost"));
    }

    #[actix_web::test]
    async fn accounts_view_carries_decimal_balances() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/mcp/accounts")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body[0]["name"], json!("Checking"));
        assert_eq!(body[0]["balance"], json!("123.45"));
    }

    #[actix_web::test]
    async fn monthly_summary_shapes_engine_totals() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/mcp/summary/month?month=2026-01")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["income"], json!("3000.00"));
        assert_eq!(body["expenses"], json!("220.00"));
        assert_eq!(body["net"], json!("2780.00"));
    }

    #[actix_web::test]
    async fn execute_dispatches_manifest_tools_onto_the_services() {
        let engine = seeded_engine();
        let state = test_state(Arc::clone(&engine), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/mcp/execute")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .set_json(json!({ "tool": "accounts", "arguments": {} }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body[0]["name"], json!("Checking"));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/mcp/execute")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .set_json(json!({
                    "tool": "add_transaction",
                    "arguments": {
                        "account": "Checking",
                        "category": "Food",
                        "amount": -12.5,
                        "date": "2026-01-12"
                    }
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], json!(true));
        assert_eq!(*engine.adds.lock().unwrap(), 1);
    }

    #[actix_web::test]
    async fn execute_rejects_unknown_tools() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/mcp/execute")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .set_json(json!({ "tool": "rebalance", "arguments": {} }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("unknown tool"));
    }

    #[actix_web::test]
    async fn execute_add_enforces_the_advertised_required_fields() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/mcp/execute")
                .insert_header(("x-actual-sync-id", "budget-a"))
                .set_json(json!({
                    "tool": "add_transaction",
                    "arguments": {
                        "account": "Checking",
                        "amount": -12.5,
                        "date": "2026-01-12"
                    }
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("category"));
    }

    #[actix_web::test]
    async fn capabilities_advertises_dry_run_and_idempotency() {
        let state = test_state(seeded_engine(), None);
        let app = test_app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/mcp/capabilities").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["features"]["dryRun"], json!(true));
        assert_eq!(body["features"]["idempotency"], json!(true));
        assert!(body["write"]["add_transaction"].is_object());
    }
}
