use super::test_mocks::*;
use super::*;

use crate::schemas::{
    AccountsArg, AddTransactionParams, DeleteTransactionParams, EditTransactionParams,
    ListAccountsParams, MonthlySummaryParams, QueryTransactionsParams,
};

fn extract_text(result: &CallToolResult) -> &str {
    result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.as_str())
        .expect("expected text content in result")
}

fn add_params() -> AddTransactionParams {
    AddTransactionParams {
        account: "Checking".to_string(),
        amount: -10.5,
        date: "2026-01-19".to_string(),
        notes: Some("coffee".to_string()),
        payee: None,
        category: None,
        request_id: None,
        dry_run: None,
    }
}

#[test]
fn sanitize_internal_error_hides_error_details() {
    let error = sanitize_internal_error("sensitive: token=123", "List accounts");
    let message = error.to_string();
    assert!(message.contains("List accounts failed"));
    assert!(!message.contains("token=123"));
}

#[tokio::test]
async fn list_accounts_passes_bridge_json_through() {
    let gateway = Arc::new(MockBridgeGateway::default());
    let server = build_server(Arc::clone(&gateway));

    let result = server
        .list_accounts(Parameters(ListAccountsParams {}))
        .await
        .unwrap();

    assert_eq!(gateway.accounts_calls().await, 1);
    let text = extract_text(&result);
    assert!(text.contains("Checking"));
    assert!(text.contains("123.45"));
}

#[tokio::test]
async fn add_transaction_builds_payload_without_absent_fields() {
    let gateway = Arc::new(MockBridgeGateway::default());
    let server = build_server(Arc::clone(&gateway));

    let result = server.add_transaction(Parameters(add_params())).await;
    assert!(result.is_ok());

    let calls = gateway.add_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["account"], json!("Checking"));
    assert_eq!(calls[0]["amount"], json!(-10.5));
    assert_eq!(calls[0]["notes"], json!("coffee"));
    assert!(calls[0].get("payee").is_none());
    assert!(calls[0].get("category").is_none());
    assert!(calls[0].get("dryRun").is_none());
}

#[tokio::test]
async fn add_transaction_forwards_idempotency_and_dry_run() {
    let gateway = Arc::new(MockBridgeGateway::default());
    let server = build_server(Arc::clone(&gateway));

    let mut params = add_params();
    params.request_id = Some("req-1".to_string());
    params.dry_run = Some(true);

    server.add_transaction(Parameters(params)).await.unwrap();

    let calls = gateway.add_calls().await;
    assert_eq!(calls[0]["requestId"], json!("req-1"));
    assert_eq!(calls[0]["dryRun"], json!(true));
}

#[tokio::test]
async fn edit_transaction_sends_only_supplied_fields() {
    let gateway = Arc::new(MockBridgeGateway::default());
    let server = build_server(Arc::clone(&gateway));

    let result = server
        .edit_transaction(Parameters(EditTransactionParams {
            transaction_id: "tx-1".to_string(),
            amount: None,
            date: None,
            category: None,
            notes: Some("weekly run".to_string()),
            cleared: None,
            account: None,
        }))
        .await;
    assert!(result.is_ok());

    let calls = gateway.edit_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "tx-1");
    assert_eq!(calls[0].1["notes"], json!("weekly run"));
    assert!(calls[0].1.get("amount").is_none());
    assert!(calls[0].1.get("cleared").is_none());
}

#[tokio::test]
async fn delete_transaction_targets_the_given_id() {
    let gateway = Arc::new(MockBridgeGateway::default());
    let server = build_server(Arc::clone(&gateway));

    server
        .delete_transaction(Parameters(DeleteTransactionParams {
            transaction_id: "tx-9".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(gateway.delete_calls().await, vec!["tx-9".to_string()]);
}

#[tokio::test]
async fn query_accepts_single_account_string() {
    let gateway = Arc::new(MockBridgeGateway::default());
    let server = build_server(Arc::clone(&gateway));

    server
        .query_transactions(Parameters(QueryTransactionsParams {
            accounts: Some(AccountsArg::One("Checking".to_string())),
            category: None,
            start_date: None,
            end_date: None,
            min_amount: None,
            max_amount: Some(0.0),
            search: None,
            limit: Some(10),
        }))
        .await
        .unwrap();

    let calls = gateway.query_calls().await;
    assert_eq!(calls[0]["accounts"], json!("Checking"));
    assert_eq!(calls[0]["max_amount"], json!(0.0));
    assert_eq!(calls[0]["limit"], json!(10));
    assert!(calls[0].get("category").is_none());
}

#[tokio::test]
async fn monthly_summary_passes_the_month_through() {
    let gateway = Arc::new(MockBridgeGateway::default());
    let server = build_server(Arc::clone(&gateway));

    let result = server
        .get_monthly_summary(Parameters(MonthlySummaryParams {
            month: "2026-01".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(gateway.summary_calls().await, vec!["2026-01".to_string()]);
    assert!(extract_text(&result).contains("2780.00"));
}

#[tokio::test]
async fn bridge_rejection_surfaces_its_message() {
    let gateway = Arc::new(MockBridgeGateway::default());
    gateway.set_error(404, "Account not found: Brokerage").await;
    let server = build_server(Arc::clone(&gateway));

    let error = server
        .add_transaction(Parameters(add_params()))
        .await
        .unwrap_err();

    let message = error.to_string();
    assert!(message.contains("404"));
    assert!(message.contains("Account not found: Brokerage"));
}

#[tokio::test]
async fn get_info_contains_expected_instructions() {
    let server = build_server(Arc::new(MockBridgeGateway::default()));

    let info = server.get_info();

    assert_eq!(info.protocol_version, ProtocolVersion::LATEST);
    let instructions = info.instructions.unwrap_or_default();
    assert!(instructions.contains("list_accounts"));
    assert!(instructions.contains("dry_run"));
}

#[tokio::test]
async fn slow_bridge_call_times_out() {
    let gateway = Arc::new(MockBridgeGateway::default());
    gateway.set_delay(Some(Duration::from_millis(100))).await;
    let server = build_server_with_timeouts(
        Arc::clone(&gateway),
        ToolTimeouts {
            read: Duration::from_millis(10),
            write: Duration::from_millis(10),
        },
    );

    let error = server
        .list_accounts(Parameters(ListAccountsParams {}))
        .await
        .unwrap_err();

    assert!(error.to_string().contains("timeout"));
}
