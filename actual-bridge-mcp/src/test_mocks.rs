use super::*;

use tokio::sync::Mutex;

use crate::client::ClientError;

/// Scriptable gateway: records every call and returns canned bridge JSON.
#[derive(Default)]
pub struct MockBridgeGateway {
    accounts_calls: Mutex<usize>,
    categories_calls: Mutex<usize>,
    summary_calls: Mutex<Vec<String>>,
    add_calls: Mutex<Vec<Value>>,
    edit_calls: Mutex<Vec<(String, Value)>>,
    delete_calls: Mutex<Vec<String>>,
    query_calls: Mutex<Vec<Value>>,
    /// When Some, every call fails with a `Rejected` error.
    error: Mutex<Option<(u16, String)>>,
    /// When Some, every call sleeps first (for timeout tests).
    delay: Mutex<Option<Duration>>,
}

impl MockBridgeGateway {
    pub async fn set_error(&self, status: u16, message: &str) {
        *self.error.lock().await = Some((status, message.to_string()));
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    pub async fn accounts_calls(&self) -> usize {
        *self.accounts_calls.lock().await
    }

    pub async fn summary_calls(&self) -> Vec<String> {
        self.summary_calls.lock().await.clone()
    }

    pub async fn add_calls(&self) -> Vec<Value> {
        self.add_calls.lock().await.clone()
    }

    pub async fn edit_calls(&self) -> Vec<(String, Value)> {
        self.edit_calls.lock().await.clone()
    }

    pub async fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().await.clone()
    }

    pub async fn query_calls(&self) -> Vec<Value> {
        self.query_calls.lock().await.clone()
    }

    async fn interfere(&self) -> ClientResult<()> {
        if let Some(delay) = *self.delay.lock().await {
            tokio::time::sleep(delay).await;
        }
        if let Some((status, message)) = self.error.lock().await.clone() {
            return Err(ClientError::Rejected { status, message });
        }
        Ok(())
    }
}

#[async_trait]
impl BridgeGateway for MockBridgeGateway {
    async fn get_accounts(&self) -> ClientResult<Value> {
        *self.accounts_calls.lock().await += 1;
        self.interfere().await?;
        Ok(json!([
            { "id": "acc-1", "name": "Checking", "type": "checking", "balance": "123.45" }
        ]))
    }

    async fn get_categories(&self) -> ClientResult<Value> {
        *self.categories_calls.lock().await += 1;
        self.interfere().await?;
        Ok(json!([{ "id": "cat-1", "name": "Food" }]))
    }

    async fn get_monthly_summary(&self, month: &str) -> ClientResult<Value> {
        self.summary_calls.lock().await.push(month.to_string());
        self.interfere().await?;
        Ok(json!({
            "month": month, "income": "3000.00", "expenses": "220.00", "net": "2780.00"
        }))
    }

    async fn add_transaction(&self, payload: &Value) -> ClientResult<Value> {
        self.add_calls.lock().await.push(payload.clone());
        self.interfere().await?;
        Ok(json!({
            "ok": true,
            "transaction": { "id": "tx-1", "account": "Checking" },
            "message": "transaction added"
        }))
    }

    async fn edit_transaction(&self, id: &str, payload: &Value) -> ClientResult<Value> {
        self.edit_calls
            .lock()
            .await
            .push((id.to_string(), payload.clone()));
        self.interfere().await?;
        Ok(json!({ "ok": true, "transaction": { "id": id }, "message": "transaction updated" }))
    }

    async fn delete_transaction(&self, id: &str) -> ClientResult<Value> {
        self.delete_calls.lock().await.push(id.to_string());
        self.interfere().await?;
        Ok(json!({ "ok": true, "deleted": { "id": id }, "message": "deleted" }))
    }

    async fn query_transactions(&self, payload: &Value) -> ClientResult<Value> {
        self.query_calls.lock().await.push(payload.clone());
        self.interfere().await?;
        Ok(json!([]))
    }
}

pub(super) fn build_server(gateway: Arc<MockBridgeGateway>) -> ActualBridgeMcp {
    ActualBridgeMcp::with_gateway_and_timeouts(gateway, ToolTimeouts::default())
}

pub(super) fn build_server_with_timeouts(
    gateway: Arc<MockBridgeGateway>,
    timeouts: ToolTimeouts,
) -> ActualBridgeMcp {
    ActualBridgeMcp::with_gateway_and_timeouts(gateway, timeouts)
}
