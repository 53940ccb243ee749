//! HTTP mapping for core errors.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use actual_bridge_core::BridgeError;
use serde_json::{json, Map, Value};

/// Wrapper giving [`BridgeError`] an HTTP status and a JSON body of the
/// form `{ "error": "...", "code": "...", "details": ... }`, where `code`
/// and `details` come from the error's serde representation.
#[derive(Debug)]
pub struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        Self(e)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            BridgeError::MissingSyncId | BridgeError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            BridgeError::AccountNotFound(_)
            | BridgeError::CategoryNotFound(_)
            | BridgeError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            BridgeError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            BridgeError::ConnectionError(_)
            | BridgeError::BudgetLoadError { .. }
            | BridgeError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            BridgeError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.0.is_expected() {
            tracing::warn!("{}", self.0);
        } else {
            tracing::error!("{}", self.0);
        }
        // The structured code/details pair plus a human-readable message.
        let mut body = match serde_json::to_value(&self.0) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => Map::new(),
        };
        body.insert("error".to_string(), json!(self.0.to_string()));
        HttpResponse::build(self.status_code()).json(body)
    }
}
