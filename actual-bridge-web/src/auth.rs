//! Shared-secret auth for the `/mcp` scope.

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::web;
use serde_json::json;

use crate::state::AppState;

/// Reject requests whose `x-api-key` header does not match the configured
/// key. When no key is configured the check is disabled (logged as
/// insecure at startup).
pub async fn require_api_key(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let configured = req
        .app_data::<web::Data<AppState>>()
        .and_then(|state| state.api_key.clone());

    if let Some(expected) = configured {
        let presented = req
            .headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            let response = actix_web::HttpResponse::Unauthorized()
                .json(json!({ "error": "invalid or missing x-api-key" }));
            return Ok(req.into_response(response));
        }
    }

    next.call(req).await
}
