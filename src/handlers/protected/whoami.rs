// handlers/protected/whoami.rs - GET /api/protected
use axum::http::HeaderMap;
use chrono::Utc;
use serde_json::{json, Value};

use crate::middleware::auth::{USER_ID_HEADER, USER_ROLE_HEADER, USER_USERNAME_HEADER};
use crate::middleware::{ApiResponse, ApiResult};

/// Echo the user context the authorize middleware attached to this request
pub async fn protected(headers: HeaderMap) -> ApiResult<Value> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    Ok(ApiResponse::success(json!({
        "message": "Authentication successful!",
        "user": {
            "id": header(USER_ID_HEADER),
            "username": header(USER_USERNAME_HEADER),
            "role": header(USER_ROLE_HEADER),
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .message("Protected route accessed successfully"))
}
