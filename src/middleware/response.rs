use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{Page, Pagination};

/// Wrapper for API responses that automatically adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub pagination: Option<Pagination>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: "Success".to_string(),
            pagination: None,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            status_code: Some(status_code),
            ..Self::success(data)
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// One page of a list endpoint, with its pagination block
    pub fn page(page: Page<T>) -> Self {
        Self {
            pagination: Some(page.pagination),
            ..Self::success(page.items)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data",
                        "error": { "code": "E500", "type": "INTERNAL_SERVER_ERROR" }
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({
            "success": true,
            "message": self.message,
            "data": data_value,
        });

        if let Some(pagination) = self.pagination {
            envelope["pagination"] = json!(pagination);
        }

        (status, Json::<Value>(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{paginate, PageRequest};
    use axum::body::to_bytes;

    async fn body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_response_uses_201_and_envelope() {
        let response = ApiResponse::created(json!({"id": 1}))
            .message("Project created successfully")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Project created successfully");
        assert_eq!(body["data"]["id"], 1);
        assert!(body.get("pagination").is_none());
    }

    #[tokio::test]
    async fn page_response_includes_pagination() {
        let page = paginate((1..=25).collect::<Vec<u32>>(), PageRequest { page: 3, limit: 10 });
        let body = body(ApiResponse::page(page).into_response()).await;

        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["pagination"]["total"], 25);
        assert_eq!(body["pagination"]["totalPages"], 3);
    }
}
