// HTTP API Error Types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;

/// Catalogue of error codes surfaced in `error.code`, so clients and logs can
/// tell failures apart without parsing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    MissingRequiredField,
    InvalidInputFormat,
    InvalidStatus,
    InvalidPriority,
    Unauthorized,
    Forbidden,
    NotFound,
    UserNotFound,
    ProjectNotFound,
    TaskNotFound,
    OrderNotFound,
    Conflict,
    DuplicateResource,
    InternalError,
    DatabaseFailure,
    InvalidUserId,
    InvalidProjectId,
    InvalidTaskId,
    InvalidOrderId,
    InvalidAmount,
    InvalidDate,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "E001",
            ErrorCode::MissingRequiredField => "E002",
            ErrorCode::InvalidInputFormat => "E003",
            ErrorCode::InvalidStatus => "E004",
            ErrorCode::InvalidPriority => "E005",
            ErrorCode::Unauthorized => "E401",
            ErrorCode::Forbidden => "E403",
            ErrorCode::NotFound => "E404",
            ErrorCode::UserNotFound => "E404U",
            ErrorCode::ProjectNotFound => "E404P",
            ErrorCode::TaskNotFound => "E404T",
            ErrorCode::OrderNotFound => "E404O",
            ErrorCode::Conflict => "E409",
            ErrorCode::DuplicateResource => "E409D",
            ErrorCode::InternalError => "E500",
            ErrorCode::DatabaseFailure => "E501",
            ErrorCode::InvalidUserId => "E9001",
            ErrorCode::InvalidProjectId => "E9002",
            ErrorCode::InvalidTaskId => "E9003",
            ErrorCode::InvalidOrderId => "E9004",
            ErrorCode::InvalidAmount => "E9005",
            ErrorCode::InvalidDate => "E9006",
        }
    }
}

/// A single failing field in a validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest { message: String, code: ErrorCode },
    ValidationError { message: String, field_errors: Vec<FieldError> },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound { message: String, code: ErrorCode },

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound { message, .. } => message,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Catalogue code for client handling
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::BadRequest { code, .. } => *code,
            ApiError::ValidationError { .. } => ErrorCode::ValidationError,
            ApiError::Unauthorized(_) => ErrorCode::Unauthorized,
            ApiError::Forbidden(_) => ErrorCode::Forbidden,
            ApiError::NotFound { code, .. } => *code,
            ApiError::Conflict(_) => ErrorCode::DuplicateResource,
            ApiError::InternalServerError(_) => ErrorCode::InternalError,
            ApiError::ServiceUnavailable(_) => ErrorCode::DatabaseFailure,
        }
    }

    /// Coarse error category, stable across codes
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut error = json!({
            "code": self.code().as_str(),
            "type": self.error_type(),
        });

        if let ApiError::ValidationError { field_errors, .. } = self {
            if !field_errors.is_empty() {
                error["details"] = json!(field_errors);
            }
        }

        json!({
            "success": false,
            "message": self.message(),
            "error": error,
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>, code: ErrorCode) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            code,
        }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::bad_request(message, ErrorCode::InvalidInputFormat)
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Vec<FieldError>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation failure on a single field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::ValidationError {
            field_errors: vec![FieldError::new(field, message.clone())],
            message,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::not_found_with(message, ErrorCode::NotFound)
    }

    pub fn not_found_with(message: impl Into<String>, code: ErrorCode) -> Self {
        ApiError::NotFound {
            message: message.into(),
            code,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { resource, id } => {
                ApiError::conflict(format!("{} '{}' already exists", resource, id))
            }
            StoreError::Taken { field, .. } => ApiError::conflict(taken_message(field)),
            StoreError::Connection(msg) => {
                tracing::error!("Storage connection error: {}", msg);
                ApiError::service_unavailable("Storage temporarily unavailable")
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            StoreError::Serialization(e) => {
                tracing::error!("Record serialization error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

/// `Username already exists` style message for a unique field clash
fn taken_message(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("{}{} already exists", first.to_uppercase(), chars.as_str()),
        None => "Resource already exists".to_string(),
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) | AuthError::MissingToken | AuthError::MalformedHeader => {
                ApiError::unauthorized("Invalid token")
            }
            AuthError::MissingSecret | AuthError::TokenGeneration(_) | AuthError::PasswordHash(_) => {
                tracing::error!("Authentication failure: {}", err);
                ApiError::internal_server_error("Authentication is unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON with the wrong shape: wrong types, unknown enum values
            JsonRejection::JsonDataError(err) => {
                let detail = err.body_text();
                let message = detail
                    .split_once(": ")
                    .map(|(_, rest)| rest.to_string())
                    .unwrap_or(detail);
                ApiError::validation_error(message, Vec::new())
            }
            other => {
                tracing::debug!("Rejected request body: {}", other.body_text());
                ApiError::invalid_body("Invalid request body")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_field_details() {
        let err = ApiError::validation_error(
            "Validation Error",
            vec![
                FieldError::new("name", "Name is required"),
                FieldError::new("latitude", "Latitude must be less than or equal to 90"),
            ],
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation Error");
        assert_eq!(body["error"]["code"], "E001");
        assert_eq!(body["error"]["details"][1]["field"], "latitude");
    }

    #[test]
    fn not_found_carries_resource_code() {
        let err = ApiError::not_found_with("Project not found", ErrorCode::ProjectNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let body = err.to_json();
        assert_eq!(body["error"]["code"], "E404P");
        assert_eq!(body["error"]["type"], "NOT_FOUND");
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn store_duplicate_maps_to_conflict() {
        let err: ApiError = StoreError::Duplicate {
            resource: "users",
            id: "user-1".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), ErrorCode::DuplicateResource);
    }

    #[test]
    fn taken_field_names_the_field() {
        let err: ApiError = StoreError::Taken {
            resource: "users",
            field: "email",
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "Email already exists");
    }
}
