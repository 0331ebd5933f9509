use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections render through the standard error envelope.
///
/// Malformed JSON becomes a 400 "Invalid request body"; a body with the wrong
/// shape (bad types, unknown enum values) becomes a 400 validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);
