/// Request extractors
///
/// [`ApiJson`] is `axum::Json` with rejections rendered as [`ApiError`], so a
/// malformed body gets the same JSON error format as every other failure.
///
/// ```text
/// POST /v1/tasks
/// { "title": "x", "category": 1 }
///
/// 422 { "error": "validation_error", "details": [{ "field": "priority", ... }] }
/// ```

use axum::extract::FromRequest;

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
