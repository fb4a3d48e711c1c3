use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde_json::json;
use whale_watch_core::errors::CoreError;

/// An HTTP error with a `{"error": message}` body.
///
/// Caller mistakes keep their message. Server-side failures are logged in
/// full and answered with a generic message.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn missing_fields() -> Self {
        Self::bad_request("Missing required fields")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Map a core error, answering server-side failures with `fallback`.
    pub fn with_context(err: CoreError, fallback: &str) -> Self {
        match err {
            CoreError::ValidationError(message) => Self::bad_request(message),
            e if e.is_client_error() => Self::bad_request(e.to_string()),
            CoreError::NotFound { entity, .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: format!("{entity} not found"),
            },
            e => {
                error!("{fallback}: {e}");
                Self::internal(fallback)
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::with_context(err, "Internal server error")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
