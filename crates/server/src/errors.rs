use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::ServiceError;
use tracing::error;
use utoipa::ToSchema;

/// Error body written for every non-2xx response: `{"error": "..."}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidArgument(detail) => ApiError::bad_request(detail),
            ServiceError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, "not found"),
            ServiceError::Duplicate(_) => ApiError::new(StatusCode::CONFLICT, "already exists"),
            ServiceError::Internal(detail) => {
                // 内部细节只写日志，不返回给调用方
                error!(error = %detail, "internal error");
                ApiError::internal()
            }
        }
    }
}
