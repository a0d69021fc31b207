use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use waypoint_optimizer::error::OptimizeError;

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    InternalServerError,
}

impl From<OptimizeError> for ApiError {
    fn from(error: OptimizeError) -> Self {
        match error {
            OptimizeError::Validation(message) => ApiError::BadRequest(message),
            OptimizeError::NotFound(message) => ApiError::NotFound(message),
            OptimizeError::Provider(provider_error) => {
                ApiError::BadGateway(provider_error.to_string())
            }
            OptimizeError::Internal(message) => {
                // Log the detail, surface a generic message only.
                error!(message, "internal error");
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message).into_response(),
            ApiError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
