use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// HTTP-facing wrapper around the core error taxonomy.
///
/// Response bodies stay small and generic: validation problems echo
/// their user-correctable message, everything upstream or internal is
/// collapsed so no provider body, stack trace, or credential can leak.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub postern_core::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use postern_core::Error;

        let (status, error_message) = match &self.0 {
            Error::InvalidRequest(validation) => (StatusCode::BAD_REQUEST, validation.to_string()),
            Error::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, self.0.to_string()),
            Error::DeliveryFailed(_) => (
                StatusCode::BAD_GATEWAY,
                "Failed to send magic link".to_string(),
            ),
            Error::InvalidOrExpired => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            Error::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        let mut response = (status, body).into_response();

        if let Some(retry_after) = self.0.retry_after() {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                header::HeaderValue::from(retry_after.num_seconds().max(1) as u64),
            );
        }

        response
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
