use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::ScoutError;

use crate::server::dto::ErrorResponse;

/// Errors returned by the API handlers
#[derive(Debug)]
pub enum ApiError {
    /// The request body failed validation
    BadRequest(String),

    /// The crawl itself failed or was cancelled
    Crawl(ScoutError),
}

impl From<ScoutError> for ApiError {
    fn from(err: ScoutError) -> Self {
        Self::Crawl(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, "validation_error", message),
            Self::Crawl(err) => {
                let error_type = match &err {
                    ScoutError::Cancelled { .. } => "crawl_cancelled",
                    ScoutError::Sink(_) => "output_error",
                    ScoutError::UrlParse(_) | ScoutError::UrlError(_) => "invalid_seed",
                    _ => "crawl_error",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, error_type, err.to_string())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}
