//! Unified error handling for the JSON API.
//!
//! Every handler returns `Result<_, ApiError>`; the engine's error taxonomy
//! maps onto HTTP statuses here and nowhere else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kasir_engine::EngineError;

/// Body shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Application-level error type for the API: an engine error plus its
/// HTTP mapping.
#[derive(Debug)]
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            EngineError::Validation(_) | EngineError::Invalid(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
            EngineError::Conflict(_) | EngineError::InvalidState(_) => StatusCode::CONFLICT,
            EngineError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match &self.0 {
            EngineError::Validation(_) | EngineError::Invalid(_) => "validation",
            EngineError::NotFound { .. } => "not_found",
            EngineError::Forbidden(_) => "forbidden",
            EngineError::Conflict(_) => "conflict",
            EngineError::InvalidState(_) => "invalid_state",
            EngineError::Db(_) => "infrastructure",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The engine already logged the cause; clients get the generic line.
        let message = match &self.0 {
            EngineError::Db(_) => "Database operation failed".to_string(),
            other => other.to_string(),
        };

        let status = self.status();
        let body = ErrorBody {
            code: self.code(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
