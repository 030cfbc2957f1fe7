//! Mapping from garden errors to HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use pots_core::GardenError;

/// Error returned by every handler, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    /// Log the cause and hide it from the client.
    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{err:#}"), "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

fn status_for(err: &GardenError) -> StatusCode {
    match err {
        GardenError::PositionConflict { .. }
        | GardenError::OutOfBounds { .. }
        | GardenError::InvalidPlacement(_)
        | GardenError::Validation(_) => StatusCode::BAD_REQUEST,
        GardenError::NotFound { .. } => StatusCode::NOT_FOUND,
        GardenError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<GardenError> for AppError {
    fn from(err: GardenError) -> Self {
        match err {
            GardenError::Internal(cause) => Self::internal(cause),
            other => Self {
                status: status_for(&other),
                message: other.to_string(),
            },
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
