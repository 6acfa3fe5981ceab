use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dx_core::error::CoreError;
use dx_db::ThresholdRepoError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`ThresholdRepoError`] for
/// storage faults. Implements [`IntoResponse`] to produce consistent JSON
/// error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dx_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A threshold store failure.
    #[error(transparent)]
    Store(#[from] ThresholdRepoError),

    /// A malformed request body or query string.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Store(ThresholdRepoError::Invalid(CoreError::Validation(msg))) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Store(err) => {
                tracing::error!(
                    error = %err,
                    cause = ?std::error::Error::source(err),
                    "Threshold store error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
