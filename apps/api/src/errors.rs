use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not fetch page: {0}")]
    FetchFailure(String),

    #[error("Context too big. Unable to parse jobs.")]
    ContextTooLarge,

    #[error("Portfolio store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Malformed portfolio source: {0}")]
    MalformedSource(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

impl AppError {
    /// Stable machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::FetchFailure(_) => "FETCH_FAILURE",
            AppError::ContextTooLarge => "CONTEXT_TOO_LARGE",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::MalformedSource(_) => "MALFORMED_SOURCE",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::FetchFailure(_) | AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::ContextTooLarge => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MalformedSource(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The single message shown to the user when a submission fails.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// Logs the error at a level matching its origin.
    pub fn log(&self) {
        match self {
            AppError::Validation(_) | AppError::ContextTooLarge => {
                tracing::warn!("{self}");
            }
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            other => tracing::error!("{other}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (self.status(), body).into_response()
    }
}
