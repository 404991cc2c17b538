/// Error types for engagement-service
///
/// Errors are converted to appropriate HTTP responses for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for engagement-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed identifiers or bad pagination parameters; never retried
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Target entity absent from the content store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Disallowed state transition (e.g. self-subscription)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Race on tuple uniqueness; resolved internally by the toggle
    /// coordinator and never surfaced from the toggle path
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Aggregation requested for an owner that cannot be resolved
    #[error("Stats not computable: {0}")]
    NotComputable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::InvalidOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotComputable(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidArgument("page".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("video".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidOperation("self subscription".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("tuple".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotComputable("owner".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
