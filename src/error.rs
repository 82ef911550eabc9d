use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::common::JsonResponse;

pub const LOGIN_INVALID: &str = "Login invalid. Please login again";
const POSTGRES_UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Push error: {0}")]
    Push(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A failure the caller wants surfaced verbatim as a 500, e.g. `System Error: <cause>`.
    #[error("{0}")]
    System(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidParams(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_)
            | AppError::Duplicate(_)
            | AppError::Storage(_)
            | AppError::Mail(_)
            | AppError::Push(_)
            | AppError::Internal(_)
            | AppError::System(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Turns a unique-constraint violation into [`AppError::Duplicate`]; any other
/// error is passed through.
pub fn map_unique_violation(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(POSTGRES_UNIQUE_VIOLATION) {
            return AppError::Duplicate(message.to_string());
        }
    }
    AppError::Database(err)
}

/// Same as [`map_unique_violation`] for errors already lifted into [`AppError`].
pub fn map_duplicate(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Database(db_err) => map_unique_violation(db_err, message),
        other => other,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AppError::Validation(errors) => {
                let details = serde_json::to_value(&errors).unwrap_or_default();
                (status, Json(JsonResponse::fail_with("Invalid field value", details))).into_response()
            }
            AppError::InvalidParams(detail) => {
                (status, Json(JsonResponse::fail_with("Invalid Params", detail))).into_response()
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (status, Json(JsonResponse::fail("System Error"))).into_response()
            }
            AppError::Storage(ref e) | AppError::Mail(ref e) | AppError::Push(ref e) | AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (status, Json(JsonResponse::fail("System Error"))).into_response()
            }
            AppError::System(message) => {
                tracing::error!("{}", message);
                (status, Json(JsonResponse::fail(message))).into_response()
            }
            AppError::Duplicate(message)
            | AppError::BadRequest(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message)
            | AppError::NotFound(message)
            | AppError::MethodNotAllowed(message)
            | AppError::Conflict(message)
            | AppError::Unprocessable(message) => (status, Json(JsonResponse::fail(message))).into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_error_taxonomy() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::MethodNotAllowed("x".into()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Duplicate("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Unprocessable("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_non_database_errors_are_not_duplicates() {
        let err = map_unique_violation(sqlx::Error::RowNotFound, "Duplicate asset code value violates");
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_map_duplicate_keeps_other_variants() {
        let err = map_duplicate(AppError::BadRequest("bad".into()), "dup");
        assert!(matches!(err, AppError::BadRequest(m) if m == "bad"));
    }

    #[test]
    fn test_database_error_response_is_generic() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
