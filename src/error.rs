use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// A coded failure at the procedure boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed validation, or the request makes no sense (e.g. following yourself)
    #[error("{0}")]
    BadRequest(String),
    /// The procedure requires a signed-in caller
    #[error("you must be signed in")]
    Unauthorized,
    /// The caller is signed in but does not own the resource
    #[error("{0}")]
    Forbidden(String),
    /// A referenced record does not exist
    #[error("{0}")]
    NotFound(String),
    /// A unique value is already taken
    #[error("{0}")]
    Conflict(String),
    /// An upstream service failed; the message is safe to show to clients
    #[error("{0}")]
    Internal(String),
    /// The data store failed
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) | Self::Db(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) | Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::BadRequest(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Db(err) => {
                tracing::error!(error = %err, "database failure");
                "internal server error".to_owned()
            }
            Self::Internal(msg) => {
                tracing::error!(message = %msg, "procedure failed");
                msg.clone()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            code: self.code(),
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Whether the store rejected a write because a unique key (or composite primary key) was taken.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
