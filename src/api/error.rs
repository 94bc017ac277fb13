use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::domain::validation::ValidationErrors;
use crate::error::CatalogError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    Conflict(String),

    ValidationError(ValidationErrors),

    BadRequest(String),

    DatabaseError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::ValidationError(errors) => write!(f, "Validation error: {errors}"),
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, ApiResponse::<()>::error(msg)),
            Self::Conflict(msg) => (StatusCode::CONFLICT, ApiResponse::<()>::error(msg)),
            Self::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::<()>::invalid("validation failed", errors),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiResponse::<()>::error(msg)),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::<()>::error(
                        "the server encountered a problem and could not process your request",
                    ),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::RecordNotFound => Self::not_found(),
            CatalogError::EditConflict => Self::Conflict(
                "unable to update the record due to an edit conflict, please try again"
                    .to_string(),
            ),
            CatalogError::ValidationFailed(errors) => Self::ValidationError(errors),
            CatalogError::Storage(e) => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound("the requested resource could not be found".to_string())
    }
}
