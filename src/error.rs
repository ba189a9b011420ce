//! HTTP error type. Every handler failure becomes a JSON body
//! `{"error", "message", "fields"}` with a matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::schema::{FieldError, ValidationErrors};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Rejected payload (400).
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Malformed request that is not tied to a field (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing resource (404).
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// Uniqueness or reference violation (409).
    #[error("{0}")]
    Conflict(String),

    /// Logged, answered generically (500).
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(errors) => json!({
                "error": "validation_error",
                "message": errors.to_string(),
                "fields": errors.by_field(),
            }),
            Self::BadRequest(message) => json!({
                "error": "bad_request",
                "message": message,
            }),
            Self::NotFound { .. } => json!({
                "error": "not_found",
                "message": self.to_string(),
            }),
            Self::Conflict(message) => json!({
                "error": "conflict",
                "message": message,
            }),
            Self::Internal(message) => {
                tracing::error!(error = %message, "internal error");
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred",
                })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<FieldError> for AppError {
    fn from(e: FieldError) -> Self {
        Self::Validation(e.into())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::Validation(errors) => Self::Validation(errors),
            other @ (StoreError::Database(_) | StoreError::Corrupt(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400_with_fields() {
        let err = AppError::from(FieldError::ReadOnly { field: "id".into() });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["fields"]["id"][0], "this field is read-only");
    }

    #[tokio::test]
    async fn store_not_found_is_404() {
        let err: AppError = StoreError::not_found("recipe", "abc").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "recipe 'abc' not found");
    }

    #[tokio::test]
    async fn store_conflict_is_409() {
        let err: AppError =
            StoreError::Conflict("duplicate value violates users_email_key".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn database_error_is_hidden() {
        let err: AppError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "an internal error occurred");
    }
}
