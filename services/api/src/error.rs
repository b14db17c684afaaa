//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, json};
use thiserror::Error;
use uuid::Uuid;

/// Custom error type for the API service
///
/// Validation failures that concern a single input field carry the field
/// name so the response can attribute the message to it.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Caller is not authenticated
    #[error("authentication credentials were not provided")]
    Unauthorized,

    /// Caller is authenticated but not allowed to do this
    #[error("you do not have permission to perform this action")]
    PermissionDenied,

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A collection field that must not be empty was empty
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// A collection field referenced the same entity twice
    #[error("{field} must not contain duplicates")]
    DuplicateEntry { field: &'static str },

    /// A collection field referenced an entity that does not exist
    #[error("object with id {id} does not exist")]
    UnknownEntry { field: &'static str, id: Uuid },

    /// A numeric field fell below its lower bound
    #[error("{field} must be at least {min}")]
    TooSmall { field: &'static str, min: i32 },

    /// A numeric field fell outside its accepted range
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i32,
        max: i32,
    },

    /// A field failed a shape check, with a caller-facing message
    #[error("{message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// A user tried to subscribe to their own account
    #[error("cannot subscribe to yourself")]
    SelfFollow,

    /// The relation being added already exists
    #[error("{0}")]
    AlreadyExists(String),

    /// The relation being removed was not there
    #[error("{0}")]
    NotPresent(String),

    /// Login failed; deliberately does not say which credential was wrong
    #[error("unable to log in with the provided credentials")]
    InvalidCredentials,

    /// Invariant breakage that callers cannot act on
    #[error("internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// The input field this failure is attributed to, when there is one
    fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::EmptyField { field }
            | ApiError::DuplicateEntry { field }
            | ApiError::UnknownEntry { field, .. }
            | ApiError::TooSmall { field, .. }
            | ApiError::OutOfRange { field, .. }
            | ApiError::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self, status: StatusCode) -> serde_json::Value {
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return json!({ "detail": "internal server error" });
        }
        if let Some(field) = self.field() {
            let mut errors = Map::new();
            errors.insert(field.to_string(), json!(self.to_string()));
            return json!({ "errors": errors });
        }
        if status == StatusCode::BAD_REQUEST {
            return json!({ "errors": self.to_string() });
        }
        json!({ "detail": self.to_string() })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(err) => tracing::error!("database failure: {err}"),
            ApiError::Internal(detail) => tracing::error!("internal failure: {detail}"),
            _ => {}
        }

        let status = self.status();
        let body = Json(self.body(status));

        (status, body).into_response()
    }
}

/// Convert a storage error into `AlreadyExists` when it is a uniqueness
/// violation; everything else stays a database failure
pub fn remap_unique_violation(err: sqlx::Error, message: impl Into<String>) -> ApiError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            ApiError::AlreadyExists(message.into())
        }
        other => ApiError::Database(other),
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::PermissionDenied.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("recipe").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::AlreadyExists("recipe is already in favorites".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_field_errors_are_keyed_by_field() {
        let response = ApiError::EmptyField { field: "tags" }.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["errors"]["tags"], "tags must not be empty");
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let response = ApiError::Internal("hydration dropped a recipe".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["detail"], "internal server error");
    }
}
