// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::FieldErrors;
use serde_json::json;

/// Error type for every handler.
///
/// Turns into a JSON body `{"error": ..., "code": ...}`; validation failures
/// also carry `"fields"` with the messages for each offending field.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A path segment that cannot name any record, such as a non-numeric id.
    #[error("Not found: {0}")]
    UnknownPath(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store and storage failures, reported with `anyhow` context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } | AppError::UnknownPath(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::UnknownPath(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Unauthorized(msg) => json!({ "error": msg, "code": "UNAUTHORIZED" }),
            AppError::NotFound { .. } => json!({ "error": self.to_string(), "code": "NOT_FOUND" }),
            AppError::UnknownPath(_) => json!({ "error": "Not found.", "code": "NOT_FOUND" }),
            AppError::Validation(fields) => json!({
                "error": "Validation failed",
                "code": "VALIDATION_ERROR",
                "fields": fields,
            }),
            AppError::BadRequest(msg) => json!({ "error": msg, "code": "BAD_REQUEST" }),
            AppError::Database(sqlx::Error::RowNotFound) => {
                json!({ "error": "Resource not found", "code": "NOT_FOUND" })
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                json!({ "error": "An internal error occurred.", "code": "INTERNAL_ERROR" })
            }
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {:?}", err);
                json!({ "error": "An internal error occurred.", "code": "INTERNAL_ERROR" })
            }
        };

        if status.is_client_error() {
            tracing::debug!(
                "Responding with error: status_code={}, message={}",
                status.as_u16(),
                self
            );
        }

        (status, Json(body)).into_response()
    }
}
