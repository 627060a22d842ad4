//! Client-facing error envelope.
//!
//! # Design
//! Every failure leaves the server as
//! `{"code": ..., "message"?: ..., "messages"?: {field: message}}`.
//! Validation problems carry per-field `messages`; everything else carries a
//! single `message`. Internal failures are logged with full detail inside the
//! request span and returned opaque.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use todo_core::{FieldErrors, StoreError};
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AppError {
    /// The body could not be decoded at all.
    #[error("{0}")]
    BadJson(String),

    #[error("invalid input: {0}")]
    BadInput(#[from] FieldErrors),

    #[error("todo not found")]
    NotFound,

    #[error("edit conflict")]
    EditConflict,

    #[error("request deadline exceeded")]
    Timeout,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::EditConflict { .. } => Self::EditConflict,
            StoreError::Database(e) => Self::Internal(e.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    messages: Option<&'a FieldErrors>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadJson(_) | Self::BadInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EditConflict => StatusCode::CONFLICT,
            Self::Timeout | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadJson(_) => "bad_json_request",
            Self::BadInput(_) => "bad_input",
            Self::NotFound => "not_found",
            Self::EditConflict => "edit_conflict",
            Self::Timeout => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::BadJson(msg) => Some(msg.as_str()),
            Self::BadInput(_) => None,
            Self::NotFound => Some("the requested todo could not be found"),
            Self::EditConflict => {
                Some("unable to update the todo due to an edit conflict, please try again")
            }
            Self::Timeout => {
                warn!("request deadline exceeded");
                Some("the request took too long to complete")
            }
            Self::Internal(err) => {
                error!(error = ?err, "request failed");
                Some("the server encountered a problem and could not process your request")
            }
        };
        let messages = match &self {
            Self::BadInput(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorBody {
            code: self.code(),
            message,
            messages,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use todo_core::store::DatabaseError;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn store_errors_map_to_client_categories() {
        assert!(matches!(AppError::from(StoreError::NotFound(1)), AppError::NotFound));
        assert!(matches!(
            AppError::from(StoreError::EditConflict { id: 1, version: 0 }),
            AppError::EditConflict
        ));
        let db = AppError::from(StoreError::Database(DatabaseError::RowNotFound));
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.code(), "internal");
    }

    #[tokio::test]
    async fn validation_body_has_messages_only() {
        let (status, json) =
            body_json(AppError::BadInput(FieldErrors::single("task", "too short"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({"code": "bad_input", "messages": {"task": "too short"}})
        );
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let err = AppError::from(StoreError::Database(DatabaseError::Protocol(
            "disk I/O error on /var/lib/todos.db".to_string(),
        )));
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "internal");
        assert!(!json["message"].as_str().unwrap().contains("disk"));
        assert!(json.get("messages").is_none());
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let (status, json) = body_json(AppError::EditConflict).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "edit_conflict");
    }
}
