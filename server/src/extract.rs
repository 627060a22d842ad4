//! Request decoding with descriptive `bad_json_request` errors.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use todo_core::FieldErrors;

use crate::error::AppError;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// JSON body extractor. Unlike `axum::Json` it does not insist on a
/// `Content-Type` header, and every decoding failure becomes
/// [`AppError::BadJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::BadJson(format!(
                    "body must not be larger than {MAX_BODY_BYTES} bytes"
                ))
            } else {
                AppError::BadJson(rejection.body_text())
            }
        })?;
        decode(&bytes).map(JsonBody)
    }
}

/// Decode exactly one JSON value from `bytes`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadJson("body must not be empty".to_string()));
    }

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = T::deserialize(&mut de).map_err(describe)?;
    de.end().map_err(|_| {
        AppError::BadJson("body must only contain a single JSON value".to_string())
    })?;
    Ok(value)
}

fn describe(err: serde_json::Error) -> AppError {
    let message = match err.classify() {
        Category::Syntax => format!(
            "body contains badly-formed JSON (at line {}, column {})",
            err.line(),
            err.column()
        ),
        Category::Eof => "body contains badly-formed JSON".to_string(),
        Category::Data => {
            let text = err.to_string();
            if let Some(rest) = text.strip_prefix("unknown field ") {
                let key = rest.split(',').next().unwrap_or(rest);
                format!("body contains unknown key {key}")
            } else if let Some(rest) = text.strip_prefix("missing field ") {
                let key = rest.split(' ').next().unwrap_or(rest);
                format!("body is missing required key {key}")
            } else {
                format!("body contains incorrect JSON type ({text})")
            }
        }
        Category::Io => err.to_string(),
    };
    AppError::BadJson(message)
}

/// Parse a todo id taken from the request path.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| FieldErrors::single("id", "id must be a positive integer").into())
}
