//! JSON envelopes and route error mapping.
//!
//! Every body leaves through [`camelize_keys`], so handlers and core models
//! stay snake_case.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mangarelay_core::{RelayError, camelize_keys};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::error;

/// `{code: "SUCCESS", message, data}`.
#[derive(Debug)]
pub struct Success<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.data) {
            Ok(data) => {
                let body = json!({"code": "SUCCESS", "message": self.message, "data": data});
                (StatusCode::OK, Json(camelize_keys(body))).into_response()
            }
            Err(err) => ApiError::Internal(err.to_string()).into_response(),
        }
    }
}

/// The resource a route serves; decides its 404 code and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Manga,
    Chapter,
    Image,
}

impl Resource {
    fn not_found(self) -> (&'static str, &'static str) {
        match self {
            Self::Manga => ("MANGA_NOT_FOUND", "Manga not found."),
            Self::Chapter => ("CHAPTER_NOT_FOUND", "Chapter not found."),
            Self::Image => ("IMAGE_NOT_FOUND", "Image not found."),
        }
    }
}

/// A failed request, rendered as `{code, message, ...extra}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(Resource),
    BadRequest { message: String, extra: Map<String, Value> },
    Internal(String),
}

impl ApiError {
    /// Maps a core error for a route that serves `resource`.
    ///
    /// Missing pages and malformed tokens both mean the resource does not
    /// exist; everything else is a server error.
    pub fn for_resource(resource: Resource, err: RelayError) -> Self {
        if err.is_not_found() { Self::NotFound(resource) } else { Self::from(err) }
    }

    pub fn bad_param(name: &str, value: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("param".to_string(), Value::from(name));
        extra.insert("value".to_string(), Value::from(value));
        Self::BadRequest { message: format!("Invalid {} parameter.", name), extra }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, extra) = match self {
            Self::NotFound(resource) => {
                let (code, message) = resource.not_found();
                (StatusCode::NOT_FOUND, code, message.to_string(), Map::new())
            }
            Self::BadRequest { message, extra } => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message, extra),
            Self::Internal(reason) => {
                error!(%reason, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Internal server error.".to_string(),
                    Map::new(),
                )
            }
        };

        let mut body = Map::new();
        body.insert("code".to_string(), Value::from(code));
        body.insert("message".to_string(), Value::from(message));
        body.extend(extra);

        (status, Json(camelize_keys(Value::Object(body)))).into_response()
    }
}
