//! Response serialization.
//!
//! # Responsibilities
//! - Encode success payloads as JSON
//! - Encode failures as the `{"error": "..."}` envelope
//!
//! # Design Decisions
//! - Success and error bodies share `content-type: application/json`
//! - 204 responses carry no body and no content type

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Uniform error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

/// JSON body with the given status.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, Json(body)).into_response()
}

/// Error envelope with the given status.
pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorEnvelope {
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
