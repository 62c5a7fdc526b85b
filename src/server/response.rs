//! Response helpers shared by the handlers.
//!
//! Success bodies are JSON; every error body is plain text carrying the
//! underlying error message.

use crate::error::GatewayError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

/// Serializes `value` as a 200 JSON response.
pub fn json_ok<T>(value: &T) -> Response
where
    T: Serialize,
{
    match serde_json::to_string(value) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => text_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("json encode error: {e}"),
        ),
    }
}

/// Builds a plain-text error response.
pub fn text_error(status: StatusCode, message: impl Into<String>) -> Response {
    let mut body = message.into();
    body.push('\n');
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// HTTP status for an error: caller mistakes are 400, everything else 500.
pub fn status_for(error: &GatewayError) -> StatusCode {
    if error.is_client_fault() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!("{}: {}", self.category(), self);
        } else {
            warn!("{}: {}", self.category(), self);
        }
        text_error(status, self.to_string())
    }
}
