//! HTTP handlers for the two gateway endpoints.

use super::response::{json_ok, text_error};
use super::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Statement text, executed verbatim.
    pub sql: String,
}

/// `GET /tables`
pub async fn list_tables(State(state): State<AppState>) -> Response {
    match state.db.list_tables().await {
        Ok(tables) => {
            debug!(tables = tables.len(), "Listed tables");
            json_ok(&tables)
        }
        Err(e) => e.into_response(),
    }
}

/// `POST /query`
///
/// The body is parsed by hand so that any malformed body, including one sent
/// without a JSON content type, is a 400.
pub async fn execute_query(State(state): State<AppState>, body: Bytes) -> Response {
    let request: QueryRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected query request body: {e}");
            return text_error(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    debug!(sql = %request.sql, "Executing query");
    match state.db.execute_query(&request.sql).await {
        Ok(result) => {
            debug!(
                columns = result.columns.len(),
                rows = result.rows.len(),
                "Query complete"
            );
            json_ok(&result)
        }
        Err(e) => e.into_response(),
    }
}

pub async fn method_not_allowed() -> Response {
    text_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
