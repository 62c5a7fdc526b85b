//! HTTP layer for pg-gateway.
//!
//! Routes:
//! - `GET /tables` lists tables and their columns
//! - `POST /query` executes a statement and returns its rows
//! - anything else serves the static index file

mod handlers;
mod response;

pub use handlers::QueryRequest;
pub use response::{json_ok, status_for, text_error};

use crate::db::DatabaseClient;
use crate::error::{GatewayError, Result};
use axum::extract::Request;
use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeFile;
use tracing::info;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseClient>,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState, index: &Path) -> Router {
    Router::new()
        .route(
            "/tables",
            get(handlers::list_tables).fallback(handlers::method_not_allowed),
        )
        .route(
            "/query",
            post(handlers::execute_query).fallback(handlers::method_not_allowed),
        )
        .fallback_service(index_service(index))
        .with_state(state)
}

/// Serves the index file for every method. HEAD keeps its bodiless reply.
fn index_service(index: &Path) -> Router {
    Router::new()
        .fallback_service(ServeFile::new(index))
        .layer(middleware::map_request(serve_as_get))
}

async fn serve_as_get(mut request: Request) -> Request {
    if request.method() != Method::HEAD {
        *request.method_mut() = Method::GET;
    }
    request
}

/// Serves until `shutdown` resolves, then waits for in-flight requests.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GatewayError::internal(format!("HTTP server error: {e}")))
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}
