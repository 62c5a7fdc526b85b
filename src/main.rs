//! pg-gateway - A minimal HTTP gateway to a PostgreSQL database.

use pg_gateway::cli::Cli;
use pg_gateway::config::Config;
use pg_gateway::error::{GatewayError, Result};
use pg_gateway::server::{self, AppState};
use pg_gateway::{db, logging};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment may already be set
    let dotenv = dotenvy::dotenv();

    logging::init_stderr_logging();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {e}");
        }
    }

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // Precedence: CLI arguments and environment, then config file, then defaults
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.merge(&cli.to_config());
    let settings = config.into_settings()?;

    info!("Connecting to {}", settings.connection.display_string());
    let client = db::connect(&settings.connection).await?;

    let listener = TcpListener::bind(settings.listen)
        .await
        .map_err(|e| GatewayError::internal(format!("Failed to bind {}: {e}", settings.listen)))?;

    let router = server::build_router(AppState::new(client.clone()), &settings.index);

    info!("Server starting on {}...", settings.listen);
    let served = server::serve(listener, router, server::shutdown_signal()).await;

    info!("Closing database connections");
    client.close().await?;

    served
}
