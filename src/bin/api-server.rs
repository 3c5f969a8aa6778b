//! Fusetrade API Server
//!
//! Serves signal analysis over HTTP. The model is loaded once at startup and
//! shared read-only; the service is stateless and can be horizontally scaled.

use dotenvy::dotenv;
use fusetrade::config::{self, AppConfig};
use fusetrade::core::http::start_server;
use fusetrade::inference::SequenceModel;
use fusetrade::logging;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    let env = config::get_environment();
    info!("Starting Fusetrade API Server");
    info!(environment = %env, "Environment");

    let model = SequenceModel::from_path(&config.model.path).map_err(|e| {
        error!(error = %e, path = %config.model.path.display(), "Failed to load sequence model");
        e
    })?;
    info!(
        model_version = model.model_version(),
        sequence_length = model.sequence_length(),
        "Sequence model loaded"
    );
    let model = Arc::new(model);

    info!(port = config.server.port, "HTTP Server: http://0.0.0.0:{}", config.server.port);

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        result = start_server(config, model) => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
                return Err(e);
            }
            error!("HTTP server stopped");
        }
    }

    info!("API server stopped");
    Ok(())
}
