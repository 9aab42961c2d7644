//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the config file once
//! - Initialize logging and telemetry
//! - Initialize the headers middleware (or learn it is disabled)
//! - Bind the listener and serve until shutdown

use std::path::PathBuf;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::loader::{host_config, load_table};
use crate::config::ConfigError;
use crate::http::{Headers, HttpServer};
use crate::observability::logging::init_logging;

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options coming from the command line.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    pub bind_address: Option<String>,
}

/// Run the server until a shutdown signal arrives.
pub async fn start(options: StartupOptions) -> Result<(), StartupError> {
    let table = load_table(&options.config_path)?;
    let mut config = host_config(&table)?;
    if let Some(bind_address) = options.bind_address {
        config.listener.bind_address = bind_address;
    }

    let _telemetry = init_logging(&config.observability)?;

    tracing::info!(
        config = %options.config_path.display(),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        tracer_name = ?config.observability.tracer_name,
        "Configuration loaded"
    );

    let headers = Headers::init(&table)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(config, headers).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
