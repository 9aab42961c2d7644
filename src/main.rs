//! edge-headers
//!
//! Serves an echo endpoint wrapped in the headers middleware.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TraceLayer ─▶ TimeoutLayer ─▶ TracerName ─▶ Headers ─▶ echo handler
//!                                                                   │
//!                                                ┌──────────────────┼──────────────────┐
//!                                                │ preflight?       │ span + inject    │
//!                                                │ short-circuit    │ static request   │
//!                                                │                  │ response preset  │
//!                                                └──────────────────┴──────────────────┘
//!     Client Response
//!     ◀──────────────
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_headers::lifecycle::startup::{start, StartupOptions};

#[derive(Parser)]
#[command(name = "edge-headers")]
#[command(about = "Static header injection, CORS and trace propagation middleware", long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "edge-headers.toml")]
    config: PathBuf,

    /// Override `listener.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    start(StartupOptions {
        config_path: args.config,
        bind_address: args.bind,
    })
    .await?;

    Ok(())
}
