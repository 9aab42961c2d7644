//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the echo handler
//! - Wire up middleware (headers, tracer name, timeout, HTTP tracing)
//! - Bind server to listener
//! - Graceful shutdown on Ctrl-C / SIGTERM

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::Request,
    routing::any,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{add_extension::AddExtensionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::HostConfig;
use crate::http::middleware::Headers;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::propagation::TracerName;

/// HTTP server hosting the headers middleware.
pub struct HttpServer {
    router: Router,
    config: HostConfig,
}

impl HttpServer {
    /// Create a new HTTP server. `headers` is `None` when the middleware is
    /// disabled, in which case handlers are served unwrapped.
    pub fn new(config: HostConfig, headers: Option<Headers>) -> Self {
        let router = Self::build_router(&config, headers);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers added later run first: HTTP tracing, then the timeout, then the
    /// tracer name extension, then the headers middleware.
    #[allow(deprecated)]
    fn build_router(config: &HostConfig, headers: Option<Headers>) -> Router {
        let mut router = Router::new()
            .route("/", any(echo_handler))
            .route("/{*path}", any(echo_handler));

        if let Some(headers) = headers {
            tracing::info!(middleware = headers.name(), "Wrapping handlers");
            router = router.layer(headers.layer());
        }

        if let Some(name) = &config.observability.tracer_name {
            router = router.layer(AddExtensionLayer::new(TracerName::new(name.clone())));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

/// What the echo handler saw.
#[derive(Debug, Serialize)]
struct Echo {
    method: String,
    path: String,
    headers: BTreeMap<String, Vec<String>>,
}

/// Echoes the request line and headers back as JSON, so the effect of the
/// request-side middleware is visible to the client.
async fn echo_handler(request: Request) -> Json<Echo> {
    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in request.headers() {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        header_count = headers.len(),
        "Echoing request"
    );

    Json(Echo {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        headers,
    })
}
