//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Optionally install an OTLP-exporting tracer provider
//! - Configure log level from config and environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level

use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::TracerProvider};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ConfigError, ObservabilityConfig};

/// Keeps the tracer provider alive; flushes and shuts it down on drop.
pub struct TelemetryGuard {
    otel_enabled: bool,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if self.otel_enabled {
            tracing::info!("Shutting down OpenTelemetry");
            global::shutdown_tracer_provider();
        }
    }
}

/// Initialize the global subscriber and, when an OTLP endpoint is configured,
/// the global tracer provider.
pub fn init_logging(config: &ObservabilityConfig) -> Result<TelemetryGuard, ConfigError> {
    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer_provider)
        .transpose()?;

    let otel_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer("edge-headers")));

    let registry = tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(otel_layer);

    let result = if config.json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    result.map_err(|e| ConfigError::Telemetry(e.to_string()))?;

    let otel_enabled = provider.is_some();
    if let Some(provider) = provider {
        global::set_tracer_provider(provider);
    }

    tracing::info!(
        level = %config.log_level,
        json = config.json,
        otel_enabled,
        "Logging initialized"
    );

    Ok(TelemetryGuard { otel_enabled })
}

fn init_tracer_provider(endpoint: &str) -> Result<TracerProvider, ConfigError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| ConfigError::Telemetry(e.to_string()))?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .build())
}

fn build_env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "edge_headers={},tower_http=debug",
            config.log_level
        ))
    })
}
