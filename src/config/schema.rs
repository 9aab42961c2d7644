//! Configuration schema definitions.
//!
//! Two groups of types live here: the host sections (`listener`, `timeouts`,
//! `observability`) and the headers middleware section found under the
//! two-level key `http.headers`. All types derive Serde traits for
//! deserialization from TOML.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Root configuration for the host server.
///
/// The `http.headers` section is not part of this struct: it is looked up
/// separately so that its absence can be reported as "disabled".
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,

    /// Tracer name handed to the middleware through the request extensions.
    /// Unset means requests carry no tracer and no span is started.
    pub tracer_name: Option<String>,

    /// OTLP gRPC endpoint. When set, an SDK tracer provider with a batch
    /// exporter is installed globally.
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            tracer_name: None,
            otlp_endpoint: None,
        }
    }
}

/// The `http.headers` section.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct HeadersConfig {
    /// Headers appended to every inbound request.
    pub request: BTreeMap<String, String>,

    /// Headers set on every outbound response.
    pub response: BTreeMap<String, String>,

    /// CORS settings. `None` disables CORS handling entirely.
    pub cors: Option<CorsConfig>,
}

/// CORS settings, keyed in camelCase in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsConfig {
    pub allowed_origin: Option<HeaderList>,
    pub allowed_headers: Option<HeaderList>,
    pub allowed_methods: Option<HeaderList>,
    pub exposed_headers: Option<HeaderList>,

    /// `None` means the credentials header is never emitted. `Some(false)`
    /// emits `"false"`.
    pub allow_credentials: Option<bool>,

    /// Preflight cache lifetime in seconds; `<= 0` omits the header.
    pub max_age: i64,

    /// Status of a successful preflight response. Unset or 0 means 200.
    pub options_success_status: Option<u16>,

    /// Log every CORS decision at debug level.
    pub debug: bool,
}

impl CorsConfig {
    /// Status code written for preflight responses.
    ///
    /// Falls back to 200 when the configured value is unset, zero, or not a
    /// valid status (validation rejects the latter before this is reached).
    pub fn success_status(&self) -> StatusCode {
        self.options_success_status
            .filter(|code| *code != 0)
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK)
    }
}

/// A header value given either as a string or as a list of strings.
///
/// A string is used verbatim (it may already be a comma-separated list). A
/// list is joined with `", "`, keeping order and duplicates.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum HeaderList {
    One(String),
    Many(Vec<String>),
}

impl HeaderList {
    /// The value as it is written to the header.
    pub fn joined(&self) -> String {
        match self {
            HeaderList::One(value) => value.trim().to_string(),
            HeaderList::Many(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for HeaderList {
    fn from(value: &str) -> Self {
        HeaderList::One(value.to_string())
    }
}
