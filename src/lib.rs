//! Header injection, CORS and trace propagation middleware for HTTP services.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{HeadersConfig, HostConfig};
pub use http::{Headers, HeadersLayer, HttpServer};
pub use observability::TracerName;
