//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse into a table, look up `http.headers`)
//!     → validation.rs (semantic checks)
//!     → HeadersConfig (validated, immutable)
//!     → shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All host fields have defaults to allow minimal configs
//! - A missing `http.headers` section disables the middleware, it is not an
//!   error
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{CorsConfig, HeaderList, HeadersConfig, HostConfig, ObservabilityConfig};
