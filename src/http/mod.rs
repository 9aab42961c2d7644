//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace/timeout layers, tracer name)
//!     → middleware/ (headers, CORS, trace propagation)
//!     → echo handler
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{Headers, HeadersLayer};
pub use server::HttpServer;
