//! Request/response middleware.
//!
//! # Data Flow
//! ```text
//! request
//!     → headers.rs (preflight? answer with cors.rs headers, stop)
//!     → observability::propagation (span + trace headers, if a tracer is named)
//!     → injector.rs (static request headers)
//!     → next service
//!     → headers.rs (static response headers, cors.rs normal headers)
//! ```

pub mod cors;
pub mod headers;
pub mod injector;

pub use cors::CorsResponder;
pub use headers::{Headers, HeadersLayer, HeadersService};
pub use injector::HeaderInjector;
