//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, optional OTLP span export)
//!     → propagation.rs (server spans, trace headers on requests)
//!
//! Consumers:
//!     → stdout (human-readable or JSON)
//!     → OTLP collector (optional)
//!     → downstream services reading traceparent / baggage / uber-trace-id
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Spans are only started when the host names a tracer

pub mod logging;
pub mod propagation;

pub use propagation::{HeaderCarrier, Propagation, SpanGuard, TracerName};
