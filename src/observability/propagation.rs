//! Distributed tracing support.
//!
//! # Responsibilities
//! - Start a server span for requests that carry a tracer name
//! - Propagate trace context, baggage and Jaeger headers into the request
//! - Hand the new context to downstream services
//!
//! # Design Decisions
//! - Optional per request: without a [`TracerName`] extension nothing happens
//! - One composite propagator per middleware instance, shared read-only
//! - The span is owned by a guard so it ends on every exit path

use std::borrow::Cow;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use opentelemetry::propagation::{
    Extractor, Injector, TextMapCompositePropagator, TextMapPropagator,
};
use opentelemetry::trace::{SpanKind, TraceContextExt, Tracer, TracerProvider};
use opentelemetry::{global, Context, InstrumentationScope};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Name of the tracer the host wants spans recorded under.
///
/// The host inserts this into the request extensions when tracing is
/// enabled. Its absence is the normal "tracing off" case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerName(pub Cow<'static, str>);

impl TracerName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Text-map carrier over an HTTP header map.
///
/// `set` overwrites any existing value for the key. Keys or values that are
/// not valid header text are dropped.
pub struct HeaderCarrier<'a>(&'a mut HeaderMap);

impl<'a> HeaderCarrier<'a> {
    pub fn new(headers: &'a mut HeaderMap) -> Self {
        Self(headers)
    }
}

impl Injector for HeaderCarrier<'_> {
    fn set(&mut self, key: &str, value: String) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!(key, error = %e, "Skipping propagation field with invalid name");
                return;
            }
        };
        let value = match HeaderValue::from_str(&value) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "Skipping propagation field with invalid value");
                return;
            }
        };
        self.0.insert(name, value);
    }
}

impl Extractor for HeaderCarrier<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// Ends the span held by its context when dropped.
///
/// Dropping happens on normal return, on error, while unwinding from a panic
/// in a downstream service, and when the request future is cancelled.
#[must_use = "the span ends as soon as the guard is dropped"]
pub struct SpanGuard {
    cx: Context,
}

impl SpanGuard {
    pub fn context(&self) -> &Context {
        &self.cx
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.cx.span().end();
    }
}

/// Starts spans and injects their context into request headers.
pub struct Propagation {
    span_name: &'static str,
    propagator: TextMapCompositePropagator,
}

impl Propagation {
    /// Build the adapter. `span_name` is the middleware identity.
    pub fn new(span_name: &'static str) -> Self {
        let propagator = TextMapCompositePropagator::new(vec![
            Box::new(TraceContextPropagator::new()),
            Box::new(BaggagePropagator::new()),
            Box::new(opentelemetry_jaeger_propagator::Propagator::new()),
        ]);

        Self {
            span_name,
            propagator,
        }
    }

    /// Header names this adapter may write.
    pub fn fields(&self) -> Vec<String> {
        self.propagator.fields().map(String::from).collect()
    }

    /// Start a span for `req` and inject it into the request headers.
    ///
    /// Returns `None` without touching the request when no [`TracerName`] is
    /// present. Otherwise the new context replaces any context extension on
    /// the request and the returned guard keeps the span open.
    pub fn start<B>(&self, req: &mut Request<B>) -> Option<SpanGuard> {
        let tracer_name = req.extensions().get::<TracerName>()?.0.clone();

        let parent = req
            .extensions()
            .get::<Context>()
            .cloned()
            .unwrap_or_else(|| tracing::Span::current().context());

        let scope = InstrumentationScope::builder(tracer_name)
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(opentelemetry_semantic_conventions::SCHEMA_URL)
            .build();
        let tracer = global::tracer_provider().tracer_with_scope(scope);

        let span = tracer
            .span_builder(self.span_name)
            .with_kind(SpanKind::Server)
            .start_with_context(&tracer, &parent);
        let cx = parent.with_span(span);

        self.propagator
            .inject_context(&cx, &mut HeaderCarrier::new(req.headers_mut()));
        req.extensions_mut().insert(cx.clone());

        Some(SpanGuard { cx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::baggage::BaggageExt;
    use opentelemetry::trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};
    use opentelemetry::KeyValue;

    const TRACE_ID: u128 = 0x4bf92f3577b34da6a3ce929d0e0e4736;

    fn remote_parent() -> Context {
        Context::new().with_remote_span_context(SpanContext::new(
            TraceId::from_bytes(TRACE_ID.to_be_bytes()),
            SpanId::from_bytes(0x00f067aa0ba902b7u64.to_be_bytes()),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        ))
    }

    fn request() -> Request<()> {
        Request::builder().uri("/").body(()).unwrap()
    }

    #[test]
    fn test_carrier_set_overwrites() {
        let mut headers = HeaderMap::new();
        headers.insert("traceparent", HeaderValue::from_static("stale"));

        let mut carrier = HeaderCarrier::new(&mut headers);
        carrier.set("traceparent", "fresh".to_string());
        carrier.set("bad key", "ignored".to_string());

        assert_eq!(carrier.get("traceparent"), Some("fresh"));
        assert_eq!(carrier.keys(), vec!["traceparent"]);
        assert_eq!(headers.get_all("traceparent").iter().count(), 1);
    }

    #[test]
    fn test_fields_cover_all_formats() {
        let fields = Propagation::new("headers").fields();
        for expected in ["traceparent", "tracestate", "baggage", "uber-trace-id"] {
            assert!(fields.iter().any(|f| f == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_no_tracer_name_is_noop() {
        let propagation = Propagation::new("headers");
        let mut req = request();
        req.extensions_mut().insert(remote_parent());

        assert!(propagation.start(&mut req).is_none());
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_injects_parent_trace() {
        let propagation = Propagation::new("headers");
        let mut req = request();
        req.extensions_mut().insert(TracerName::new("host"));
        req.extensions_mut().insert(remote_parent());

        let guard = propagation.start(&mut req).expect("tracer name present");

        let trace_id = format!("{TRACE_ID:032x}");
        let traceparent = req.headers()["traceparent"].to_str().unwrap();
        assert!(traceparent.starts_with(&format!("00-{trace_id}-")));

        let jaeger = req.headers()["uber-trace-id"].to_str().unwrap();
        assert!(jaeger.starts_with(&trace_id));

        let stored = req.extensions().get::<Context>().unwrap();
        assert_eq!(
            stored.span().span_context().trace_id(),
            guard.context().span().span_context().trace_id()
        );
    }

    #[test]
    fn test_injects_baggage() {
        let propagation = Propagation::new("headers");
        let mut req = request();
        req.extensions_mut().insert(TracerName::new("host"));
        req.extensions_mut()
            .insert(remote_parent().with_baggage(vec![KeyValue::new("tenant", "acme")]));

        let _guard = propagation.start(&mut req);

        assert_eq!(req.headers()["baggage"], "tenant=acme");
    }
}
