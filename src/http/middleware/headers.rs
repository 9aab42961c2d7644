//! The headers middleware: a tower layer composing static header injection,
//! CORS and trace propagation around the next service.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{header, HeaderMap, Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::config::loader::{self, ConfigError};
use crate::config::validation::validate_headers;
use crate::config::HeadersConfig;
use crate::http::middleware::cors::CorsResponder;
use crate::http::middleware::injector::HeaderInjector;
use crate::observability::propagation::Propagation;

/// The configured middleware. Immutable once built and shared by every
/// request through an `Arc`.
pub struct Headers {
    injector: HeaderInjector,
    cors: Option<CorsResponder>,
    propagation: Propagation,
    /// Complete header set of a preflight response.
    preflight: HeaderMap,
    /// Headers merged into every other response after the next service ran.
    preset: HeaderMap,
}

impl Headers {
    /// Config root the section lives under.
    pub const ROOT: &'static str = "http";

    /// Middleware identity, also the name of the section and of its spans.
    pub const NAME: &'static str = "headers";

    /// Build from the `http.headers` section of a parsed config file.
    ///
    /// `Ok(None)` means the section is absent and the middleware stays
    /// disabled; the host should not wrap its handlers.
    pub fn init(table: &toml::Table) -> Result<Option<Self>, ConfigError> {
        match loader::headers_config(table, Self::ROOT, Self::NAME)? {
            Some(config) => Self::new(config).map(Some),
            None => {
                tracing::info!(
                    section = %format!("{}.{}", Self::ROOT, Self::NAME),
                    "Headers middleware disabled"
                );
                Ok(None)
            }
        }
    }

    pub fn new(config: HeadersConfig) -> Result<Self, ConfigError> {
        validate_headers(&config).map_err(ConfigError::Validation)?;

        let injector = HeaderInjector::new(&config);
        let cors = config.cors.as_ref().map(CorsResponder::new);
        let propagation = Propagation::new(Self::NAME);

        let fields = propagation.fields();
        for name in injector.request_names() {
            if fields.iter().any(|field| field == name.as_str()) {
                tracing::warn!(
                    header = %name,
                    "Static request header collides with a trace propagation header; both values will be sent"
                );
            }
        }

        let mut preflight = HeaderMap::new();
        let mut preset = HeaderMap::new();
        injector.apply_response(&mut preflight);
        injector.apply_response(&mut preset);
        if let Some(cors) = &cors {
            cors.preflight_headers(&mut preflight);
            cors.normal_headers(&mut preset);
        }

        tracing::info!(
            request_headers = config.request.len(),
            response_headers = config.response.len(),
            cors = cors.is_some(),
            "Headers middleware initialized"
        );

        Ok(Self {
            injector,
            cors,
            propagation,
            preflight,
            preset,
        })
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn layer(self) -> HeadersLayer {
        HeadersLayer::new(Arc::new(self))
    }

    /// Short-circuit response for a preflight request, if `req` is one.
    fn answer_preflight<B, R: Default>(&self, req: &Request<B>) -> Option<Response<R>> {
        let cors = self.cors.as_ref()?;
        if !cors.is_preflight(req.method()) {
            return None;
        }

        if cors.debug() {
            tracing::debug!(
                method = %req.method(),
                path = %req.uri().path(),
                origin = ?req.headers().get(header::ORIGIN),
                status = %cors.success_status(),
                "CORS preflight answered"
            );
        }

        let mut response = Response::new(R::default());
        *response.status_mut() = cors.success_status();
        *response.headers_mut() = self.preflight.clone();
        Some(response)
    }

    /// Merge the response preset. Names the downstream service already set
    /// or appended to are left alone; `Vary` entries are always added.
    fn decorate(&self, headers: &mut HeaderMap) {
        for name in self.preset.keys() {
            if name != header::VARY && headers.contains_key(name) {
                continue;
            }
            for value in self.preset.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
    }
}

/// [`Layer`] that wraps a service with [`HeadersService`].
#[derive(Clone)]
pub struct HeadersLayer {
    headers: Arc<Headers>,
}

impl HeadersLayer {
    pub fn new(headers: Arc<Headers>) -> Self {
        Self { headers }
    }
}

impl<S> Layer<S> for HeadersLayer {
    type Service = HeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeadersService {
            inner,
            headers: Arc::clone(&self.headers),
        }
    }
}

/// Service produced by [`HeadersLayer`].
///
/// Order per request: preflight short-circuit, span start and context
/// injection, static request headers, next service, response preset.
#[derive(Clone)]
pub struct HeadersService<S> {
    inner: S,
    headers: Arc<Headers>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let headers = Arc::clone(&self.headers);

        if let Some(response) = headers.answer_preflight::<ReqBody, ResBody>(&req) {
            return Box::pin(async move { Ok::<_, S::Error>(response) });
        }

        if headers.cors.as_ref().is_some_and(CorsResponder::debug) {
            tracing::debug!(
                method = %req.method(),
                path = %req.uri().path(),
                origin = ?req.headers().get(header::ORIGIN),
                "CORS headers applied"
            );
        }

        // The clone is not guaranteed to be ready; keep the one that was.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let _span = headers.propagation.start(&mut req);
            headers.injector.apply_request(req.headers_mut());

            let mut response = inner.call(req).await?;
            headers.decorate(response.headers_mut());
            Ok::<_, S::Error>(response)
        })
    }
}
