//! CORS response headers and preflight detection.
//!
//! Preflight and normal responses carry different header sets:
//!
//! | header                             | preflight | normal |
//! |------------------------------------|-----------|--------|
//! | `Vary`                             | 3 entries | Origin |
//! | `Access-Control-Allow-Origin`      | yes       | yes    |
//! | `Access-Control-Allow-Headers`     | yes       | yes    |
//! | `Access-Control-Allow-Methods`     | yes       | no     |
//! | `Access-Control-Expose-Headers`    | no        | yes    |
//! | `Access-Control-Allow-Credentials` | yes       | yes    |
//! | `Access-Control-Max-Age`           | yes       | no     |
//!
//! Every optional header is omitted when its setting is unset or empty.

use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};

use crate::config::{CorsConfig, HeaderList};

const VARY_ORIGIN: &str = "Origin";
const VARY_REQUEST_METHOD: &str = "Access-Control-Request-Method";
const VARY_REQUEST_HEADERS: &str = "Access-Control-Request-Headers";

/// Header values derived once from [`CorsConfig`].
#[derive(Debug, Clone)]
pub struct CorsResponder {
    allow_origin: Option<HeaderValue>,
    allow_headers: Option<HeaderValue>,
    allow_methods: Option<HeaderValue>,
    expose_headers: Option<HeaderValue>,
    allow_credentials: Option<HeaderValue>,
    max_age: Option<HeaderValue>,
    success_status: StatusCode,
    debug: bool,
}

impl CorsResponder {
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            allow_origin: list_value(config.allowed_origin.as_ref()),
            allow_headers: list_value(config.allowed_headers.as_ref()),
            allow_methods: list_value(config.allowed_methods.as_ref()),
            expose_headers: list_value(config.exposed_headers.as_ref()),
            allow_credentials: config.allow_credentials.map(|allow| {
                HeaderValue::from_static(if allow { "true" } else { "false" })
            }),
            max_age: (config.max_age > 0).then(|| HeaderValue::from(config.max_age)),
            success_status: config.success_status(),
            debug: config.debug,
        }
    }

    /// Every `OPTIONS` request is treated as a preflight.
    pub fn is_preflight(&self, method: &Method) -> bool {
        method == Method::OPTIONS
    }

    pub fn success_status(&self) -> StatusCode {
        self.success_status
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Headers of a short-circuited preflight response.
    pub fn preflight_headers(&self, headers: &mut HeaderMap) {
        headers.append(header::VARY, HeaderValue::from_static(VARY_ORIGIN));
        headers.append(header::VARY, HeaderValue::from_static(VARY_REQUEST_METHOD));
        headers.append(header::VARY, HeaderValue::from_static(VARY_REQUEST_HEADERS));

        set_optional(headers, header::ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origin);
        set_optional(headers, header::ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers);
        set_optional(headers, header::ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods);
        set_optional(headers, header::ACCESS_CONTROL_ALLOW_CREDENTIALS, &self.allow_credentials);
        set_optional(headers, header::ACCESS_CONTROL_MAX_AGE, &self.max_age);
    }

    /// Headers added to every non-preflight response.
    pub fn normal_headers(&self, headers: &mut HeaderMap) {
        headers.append(header::VARY, HeaderValue::from_static(VARY_ORIGIN));

        set_optional(headers, header::ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origin);
        set_optional(headers, header::ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers);
        set_optional(headers, header::ACCESS_CONTROL_EXPOSE_HEADERS, &self.expose_headers);
        set_optional(headers, header::ACCESS_CONTROL_ALLOW_CREDENTIALS, &self.allow_credentials);
    }
}

fn list_value(list: Option<&HeaderList>) -> Option<HeaderValue> {
    let joined = list?.joined();
    if joined.is_empty() {
        return None;
    }
    HeaderValue::from_str(&joined).ok()
}

fn set_optional(headers: &mut HeaderMap, name: header::HeaderName, value: &Option<HeaderValue>) {
    if let Some(value) = value {
        headers.insert(name, value.clone());
    }
}
