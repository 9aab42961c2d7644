//! Static request/response header injection.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;

use crate::config::HeadersConfig;

/// Applies the configured `request` and `response` header maps.
#[derive(Debug, Clone, Default)]
pub struct HeaderInjector {
    request: Vec<(HeaderName, HeaderValue)>,
    response: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderInjector {
    /// Build from a validated config. Entries that are not valid header text
    /// are skipped; validation reports them before this point.
    pub fn new(config: &HeadersConfig) -> Self {
        Self {
            request: to_pairs(&config.request),
            response: to_pairs(&config.response),
        }
    }

    /// Append every configured request header. A value the client already
    /// sent under the same name is kept.
    pub fn apply_request(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.request {
            headers.append(name.clone(), value.clone());
        }
    }

    /// Set every configured response header, replacing existing values.
    pub fn apply_response(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.response {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn request_names(&self) -> impl Iterator<Item = &HeaderName> {
        self.request.iter().map(|(name, _)| name)
    }
}

fn to_pairs(map: &BTreeMap<String, String>) -> Vec<(HeaderName, HeaderValue)> {
    map.iter()
        .filter_map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
            let value = HeaderValue::from_str(value).ok()?;
            Some((name, value))
        })
        .collect()
}
