//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Header names and values must be representable on the wire
//! - Preflight success status must be a valid HTTP status code
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HeadersConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system, so header writes at
//!   request time never fail

use axum::http::{HeaderName, HeaderValue, StatusCode};
use thiserror::Error;

use crate::config::schema::{CorsConfig, HeaderList, HeadersConfig};

/// A single semantic problem in the `http.headers` section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{section}: invalid header name {name:?}")]
    InvalidHeaderName { section: &'static str, name: String },

    #[error("{section}: invalid value for header {name:?}")]
    InvalidHeaderValue { section: &'static str, name: String },

    #[error("cors.optionsSuccessStatus: {0} is not a valid HTTP status")]
    InvalidStatus(u16),
}

/// Validate the headers section, collecting every error.
pub fn validate_headers(config: &HeadersConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_map("request", &config.request, &mut errors);
    check_map("response", &config.response, &mut errors);

    if let Some(cors) = &config.cors {
        check_cors(cors, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_map<'a>(
    section: &'static str,
    entries: impl IntoIterator<Item = (&'a String, &'a String)>,
    errors: &mut Vec<ValidationError>,
) {
    for (name, value) in entries {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                section,
                name: name.clone(),
            });
            continue;
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue {
                section,
                name: name.clone(),
            });
        }
    }
}

fn check_cors(cors: &CorsConfig, errors: &mut Vec<ValidationError>) {
    let lists: [(&'static str, &Option<HeaderList>); 4] = [
        ("allowedOrigin", &cors.allowed_origin),
        ("allowedHeaders", &cors.allowed_headers),
        ("allowedMethods", &cors.allowed_methods),
        ("exposedHeaders", &cors.exposed_headers),
    ];

    for (key, list) in lists {
        if let Some(list) = list {
            if HeaderValue::from_str(&list.joined()).is_err() {
                errors.push(ValidationError::InvalidHeaderValue {
                    section: "cors",
                    name: key.to_string(),
                });
            }
        }
    }

    if let Some(code) = cors.options_success_status {
        if code != 0 && StatusCode::from_u16(code).is_err() {
            errors.push(ValidationError::InvalidStatus(code));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config_passes() {
        let mut config = HeadersConfig::default();
        config.request.insert("X-Env".into(), "prod".into());
        config.response.insert("X-Powered-By".into(), "core".into());
        config.cors = Some(CorsConfig {
            allowed_origin: Some("https://a.test".into()),
            options_success_status: Some(204),
            ..Default::default()
        });

        assert!(validate_headers(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = HeadersConfig::default();
        config.request.insert("bad header".into(), "x".into());
        config.response.insert("X-Ok".into(), "line\nbreak".into());
        config.cors = Some(CorsConfig {
            allowed_origin: Some("https://a\0.test".into()),
            options_success_status: Some(1000),
            ..Default::default()
        });

        let errors = validate_headers(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::InvalidStatus(1000)));
        assert!(errors.contains(&ValidationError::InvalidHeaderName {
            section: "request",
            name: "bad header".into(),
        }));
    }

    #[test]
    fn test_zero_status_means_default() {
        let config = HeadersConfig {
            cors: Some(CorsConfig {
                options_success_status: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(validate_headers(&config).is_ok());
    }
}
