//! Configuration loading from disk.
//!
//! The config file is parsed once into a [`toml::Table`]. Host sections are
//! deserialized from the whole table; the middleware section is looked up
//! under the two-level key `http.headers`.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{HeadersConfig, HostConfig};
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Telemetry setup failed: {0}")]
    Telemetry(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read and parse a TOML file into a raw table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_table(&content)
}

/// Parse TOML text into a raw table.
pub fn parse_table(content: &str) -> Result<toml::Table, ConfigError> {
    Ok(content.parse::<toml::Table>()?)
}

/// Deserialize the host sections. Unknown sections (such as `http`) are
/// ignored here.
pub fn host_config(table: &toml::Table) -> Result<HostConfig, ConfigError> {
    Ok(toml::Value::Table(table.clone()).try_into()?)
}

/// Look up `<root>.<section>` and deserialize it into the headers schema.
///
/// Returns `Ok(None)` when either level is missing (the component is
/// disabled), and a parse error when the section exists but has the wrong
/// shape. Semantic validation is left to [`Headers::new`].
///
/// [`Headers::new`]: crate::http::middleware::Headers::new
pub fn headers_config(
    table: &toml::Table,
    root: &str,
    section: &str,
) -> Result<Option<HeadersConfig>, ConfigError> {
    let Some(root_value) = table.get(root) else {
        return Ok(None);
    };
    let Some(value) = root_value.get(section) else {
        return Ok(None);
    };

    let config: HeadersConfig = value.clone().try_into()?;

    Ok(Some(config))
}
