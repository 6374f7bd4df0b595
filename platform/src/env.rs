//! Environment helpers.
//!
//! The platform injects its connection parameters as `C8Y_*` environment
//! variables. For local runs the same variables can come from an env file
//! (`.env-ms` by convention): UTF-8, one `KEY=VALUE` per line, no quoting
//! or escaping, `#` comments and blank lines ignored. Variables already
//! present in the process environment always win.

use std::path::Path;

use crate::error::PlatformError;

/// Load an env file if it exists. Returns the number of variables set.
///
/// Missing file is not an error; local testing is the only consumer.
pub fn load_env_file(path: impl AsRef<Path>) -> std::io::Result<usize> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(0);
    }
    let content = std::fs::read_to_string(path)?;
    let mut loaded = 0;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || std::env::var_os(key).is_some() {
            continue;
        }
        std::env::set_var(key, value);
        loaded += 1;
    }
    tracing::debug!(?path, loaded, "env file loaded");
    Ok(loaded)
}

/// Read a required environment variable.
pub fn require_var(key: &str) -> Result<String, PlatformError> {
    std::env::var(key)
        .map_err(|_| PlatformError::Config(format!("environment variable {key} is not set")))
}

/// Read an optional environment variable, `None` when unset or empty.
pub fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// All `C8Y_*` keys currently set, for startup logging. Values for keys
/// containing `PASSWORD` are masked.
pub fn platform_vars() -> Vec<String> {
    let mut vars: Vec<String> = std::env::vars()
        .filter(|(k, _)| k.starts_with("C8Y_"))
        .map(|(k, v)| {
            if k.contains("PASSWORD") {
                format!("{k}=***")
            } else {
                format!("{k}={v}")
            }
        })
        .collect();
    vars.sort();
    vars
}
