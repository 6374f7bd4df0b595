//! Project-file conventions.
//!
//! A microservice project carries two marker files next to its manifest:
//! `MICROSERVICE_NAME` with the application name and `ISOLATION` with the
//! isolation level. `cumulo init` writes them; the other commands read
//! them as defaults.

use crate::Isolation;

/// File holding the default application name.
pub const NAME_FILE: &str = "MICROSERVICE_NAME";
/// File holding the default isolation level.
pub const ISOLATION_FILE: &str = "ISOLATION";

/// Resolve the microservice name: explicit flag, else the project file.
pub fn microservice_name(flag: &Option<String>) -> anyhow::Result<String> {
    if let Some(name) = flag {
        return Ok(name.clone());
    }
    let raw = std::fs::read_to_string(NAME_FILE).map_err(|e| {
        anyhow::anyhow!("cannot read {NAME_FILE} (pass --name or run `cumulo init`): {e}")
    })?;
    let name = raw.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("{NAME_FILE} is empty");
    }
    Ok(name)
}

/// Resolve the isolation level from the project file.
pub fn isolation_from_file() -> anyhow::Result<Isolation> {
    let raw = std::fs::read_to_string(ISOLATION_FILE).map_err(|e| {
        anyhow::anyhow!("cannot read {ISOLATION_FILE} (pass --isolation or run `cumulo init`): {e}")
    })?;
    Isolation::parse(&raw)
}
