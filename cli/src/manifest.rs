//! The `cumulocity.json` microservice manifest.

use serde::Deserialize;

/// Manifest file packed into the microservice image.
pub const MANIFEST_FILE: &str = "cumulocity.json";

/// The subset of the manifest the task runner needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Microservice API version.
    pub api_version: String,
    /// Image version.
    pub version: String,
    /// Isolation level (`MULTI_TENANT`/`PER_TENANT`).
    #[serde(default)]
    pub isolation: Option<String>,
    /// Roles the microservice requires in subscriber tenants.
    #[serde(default)]
    pub required_roles: Vec<String>,
}

/// Load the manifest from the working directory.
pub fn load() -> anyhow::Result<Manifest> {
    let raw = std::fs::read_to_string(MANIFEST_FILE)
        .map_err(|e| anyhow::anyhow!("cannot read {MANIFEST_FILE}: {e}"))?;
    let manifest: Manifest = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("cannot parse {MANIFEST_FILE}: {e}"))?;
    Ok(manifest)
}
