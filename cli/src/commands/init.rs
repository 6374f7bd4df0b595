//! `cumulo init`

use regex::Regex;

use crate::project::{ISOLATION_FILE, NAME_FILE};
use crate::{Cli, Isolation};

pub fn run(cli: &Cli, isolation: Isolation) -> anyhow::Result<()> {
    let name = cli
        .name
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--name is required for init"))?;
    validate_name(name)?;

    std::fs::write(NAME_FILE, format!("{name}\n"))
        .map_err(|e| anyhow::anyhow!("cannot write {NAME_FILE}: {e}"))?;
    std::fs::write(ISOLATION_FILE, format!("{}\n", isolation.as_str()))
        .map_err(|e| anyhow::anyhow!("cannot write {ISOLATION_FILE}: {e}"))?;
    println!("Initialized microservice '{name}' ({}).", isolation.as_str());
    Ok(())
}

fn validate_name(name: &str) -> anyhow::Result<()> {
    // Also the docker image name, so the platform's naming rules apply.
    let pattern = Regex::new("^[a-zA-Z][a-zA-Z0-9-]+$").map_err(anyhow::Error::from)?;
    if !pattern.is_match(name) {
        anyhow::bail!(
            "invalid name '{name}': must start with a letter, followed by letters, digits or dashes"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(validate_name("my-service").is_ok());
        assert!(validate_name("svc2").is_ok());
        assert!(validate_name("2fast").is_err());
        assert!(validate_name("-lead").is_err());
        assert!(validate_name("has space").is_err());
        assert!(validate_name("x").is_err()); // at least two characters
    }
}
