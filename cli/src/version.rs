//! Image version derivation from the git history.
//!
//! A clean checkout on a tag builds `x.y.z`. Commits past the tag add a
//! `-cNN` suffix; uncommitted changes add a `-rYYMMDDHHMM` stamp so every
//! local build gets a distinct tag.

use std::process::Command;

use chrono::{DateTime, Local};

/// Derive the image version, falling back to `0.0.0` outside a tagged
/// git checkout.
pub fn resolve_version() -> String {
    match git_describe() {
        Ok(describe) => format_describe(&describe, Local::now()),
        Err(e) => {
            eprintln!("Warning: {e}, using version 0.0.0");
            "0.0.0".to_string()
        }
    }
}

fn git_describe() -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--long", "--dirty"])
        .output()
        .map_err(|e| anyhow::anyhow!("cannot run git: {e}"))?;
    if !output.status.success() {
        anyhow::bail!("git describe failed (no tags?)");
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Turn `git describe --tags --long --dirty` output into a version tag.
fn format_describe(describe: &str, now: DateTime<Local>) -> String {
    let (core, dirty) = match describe.strip_suffix("-dirty") {
        Some(core) => (core, true),
        None => (describe, false),
    };

    // `<tag>-<distance>-g<hash>`; the tag itself may contain dashes.
    let mut version = core.to_string();
    let mut parts = core.rsplitn(3, '-');
    if let (Some(hash), Some(distance), Some(tag)) = (parts.next(), parts.next(), parts.next()) {
        if hash.starts_with('g') {
            if let Ok(commits) = distance.parse::<u32>() {
                version = tag.trim_start_matches('v').to_string();
                if commits > 0 {
                    version.push_str(&format!("-c{commits}"));
                }
            }
        }
    }

    if dirty {
        version.push_str(&now.format("-r%y%m%d%H%M").to_string());
    }
    version
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_clean_tag() {
        assert_eq!(format_describe("1.2.3-0-g1a2b3c4", at()), "1.2.3");
        assert_eq!(format_describe("v1.2.3-0-g1a2b3c4", at()), "1.2.3");
    }

    #[test]
    fn test_commits_past_the_tag() {
        assert_eq!(format_describe("1.2.3-14-g1a2b3c4", at()), "1.2.3-c14");
    }

    #[test]
    fn test_dirty_checkout_gets_a_stamp() {
        assert_eq!(
            format_describe("1.2.3-0-g1a2b3c4-dirty", at()),
            "1.2.3-r2405011030"
        );
        assert_eq!(
            format_describe("1.2.3-2-g1a2b3c4-dirty", at()),
            "1.2.3-c2-r2405011030"
        );
    }

    #[test]
    fn test_tag_containing_dashes() {
        assert_eq!(format_describe("rel-1.2-5-g1a2b3c4", at()), "rel-1.2-c5");
    }
}
