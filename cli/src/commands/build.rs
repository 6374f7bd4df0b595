//! `cumulo build`

use std::process::Command;

use crate::{project, version, Cli, Isolation};

pub fn run(cli: &Cli, version_flag: Option<&str>, isolation: Option<Isolation>) -> anyhow::Result<()> {
    let name = project::microservice_name(&cli.name)?;
    let version = match version_flag {
        Some(v) => v.to_string(),
        None => version::resolve_version(),
    };
    let isolation = match isolation {
        Some(level) => level,
        None => project::isolation_from_file()?,
    };

    println!("Building {name} {version} ({})", isolation.as_str());
    let status = Command::new("./build.sh")
        .args([&name, &version, isolation.as_str()])
        .status()
        .map_err(|e| anyhow::anyhow!("cannot run ./build.sh: {e}"))?;
    if !status.success() {
        anyhow::bail!("build.sh exited with {status}");
    }
    Ok(())
}
