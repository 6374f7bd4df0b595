//! `cumulo upload`

use std::path::Path;

use super::{application_id, find_application};
use crate::{project, Cli};

pub async fn run(cli: &Cli, file: &Path) -> anyhow::Result<()> {
    let name = project::microservice_name(&cli.name)?;
    let client = cli.client()?;

    let application = find_application(&client, &name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("application '{name}' is not registered; run `cumulo register` first"))?;
    client
        .upload_application_binary(application_id(&application)?, file)
        .await?;
    println!("Uploaded {} to application '{name}'.", file.display());
    Ok(())
}
