//! `cumulo create-env`

use std::path::Path;

use super::{application_id, find_application};
use crate::{project, Cli};

pub async fn run(cli: &Cli, output: &Path) -> anyhow::Result<()> {
    let name = project::microservice_name(&cli.name)?;
    let client = cli.client()?;

    let application = find_application(&client, &name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("application '{name}' is not registered"))?;
    let bootstrap = client
        .application_bootstrap_user(application_id(&application)?)
        .await?;

    let content = format!(
        "C8Y_BASEURL={}\nC8Y_BOOTSTRAP_TENANT={}\nC8Y_BOOTSTRAP_USER={}\nC8Y_BOOTSTRAP_PASSWORD={}\n",
        client.base_url(),
        bootstrap.tenant,
        bootstrap.user,
        bootstrap.password,
    );
    std::fs::write(output, content)
        .map_err(|e| anyhow::anyhow!("cannot write {}: {e}", output.display()))?;
    println!("Wrote bootstrap credentials to {}.", output.display());
    Ok(())
}
