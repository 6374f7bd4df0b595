//! `cumulo credentials`

use super::{application_id, find_application};
use crate::{project, Cli};

pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    let name = project::microservice_name(&cli.name)?;
    let client = cli.client()?;

    let application = find_application(&client, &name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("application '{name}' is not registered"))?;
    let bootstrap = client
        .application_bootstrap_user(application_id(&application)?)
        .await?;

    println!("tenant:   {}", bootstrap.tenant);
    println!("user:     {}", bootstrap.user);
    println!("password: {}", bootstrap.password);
    Ok(())
}
