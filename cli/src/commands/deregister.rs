//! `cumulo deregister`

use super::{application_id, find_application};
use crate::{project, Cli};

pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    let name = project::microservice_name(&cli.name)?;
    let client = cli.client()?;

    match find_application(&client, &name).await? {
        Some(application) => {
            client
                .delete_application(application_id(&application)?)
                .await?;
            println!("Application '{name}' deregistered.");
        }
        None => println!("Application '{name}' appears not to be registered."),
    }
    Ok(())
}
