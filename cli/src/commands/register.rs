//! `cumulo register`

use cumulo_platform::apps::Application;
use cumulo_platform::PlatformError;

use super::{application_id, find_application};
use crate::{manifest, project, Cli};

pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    let name = project::microservice_name(&cli.name)?;
    let manifest = manifest::load()?;
    let client = cli.client()?;

    let application = match find_application(&client, &name).await? {
        Some(existing) => {
            println!("Application '{name}' is already registered, updating required roles.");
            let id = application_id(&existing)?;
            client
                .update_application_roles(id, &manifest.required_roles)
                .await?
        }
        None => {
            let stub = Application::microservice(&name, manifest.required_roles);
            let created = client.create_application(&stub).await?;
            println!("Application '{name}' registered.");
            created
        }
    };

    let id = application_id(&application)?.to_string();
    match client.subscribe_current_tenant(&id).await {
        Ok(()) => println!("Current tenant subscribed to '{name}'."),
        // Conflict: the tenant already holds a subscription.
        Err(PlatformError::Api { status: 409, .. }) => {
            println!("Current tenant is already subscribed to '{name}'.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
