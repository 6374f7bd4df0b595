//! Task implementations.

pub mod build;
pub mod create_env;
pub mod credentials;
pub mod deregister;
pub mod init;
pub mod register;
pub mod upload;

use cumulo_platform::apps::Application;
use cumulo_platform::PlatformClient;

/// Look up the application by name; the platform returns 0 or 1 matches.
pub(crate) async fn find_application(
    client: &PlatformClient,
    name: &str,
) -> anyhow::Result<Option<Application>> {
    let mut applications = client.applications_by_name(name).await?;
    Ok(if applications.is_empty() {
        None
    } else {
        Some(applications.remove(0))
    })
}

/// The application's platform-assigned id.
pub(crate) fn application_id(application: &Application) -> anyhow::Result<&str> {
    application
        .id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("application '{}' has no id", application.name))
}
