//! Microservice application management.
//!
//! Used by the task-runner CLI to register, deploy and inspect the
//! microservice application record the platform keeps for this service.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::{check_status, Credentials, PlatformClient};
use crate::error::PlatformError;

/// Application type for microservices.
pub const MICROSERVICE_TYPE: &str = "MICROSERVICE";
/// Availability restricting the application to the owning tenant.
pub const PRIVATE_AVAILABILITY: &str = "PRIVATE";

/// Application record as the platform stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Platform-assigned id, absent before creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Application name, unique per tenant.
    pub name: String,
    /// Application key sent by the running microservice.
    pub key: String,
    /// Application type.
    #[serde(rename = "type")]
    pub app_type: String,
    /// Availability (`PRIVATE`/`MARKET`).
    pub availability: String,
    /// Roles the microservice requires in subscriber tenants.
    #[serde(default)]
    pub required_roles: Vec<String>,
}

impl Application {
    /// A private microservice application stub named `name`.
    pub fn microservice(name: &str, required_roles: Vec<String>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            key: format!("{name}-key"),
            app_type: MICROSERVICE_TYPE.to_string(),
            availability: PRIVATE_AVAILABILITY.to_string(),
            required_roles,
        }
    }
}

impl PlatformClient {
    /// Applications matching a name (0 or 1 in practice).
    pub async fn applications_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<Application>, PlatformError> {
        let page: ApplicationPage = self
            .get_json(&format!("/application/applicationsByName/{name}"))
            .await?;
        Ok(page.applications)
    }

    /// Create an application stub.
    pub async fn create_application(
        &self,
        application: &Application,
    ) -> Result<Application, PlatformError> {
        let response = self
            .request(reqwest::Method::POST, "/application/applications")
            .json(application)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Replace the required roles of an existing application.
    pub async fn update_application_roles(
        &self,
        id: &str,
        required_roles: &[String],
    ) -> Result<Application, PlatformError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/application/applications/{id}"),
            )
            .json(&serde_json::json!({ "requiredRoles": required_roles }))
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Delete an application by id.
    pub async fn delete_application(&self, id: &str) -> Result<(), PlatformError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/application/applications/{id}"),
            )
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Upload a packed microservice image (zip) as the application binary.
    pub async fn upload_application_binary(
        &self,
        id: &str,
        file: &Path,
    ) -> Result<(), PlatformError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| PlatformError::Config(format!("cannot read {}: {e}", file.display())))?;
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.zip".to_string());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/zip")
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/application/applications/{id}/binaries"),
            )
            .multipart(form)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Bootstrap user credentials of a registered microservice.
    pub async fn application_bootstrap_user(
        &self,
        id: &str,
    ) -> Result<Credentials, PlatformError> {
        let user: BootstrapUser = self
            .get_json(&format!("/application/applications/{id}/bootstrapUser"))
            .await?;
        Ok(Credentials::new(user.tenant, user.name, user.password))
    }

    /// Subscribe the calling tenant to an application.
    pub async fn subscribe_current_tenant(
        &self,
        application_id: &str,
    ) -> Result<(), PlatformError> {
        let tenant = match self.tenant_id() {
            Some(t) => t.to_string(),
            None => self.current_tenant().await?,
        };
        let body = serde_json::json!({
            "application": {
                "self": format!("{}/application/applications/{application_id}", self.base_url()),
            }
        });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/tenant/tenants/{tenant}/applications"),
            )
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ApplicationPage {
    #[serde(default)]
    applications: Vec<Application>,
}

#[derive(Deserialize)]
struct BootstrapUser {
    tenant: String,
    name: String,
    password: String,
}
