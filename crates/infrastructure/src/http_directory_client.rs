use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tessera_application::DirectoryClient;
use tessera_core::{AppError, AppResult};
use tessera_domain::{
    AuthenticatedIdentity, DeploymentRole, DeploymentUser, Organization, OrganizationMember,
    RoleMapping, RoleMappingBody,
};
use tracing::debug;
use url::Url;

use crate::{DeploymentTarget, DirectoryClientConfig};

#[derive(serde::Deserialize)]
struct OrganizationsResponse {
    #[serde(default)]
    organizations: Vec<Organization>,
}

#[derive(serde::Deserialize)]
struct MembersResponse {
    #[serde(default)]
    members: Vec<OrganizationMember>,
}

/// reqwest-backed client for the cloud organization and deployment security APIs.
pub struct HttpDirectoryClient {
    http_client: reqwest::Client,
    config: DirectoryClientConfig,
}

impl HttpDirectoryClient {
    /// Builds a client with the configured request timeout.
    pub fn new(config: DirectoryClientConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn cloud_url(&self, segments: &[&str]) -> AppResult<Url> {
        join_url(&self.config.cloud_base_url, segments)
    }

    fn deployment_url(&self, segments: &[&str]) -> AppResult<Url> {
        join_url(&self.deployment()?.endpoint, segments)
    }

    fn deployment(&self) -> AppResult<&DeploymentTarget> {
        self.config.deployment.as_ref().ok_or_else(|| {
            AppError::Configuration("deployment endpoint is not configured".to_owned())
        })
    }

    /// Picks the deployment key for URLs below the deployment endpoint, the cloud key otherwise.
    fn api_key_for(&self, url: &Url) -> &str {
        match &self.config.deployment {
            Some(deployment) if url.as_str().starts_with(deployment.endpoint.as_str()) => {
                deployment.api_key.as_str()
            }
            _ => self.config.api_key.as_str(),
        }
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> AppResult<reqwest::Response> {
        debug!(method = %method, url = %url, "sending directory request");

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("ApiKey {}", self.api_key_for(&url)),
            );
        if let Some(body) = body {
            request = request.body(body);
        }

        request.send().await.map_err(|error| {
            AppError::Transport(format!("{method} {} failed: {error}", url.path()))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let response = self.send(Method::GET, url.clone(), None).await?;
        decode(ensure_success(response, &url, false).await?, &url).await
    }

    async fn get_singleton<T: DeserializeOwned>(&self, url: Url) -> AppResult<BTreeMap<String, T>> {
        let response = self.send(Method::GET, url.clone(), None).await?;
        decode(ensure_success(response, &url, true).await?, &url).await
    }

    async fn post_json<B: Serialize + Sync>(&self, url: Url, body: &B) -> AppResult<()> {
        let body = serde_json::to_vec(body).map_err(|error| {
            AppError::Internal(format!("failed to encode request body: {error}"))
        })?;
        let response = self.send(Method::POST, url.clone(), Some(body)).await?;
        ensure_success(response, &url, false).await.map(|_| ())
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        let url = self.cloud_url(&["api", "v1", "organizations"])?;
        let response: OrganizationsResponse = self.get_json(url).await?;
        Ok(response.organizations)
    }

    async fn list_organization_members(
        &self,
        organization_id: &str,
    ) -> AppResult<Vec<OrganizationMember>> {
        let organization_id = self
            .config
            .organization_id
            .as_deref()
            .unwrap_or(organization_id);
        let url = self.cloud_url(&["api", "v1", "organizations", organization_id, "members"])?;
        let response: MembersResponse = self.get_json(url).await?;
        Ok(response.members)
    }

    async fn list_deployment_users(&self) -> AppResult<BTreeMap<String, DeploymentUser>> {
        let url = self.deployment_url(&["_security", "user"])?;
        self.get_json(url).await
    }

    async fn get_deployment_user(&self, username: &str) -> AppResult<DeploymentUser> {
        let url = self.deployment_url(&["_security", "user", username])?;
        let mut users: BTreeMap<String, DeploymentUser> = self.get_singleton(url).await?;
        users
            .remove(username)
            .ok_or_else(|| AppError::NotFound(format!("deployment user '{username}'")))
    }

    async fn update_deployment_user(
        &self,
        username: &str,
        user: &DeploymentUser,
    ) -> AppResult<()> {
        let url = self.deployment_url(&["_security", "user", username])?;
        self.post_json(url, user)
            .await
            .map_err(|error| error.context("error updating user"))
    }

    async fn list_deployment_roles(&self) -> AppResult<BTreeMap<String, DeploymentRole>> {
        let url = self.deployment_url(&["_security", "role"])?;
        let mut roles: BTreeMap<String, DeploymentRole> = self.get_json(url).await?;
        for (name, role) in &mut roles {
            role.name.clone_from(name);
        }

        Ok(roles)
    }

    async fn update_deployment_role(&self, name: &str, role: &DeploymentRole) -> AppResult<()> {
        let url = self.deployment_url(&["_security", "role", name])?;
        self.post_json(url, role)
            .await
            .map_err(|error| error.context("error updating role"))
    }

    async fn list_role_mappings(&self) -> AppResult<BTreeMap<String, RoleMapping>> {
        let url = self.deployment_url(&["_security", "role_mapping"])?;
        let mut mappings: BTreeMap<String, RoleMapping> = self.get_json(url).await?;
        for (name, mapping) in &mut mappings {
            mapping.name.clone_from(name);
        }

        Ok(mappings)
    }

    async fn get_role_mapping(&self, name: &str) -> AppResult<RoleMapping> {
        let url = self.deployment_url(&["_security", "role_mapping", name])?;
        let mut mappings: BTreeMap<String, RoleMapping> = self.get_singleton(url).await?;
        let mut mapping = mappings
            .remove(name)
            .ok_or_else(|| AppError::NotFound(format!("role mapping '{name}'")))?;
        mapping.name = name.to_owned();

        Ok(mapping)
    }

    async fn update_role_mapping(&self, name: &str, body: &RoleMappingBody) -> AppResult<()> {
        let url = self.deployment_url(&["_security", "role_mapping", name])?;
        self.post_json(url, body)
            .await
            .map_err(|error| error.context("error updating role mapping"))
    }

    async fn delete_role_mapping(&self, name: &str) -> AppResult<()> {
        let url = self.deployment_url(&["_security", "role_mapping", name])?;
        let response = self.send(Method::DELETE, url.clone(), None).await?;
        ensure_success(response, &url, true).await.map(|_| ())
    }

    async fn authenticate_deployment(&self) -> AppResult<AuthenticatedIdentity> {
        let url = self.deployment_url(&["_security", "_authenticate"])?;
        let identity: AuthenticatedIdentity = self.get_json(url).await?;
        if !identity.is_usable() {
            return Err(AppError::Unauthorized(
                "invalid deployment api key".to_owned(),
            ));
        }

        Ok(identity)
    }
}

fn join_url(base: &Url, segments: &[&str]) -> AppResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AppError::Configuration(format!("'{base}' cannot be used as a base url")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

async fn ensure_success(
    response: reqwest::Response,
    url: &Url,
    missing_is_not_found: bool,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if missing_is_not_found && status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(format!("'{}' does not exist", url.path())));
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    Err(AppError::Transport(format!(
        "{} returned status {status}: {body}",
        url.path()
    )))
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, url: &Url) -> AppResult<T> {
    response.json::<T>().await.map_err(|error| {
        AppError::Transport(format!(
            "failed to decode response from {}: {error}",
            url.path()
        ))
    })
}
