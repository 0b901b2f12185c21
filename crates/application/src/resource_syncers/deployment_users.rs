use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::AppResult;
use tessera_domain::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};

use crate::{DirectoryClient, ResourceSyncer, deployment_user_resource};

use super::translate_all;

/// Syncs native deployment users. Deployment users are principals only.
#[derive(Clone)]
pub struct DeploymentUserSyncer {
    client: Arc<dyn DirectoryClient>,
    sync_deployment: bool,
}

impl DeploymentUserSyncer {
    /// Creates a deployment user syncer; listing is a no-op unless `sync_deployment` is set.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>, sync_deployment: bool) -> Self {
        Self {
            client,
            sync_deployment,
        }
    }
}

#[async_trait]
impl ResourceSyncer for DeploymentUserSyncer {
    fn resource_type(&self) -> ResourceType {
        ResourceType::DEPLOYMENT_USER
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _page_token: &str,
    ) -> AppResult<Page<Resource>> {
        if !self.sync_deployment {
            return Ok(Page::empty());
        }

        let users = self
            .client
            .list_deployment_users()
            .await
            .map_err(|error| error.context("error listing deployment users"))?;

        let resources = translate_all(
            users.into_values(),
            deployment_user_resource,
            "error creating user resource for deployment user",
        )?;
        Ok(Page::complete(resources))
    }

    async fn entitlements(
        &self,
        _resource: &Resource,
        _page_token: &str,
    ) -> AppResult<Page<Entitlement>> {
        Ok(Page::empty())
    }

    async fn grants(&self, _resource: &Resource, _page_token: &str) -> AppResult<Page<Grant>> {
        Ok(Page::empty())
    }
}
