use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::AppResult;
use tessera_domain::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};

use crate::{DirectoryClient, ResourceSyncer, organization_member_resource};

use super::translate_all;

/// Syncs cloud organization members. Users are principals only.
#[derive(Clone)]
pub struct UserSyncer {
    client: Arc<dyn DirectoryClient>,
}

impl UserSyncer {
    /// Creates a cloud user syncer.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> ResourceType {
        ResourceType::USER
    }

    /// Lists members of the parent organization; without a parent there is nothing to list.
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        _page_token: &str,
    ) -> AppResult<Page<Resource>> {
        let Some(parent) = parent else {
            return Ok(Page::empty());
        };

        let members = self
            .client
            .list_organization_members(parent.resource.as_str())
            .await
            .map_err(|error| error.context("error listing users"))?;

        let resources = translate_all(
            members,
            |member| organization_member_resource(member, parent),
            "error creating user resource",
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
