use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::AppResult;
use tessera_domain::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};

use crate::{DirectoryClient, ResourceSyncer, organization_member_resource, organization_resource};

use super::translate_all;

const ORGANIZATION_MEMBERSHIP: &str = "member";

/// Syncs cloud organizations and their membership.
///
/// Membership is server-authoritative: grants come straight from the member
/// listing.
#[derive(Clone)]
pub struct OrganizationSyncer {
    client: Arc<dyn DirectoryClient>,
}

impl OrganizationSyncer {
    /// Creates an organization syncer.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self { client }
    }

    fn membership_entitlement(resource: &Resource) -> AppResult<Entitlement> {
        Entitlement::assignment(
            resource,
            ORGANIZATION_MEMBERSHIP,
            format!(
                "{} Organization {ORGANIZATION_MEMBERSHIP}",
                resource.display_name
            ),
            format!("Member of {} Elastic organization", resource.display_name),
            &[ResourceType::USER],
        )
    }
}

#[async_trait]
impl ResourceSyncer for OrganizationSyncer {
    fn resource_type(&self) -> ResourceType {
        ResourceType::ORGANIZATION
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _page_token: &str,
    ) -> AppResult<Page<Resource>> {
        let organizations = self
            .client
            .list_organizations()
            .await
            .map_err(|error| error.context("error listing organizations"))?;

        let resources = translate_all(
            organizations,
            organization_resource,
            "error creating organization resource",
        )?;
        Ok(Page::complete(resources))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _page_token: &str,
    ) -> AppResult<Page<Entitlement>> {
        Ok(Page::complete(vec![Self::membership_entitlement(
            resource,
        )?]))
    }

    async fn grants(&self, resource: &Resource, _page_token: &str) -> AppResult<Page<Grant>> {
        let members = self
            .client
            .list_organization_members(resource.id.resource.as_str())
            .await
            .map_err(|error| error.context("error listing organization members"))?;

        let entitlement = Self::membership_entitlement(resource)?;
        let principals = translate_all(
            members,
            |member| organization_member_resource(member, &resource.id),
            "error creating user resource for organization",
        )?;

        Ok(Page::complete(
            principals
                .into_iter()
                .map(|principal| Grant::new(&entitlement, principal.id))
                .collect(),
        ))
    }
}
