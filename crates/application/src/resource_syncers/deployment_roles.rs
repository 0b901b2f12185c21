use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::AppResult;
use tessera_domain::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};

use crate::membership_reconciler::{MembershipReconciler, role_members};
use crate::sync_ports::{require_deployment_user_principal, require_entitlement_resource};
use crate::{DirectoryClient, ResourceSyncer, deployment_role_resource, deployment_user_resource};

use super::translate_all;

const ROLE_MEMBERSHIP: &str = "member";

/// Syncs deployment roles.
///
/// Role membership is not stored on the role: grants are derived from the
/// `roles` list of every deployment user.
#[derive(Clone)]
pub struct DeploymentRoleSyncer {
    client: Arc<dyn DirectoryClient>,
    reconciler: MembershipReconciler,
    sync_deployment: bool,
}

impl DeploymentRoleSyncer {
    /// Creates a deployment role syncer; listing is a no-op unless `sync_deployment` is set.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>, sync_deployment: bool) -> Self {
        Self {
            reconciler: MembershipReconciler::new(client.clone()),
            client,
            sync_deployment,
        }
    }

    fn membership_entitlement(resource: &Resource) -> AppResult<Entitlement> {
        Entitlement::assignment(
            resource,
            ROLE_MEMBERSHIP,
            format!("{} Role {ROLE_MEMBERSHIP}", resource.display_name),
            format!("Member of {} elasticsearch role", resource.display_name),
            &[ResourceType::DEPLOYMENT_USER],
        )
    }
}

#[async_trait]
impl ResourceSyncer for DeploymentRoleSyncer {
    fn resource_type(&self) -> ResourceType {
        ResourceType::DEPLOYMENT_ROLE
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _page_token: &str,
    ) -> AppResult<Page<Resource>> {
        if !self.sync_deployment {
            return Ok(Page::empty());
        }

        let roles = self
            .client
            .list_deployment_roles()
            .await
            .map_err(|error| error.context("error listing roles"))?;

        let resources = translate_all(
            roles.into_values(),
            deployment_role_resource,
            "error creating role resource",
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
        let users = self
            .client
            .list_deployment_users()
            .await
            .map_err(|error| error.context("error listing deployment users"))?;

        let entitlement = Self::membership_entitlement(resource)?;
        let principals = translate_all(
            role_members(users.values(), resource.id.resource.as_str()),
            |user| deployment_user_resource(user),
            "error creating user resource for role",
        )?;

        Ok(Page::complete(
            principals
                .into_iter()
                .map(|principal| Grant::new(&entitlement, principal.id))
                .collect(),
        ))
    }

    async fn grant(&self, principal: &Resource, entitlement: &Entitlement) -> AppResult<()> {
        require_deployment_user_principal(&principal.id, "role")?;
        let role = require_entitlement_resource(entitlement, &ResourceType::DEPLOYMENT_ROLE)?;

        self.reconciler
            .grant_role(principal.id.resource.as_str(), role)
            .await
    }

    async fn revoke(&self, grant: &Grant) -> AppResult<()> {
        require_deployment_user_principal(&grant.principal, "role")?;
        let role =
            require_entitlement_resource(&grant.entitlement, &ResourceType::DEPLOYMENT_ROLE)?;

        self.reconciler
            .revoke_role(grant.principal.resource.as_str(), role)
            .await
    }
}
