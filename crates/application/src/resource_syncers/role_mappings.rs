use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::AppResult;
use tessera_domain::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};

use crate::membership_reconciler::MembershipReconciler;
use crate::sync_ports::{require_deployment_user_principal, require_entitlement_resource};
use crate::{DirectoryClient, ResourceSyncer, deployment_user_principal, role_mapping_resource};

use super::translate_all;

/// Syncs role mappings.
///
/// A mapping exposes one entitlement per role name, so a grant through the
/// mapping also names the concrete role it confers. Membership is the
/// mapping's own username list.
#[derive(Clone)]
pub struct RoleMappingSyncer {
    client: Arc<dyn DirectoryClient>,
    reconciler: MembershipReconciler,
    sync_deployment: bool,
}

impl RoleMappingSyncer {
    /// Creates a role mapping syncer; listing is a no-op unless `sync_deployment` is set.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>, sync_deployment: bool) -> Self {
        Self {
            reconciler: MembershipReconciler::new(client.clone()),
            client,
            sync_deployment,
        }
    }

    fn role_entitlement(resource: &Resource, role: &str) -> AppResult<Entitlement> {
        Entitlement::assignment(
            resource,
            role,
            format!("{} Role {role}", resource.display_name),
            format!(
                "Granted {role} elasticsearch role through the {} role mapping",
                resource.display_name
            ),
            &[ResourceType::DEPLOYMENT_USER],
        )
    }
}

#[async_trait]
impl ResourceSyncer for RoleMappingSyncer {
    fn resource_type(&self) -> ResourceType {
        ResourceType::ROLE_MAPPING
    }

    async fn list(
        &self,
        _parent: Option<&ResourceId>,
        _page_token: &str,
    ) -> AppResult<Page<Resource>> {
        if !self.sync_deployment {
            return Ok(Page::empty());
        }

        let mappings = self
            .client
            .list_role_mappings()
            .await
            .map_err(|error| error.context("error listing role mappings"))?;

        let resources = translate_all(
            mappings.into_values(),
            role_mapping_resource,
            "error creating role mapping resource",
        )?;
        Ok(Page::complete(resources))
    }

    /// Exposes one entitlement per distinct role name referenced by any mapping.
    async fn entitlements(
        &self,
        resource: &Resource,
        _page_token: &str,
    ) -> AppResult<Page<Entitlement>> {
        let mappings = self
            .client
            .list_role_mappings()
            .await
            .map_err(|error| error.context("error listing role mappings"))?;

        let roles: BTreeSet<&str> = mappings
            .values()
            .flat_map(|mapping| mapping.roles.iter().map(String::as_str))
            .collect();

        let entitlements = roles
            .into_iter()
            .map(|role| Self::role_entitlement(resource, role))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Page::complete(entitlements))
    }

    /// Emits one grant per listed username and mapped role.
    ///
    /// A mapping deleted since it was listed yields no grants.
    async fn grants(&self, resource: &Resource, _page_token: &str) -> AppResult<Page<Grant>> {
        let mappings = self
            .client
            .list_role_mappings()
            .await
            .map_err(|error| error.context("error listing role mappings"))?;

        let Some(mapping) = mappings.get(resource.id.resource.as_str()) else {
            return Ok(Page::empty());
        };

        let entitlements = mapping
            .roles
            .iter()
            .map(|role| Self::role_entitlement(resource, role))
            .collect::<AppResult<Vec<_>>>()?;

        let mut grants = Vec::with_capacity(mapping.usernames().len() * entitlements.len());
        for username in mapping.usernames() {
            let principal = deployment_user_principal(username).map_err(|error| {
                error.context("error creating user resource for role mapping")
            })?;
            grants.extend(
                entitlements
                    .iter()
                    .map(|entitlement| Grant::new(entitlement, principal.clone())),
            );
        }

        Ok(Page::complete(grants))
    }

    async fn grant(&self, principal: &Resource, entitlement: &Entitlement) -> AppResult<()> {
        require_deployment_user_principal(&principal.id, "role mapping")?;
        let mapping_name = require_entitlement_resource(entitlement, &ResourceType::ROLE_MAPPING)?;

        self.reconciler
            .grant_role_mapping(principal.id.resource.as_str(), mapping_name)
            .await
    }

    async fn revoke(&self, grant: &Grant) -> AppResult<()> {
        require_deployment_user_principal(&grant.principal, "role mapping")?;
        let mapping_name =
            require_entitlement_resource(&grant.entitlement, &ResourceType::ROLE_MAPPING)?;

        self.reconciler
            .revoke_role_mapping(grant.principal.resource.as_str(), mapping_name)
            .await
    }
}
