use std::sync::Arc;

use tessera_core::{AppError, AppResult};
use tessera_domain::{Entitlement, Grant, GraphSnapshot, Resource, ResourceType};
use tracing::{debug, info};

use crate::{
    DeploymentRoleSyncer, DeploymentUserSyncer, DirectoryClient, OrganizationSyncer,
    ResourceSyncer, RoleMappingSyncer, UserSyncer, deployment_user_principal,
};

/// Descriptive metadata reported to the sync host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorMetadata {
    /// Connector display name.
    pub display_name: String,
    /// Connector description.
    pub description: String,
}

/// One membership change addressed by resource and entitlement slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipChange {
    /// Resource type id of the entitlement holder.
    pub resource_type: String,
    /// Resource key of the entitlement holder.
    pub resource_id: String,
    /// Entitlement slug on the holder.
    pub entitlement_slug: String,
    /// Deployment username receiving or losing the membership.
    pub principal_username: String,
}

/// Facade over the resource syncers consumed by the sync host.
#[derive(Clone)]
pub struct ConnectorService {
    client: Arc<dyn DirectoryClient>,
    sync_deployment: bool,
    syncers: Vec<Arc<dyn ResourceSyncer>>,
}

impl ConnectorService {
    /// Creates the connector; deployment resource types stay empty unless `sync_deployment` is set.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>, sync_deployment: bool) -> Self {
        let syncers: Vec<Arc<dyn ResourceSyncer>> = vec![
            Arc::new(OrganizationSyncer::new(client.clone())),
            Arc::new(UserSyncer::new(client.clone())),
            Arc::new(DeploymentRoleSyncer::new(client.clone(), sync_deployment)),
            Arc::new(DeploymentUserSyncer::new(client.clone(), sync_deployment)),
            Arc::new(RoleMappingSyncer::new(client.clone(), sync_deployment)),
        ];

        Self {
            client,
            sync_deployment,
            syncers,
        }
    }

    /// Returns every syncer in the order the host should walk them.
    #[must_use]
    pub fn resource_syncers(&self) -> Vec<Arc<dyn ResourceSyncer>> {
        self.syncers.clone()
    }

    /// Returns connector metadata.
    #[must_use]
    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "Elastic connector".to_owned(),
            description: "Connector syncing users and roles from Elastic cloud and optionally \
                          from elasticsearch deployment."
                .to_owned(),
        }
    }

    /// Probes the configured credentials before a sync starts.
    pub async fn validate(&self) -> AppResult<()> {
        self.client
            .list_organizations()
            .await
            .map_err(|error| error.context("error validating elastic cloud credentials"))?;

        if self.sync_deployment {
            let identity = self.client.authenticate_deployment().await.map_err(|error| {
                error.context("error validating elasticsearch deployment credentials")
            })?;
            debug!(username = %identity.username, "deployment credentials accepted");
        }

        Ok(())
    }

    /// Finds the syncer serving a resource type id.
    pub fn syncer_for(&self, resource_type_id: &str) -> AppResult<Arc<dyn ResourceSyncer>> {
        let resource_type = ResourceType::from_id(resource_type_id)?;
        self.syncers
            .iter()
            .find(|syncer| syncer.resource_type() == resource_type)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("no syncer for resource type '{resource_type_id}'"))
            })
    }

    /// Walks every syncer once and collects the full graph.
    ///
    /// Users are listed once per organization, scoped below it. Any syncer
    /// error aborts the pass.
    pub async fn sync(&self) -> AppResult<GraphSnapshot> {
        let mut snapshot = GraphSnapshot::default();

        for syncer in &self.syncers {
            let resource_type = syncer.resource_type();
            let resources = if resource_type == ResourceType::USER {
                let organizations: Vec<Resource> = snapshot
                    .resources
                    .iter()
                    .filter(|resource| resource.id.is_of(&ResourceType::ORGANIZATION))
                    .cloned()
                    .collect();

                let mut users = Vec::new();
                for organization in &organizations {
                    users.extend(syncer.list(Some(&organization.id), "").await?.items);
                }
                users
            } else {
                syncer.list(None, "").await?.items
            };

            if !resource_type.skip_entitlements_and_grants {
                for resource in &resources {
                    snapshot
                        .entitlements
                        .extend(syncer.entitlements(resource, "").await?.items);
                    snapshot
                        .grants
                        .extend(syncer.grants(resource, "").await?.items);
                }
            }

            info!(
                resource_type = resource_type.id,
                count = resources.len(),
                "resource type synced"
            );
            snapshot.resources.extend(resources);
        }

        Ok(snapshot)
    }

    /// Grants an entitlement to a deployment user.
    pub async fn grant(&self, change: &MembershipChange) -> AppResult<()> {
        let syncer = self.membership_syncer(change, "grant")?;
        let entitlement = Self::resolve_entitlement(syncer.as_ref(), change).await?;
        let principal = Self::principal(change)?;

        syncer.grant(&principal, &entitlement).await
    }

    /// Revokes an entitlement from a deployment user.
    pub async fn revoke(&self, change: &MembershipChange) -> AppResult<()> {
        let syncer = self.membership_syncer(change, "revoke")?;
        let entitlement = Self::resolve_entitlement(syncer.as_ref(), change).await?;
        let principal = Self::principal(change)?;

        syncer.revoke(&Grant::new(&entitlement, principal.id)).await
    }

    /// Principal-only types hold no entitlements, so they fail before any lookup.
    fn membership_syncer(
        &self,
        change: &MembershipChange,
        operation: &str,
    ) -> AppResult<Arc<dyn ResourceSyncer>> {
        let syncer = self.syncer_for(change.resource_type.as_str())?;
        let resource_type = syncer.resource_type();
        if resource_type.skip_entitlements_and_grants {
            return Err(AppError::Unsupported(format!(
                "resource type '{}' does not support {operation}",
                resource_type.id
            )));
        }

        Ok(syncer)
    }

    async fn resolve_entitlement(
        syncer: &dyn ResourceSyncer,
        change: &MembershipChange,
    ) -> AppResult<Entitlement> {
        let resource = syncer
            .list(None, "")
            .await?
            .items
            .into_iter()
            .find(|resource| resource.id.resource == change.resource_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "resource '{}:{}'",
                    change.resource_type, change.resource_id
                ))
            })?;

        syncer
            .entitlements(&resource, "")
            .await?
            .items
            .into_iter()
            .find(|entitlement| entitlement.slug == change.entitlement_slug)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "entitlement '{}' on resource '{}'",
                    change.entitlement_slug, resource.id
                ))
            })
    }

    fn principal(change: &MembershipChange) -> AppResult<Resource> {
        let principal_id = deployment_user_principal(change.principal_username.as_str())?;
        Resource::new(
            change.principal_username.as_str(),
            &ResourceType::DEPLOYMENT_USER,
            principal_id.resource,
        )
    }
}
