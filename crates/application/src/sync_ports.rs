use async_trait::async_trait;
use tessera_core::{AppError, AppResult};
use tessera_domain::{Entitlement, Grant, Page, Resource, ResourceId, ResourceType};
use tracing::warn;

/// Per-resource-type syncer consumed by the sync scheduler.
///
/// Page tokens are accepted for interface compatibility and ignored: every
/// call returns the complete listing with an empty next token.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// Returns the resource type served by this syncer.
    fn resource_type(&self) -> ResourceType;

    /// Lists resources below an optional parent scope.
    async fn list(&self, parent: Option<&ResourceId>, page_token: &str)
    -> AppResult<Page<Resource>>;

    /// Lists entitlements exposed by a resource.
    async fn entitlements(
        &self,
        resource: &Resource,
        page_token: &str,
    ) -> AppResult<Page<Entitlement>>;

    /// Lists grants of entitlements exposed by a resource.
    async fn grants(&self, resource: &Resource, page_token: &str) -> AppResult<Page<Grant>>;

    /// Grants an entitlement to a principal.
    async fn grant(&self, _principal: &Resource, _entitlement: &Entitlement) -> AppResult<()> {
        Err(AppError::Unsupported(format!(
            "resource type '{}' does not support grant",
            self.resource_type().id
        )))
    }

    /// Revokes an existing grant.
    async fn revoke(&self, _grant: &Grant) -> AppResult<()> {
        Err(AppError::Unsupported(format!(
            "resource type '{}' does not support revoke",
            self.resource_type().id
        )))
    }
}

/// Rejects membership changes for principals that are not deployment users.
///
/// Runs before any request is issued so a rejected call never mutates state.
pub(crate) fn require_deployment_user_principal(
    principal: &ResourceId,
    membership: &str,
) -> AppResult<()> {
    if principal.is_of(&ResourceType::DEPLOYMENT_USER) {
        return Ok(());
    }

    warn!(
        principal_type = %principal.resource_type,
        principal_id = %principal.resource,
        membership,
        "only deployment users can hold membership"
    );
    Err(AppError::InvalidPrincipal(format!(
        "only deployment users can hold {membership} membership, got '{principal}'"
    )))
}

/// Ensures an entitlement is exposed by a resource of the expected type.
pub(crate) fn require_entitlement_resource<'a>(
    entitlement: &'a Entitlement,
    resource_type: &ResourceType,
) -> AppResult<&'a str> {
    let resource_id = &entitlement.resource.id;
    if !resource_id.is_of(resource_type) {
        return Err(AppError::Validation(format!(
            "entitlement '{}' belongs to '{}', expected a '{}' resource",
            entitlement.id, resource_id.resource_type, resource_type.id
        )));
    }

    Ok(resource_id.resource.as_str())
}
