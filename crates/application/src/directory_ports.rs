use std::collections::BTreeMap;

use async_trait::async_trait;
use tessera_core::AppResult;
use tessera_domain::{
    AuthenticatedIdentity, DeploymentRole, DeploymentUser, Organization, OrganizationMember,
    RoleMapping, RoleMappingBody,
};

/// Transport port for the cloud organization and deployment security APIs.
///
/// Implementations carry no business rules: they issue one request per call
/// and decode the response.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Lists cloud organizations visible to the API key.
    async fn list_organizations(&self) -> AppResult<Vec<Organization>>;

    /// Lists members of a cloud organization.
    async fn list_organization_members(
        &self,
        organization_id: &str,
    ) -> AppResult<Vec<OrganizationMember>>;

    /// Lists deployment users keyed by username.
    async fn list_deployment_users(&self) -> AppResult<BTreeMap<String, DeploymentUser>>;

    /// Fetches one deployment user, failing with `NotFound` when absent.
    async fn get_deployment_user(&self, username: &str) -> AppResult<DeploymentUser>;

    /// Creates or fully replaces a deployment user.
    async fn update_deployment_user(&self, username: &str, user: &DeploymentUser)
    -> AppResult<()>;

    /// Lists deployment roles keyed by role name.
    async fn list_deployment_roles(&self) -> AppResult<BTreeMap<String, DeploymentRole>>;

    /// Creates or fully replaces a deployment role.
    async fn update_deployment_role(&self, name: &str, role: &DeploymentRole) -> AppResult<()>;

    /// Lists role mappings keyed by mapping name.
    async fn list_role_mappings(&self) -> AppResult<BTreeMap<String, RoleMapping>>;

    /// Fetches one role mapping, failing with `NotFound` when absent.
    async fn get_role_mapping(&self, name: &str) -> AppResult<RoleMapping>;

    /// Creates or fully replaces a role mapping.
    async fn update_role_mapping(&self, name: &str, body: &RoleMappingBody) -> AppResult<()>;

    /// Deletes a role mapping.
    async fn delete_role_mapping(&self, name: &str) -> AppResult<()>;

    /// Probes the deployment API key, failing with `Unauthorized` for an unusable identity.
    async fn authenticate_deployment(&self) -> AppResult<AuthenticatedIdentity>;
}
