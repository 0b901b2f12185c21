//! Application services and ports.

#![forbid(unsafe_code)]

mod connector_service;
mod directory_ports;
mod membership_reconciler;
mod resource_syncers;
mod sync_ports;
mod translators;

#[cfg(test)]
mod test_support;

pub use connector_service::{ConnectorMetadata, ConnectorService, MembershipChange};
pub use directory_ports::DirectoryClient;
pub use membership_reconciler::{
    MembershipReconciler, mapping_roles_for_write, role_members, roles_with, roles_without,
    usernames_with, usernames_without,
};
pub use resource_syncers::{
    DeploymentRoleSyncer, DeploymentUserSyncer, OrganizationSyncer, RoleMappingSyncer, UserSyncer,
};
pub use sync_ports::ResourceSyncer;
pub use translators::{
    deployment_role_resource, deployment_user_principal, deployment_user_resource,
    organization_member_resource, organization_resource, role_mapping_resource, split_full_name,
};
