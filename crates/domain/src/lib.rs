//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod directory;
mod graph;

pub use directory::{
    ApplicationPrivileges, AuthenticatedIdentity, DeploymentRole, DeploymentUser, FieldSecurity,
    IndexPrivileges, Organization, OrganizationMember, RoleMapping, RoleMappingBody,
    RoleMappingField, RoleMappingRules,
};
pub use graph::{
    Entitlement, Grant, GraphSnapshot, Page, Resource, ResourceId, ResourceTraits, ResourceType,
    ResourceTypeTrait, RoleTrait, UserEmail, UserStatus, UserTrait,
};
