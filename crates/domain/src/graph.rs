//! Vendor-neutral access graph: resources, entitlements and grants.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core::{AppError, AppResult};

/// Capability markers attached to a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTypeTrait {
    /// Resources of this type are principals.
    User,
    /// Resources of this type confer access through membership.
    Role,
}

/// Static description of one kind of graph resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    /// Stable resource type identifier.
    pub id: &'static str,
    /// Human-readable type name.
    pub display_name: &'static str,
    /// Capability markers.
    pub traits: &'static [ResourceTypeTrait],
    /// Principal-only types never expose entitlements or grants.
    pub skip_entitlements_and_grants: bool,
}

impl ResourceType {
    /// Cloud organization.
    pub const ORGANIZATION: Self = Self {
        id: "organization",
        display_name: "Organization",
        traits: &[],
        skip_entitlements_and_grants: false,
    };

    /// Cloud organization member.
    pub const USER: Self = Self {
        id: "user",
        display_name: "User",
        traits: &[ResourceTypeTrait::User],
        skip_entitlements_and_grants: true,
    };

    /// Native user of the deployment security realm.
    pub const DEPLOYMENT_USER: Self = Self {
        id: "deploymentUser",
        display_name: "Deployment User",
        traits: &[ResourceTypeTrait::User],
        skip_entitlements_and_grants: true,
    };

    /// Deployment security role.
    pub const DEPLOYMENT_ROLE: Self = Self {
        id: "role",
        display_name: "Deployment Role",
        traits: &[ResourceTypeTrait::Role],
        skip_entitlements_and_grants: false,
    };

    /// Deployment role mapping rule.
    pub const ROLE_MAPPING: Self = Self {
        id: "roleMapping",
        display_name: "Role Mapping",
        traits: &[ResourceTypeTrait::Role],
        skip_entitlements_and_grants: false,
    };

    /// Returns all known resource types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceType] = &[
            ResourceType::ORGANIZATION,
            ResourceType::USER,
            ResourceType::DEPLOYMENT_USER,
            ResourceType::DEPLOYMENT_ROLE,
            ResourceType::ROLE_MAPPING,
        ];

        ALL
    }

    /// Resolves a resource type from its stable identifier.
    pub fn from_id(id: &str) -> AppResult<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|resource_type| resource_type.id == id)
            .ok_or_else(|| AppError::NotFound(format!("unknown resource type '{id}'")))
    }
}

/// Address of one resource in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource type identifier.
    pub resource_type: String,
    /// Resource key, unique within its type.
    pub resource: String,
}

impl ResourceId {
    /// Creates a resource address, rejecting empty keys.
    pub fn new(resource_type: &ResourceType, resource: impl Into<String>) -> AppResult<Self> {
        let resource = resource.into();
        if resource.trim().is_empty() {
            return Err(AppError::Translation(format!(
                "resource id for type '{}' must not be empty",
                resource_type.id
            )));
        }

        Ok(Self {
            resource_type: resource_type.id.to_owned(),
            resource,
        })
    }

    /// Returns whether this address belongs to the given resource type.
    #[must_use]
    pub fn is_of(&self, resource_type: &ResourceType) -> bool {
        self.resource_type == resource_type.id
    }
}

impl Display for ResourceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource_type, self.resource)
    }
}

/// Account status reported on user traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Upstream did not report a status.
    #[default]
    Unspecified,
    /// Account is active.
    Enabled,
}

/// Email address attached to a user trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    /// Address as reported upstream.
    pub address: String,
    /// Marks the primary address.
    pub is_primary: bool,
}

/// Principal-shaped resource details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserTrait {
    /// Free-form profile attributes.
    pub profile: BTreeMap<String, Value>,
    /// Known email addresses.
    pub emails: Vec<UserEmail>,
    /// Account status.
    pub status: UserStatus,
}

/// Role-shaped resource details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleTrait {
    /// Free-form profile attributes.
    pub profile: BTreeMap<String, Value>,
}

/// Trait payload carried by a resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceTraits {
    /// No trait payload.
    #[default]
    None,
    /// Principal details.
    User(UserTrait),
    /// Role details.
    Role(RoleTrait),
}

/// Node in the access graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource address.
    pub id: ResourceId,
    /// Human-readable name.
    pub display_name: String,
    /// Owning resource, when the type is scoped below another.
    pub parent_id: Option<ResourceId>,
    /// Resource types listed with this resource as their parent.
    pub child_resource_types: Vec<String>,
    /// Trait payload.
    pub traits: ResourceTraits,
}

impl Resource {
    /// Creates a resource, rejecting empty display names and keys.
    pub fn new(
        display_name: impl Into<String>,
        resource_type: &ResourceType,
        resource: impl Into<String>,
    ) -> AppResult<Self> {
        let id = ResourceId::new(resource_type, resource)?;
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(AppError::Translation(format!(
                "display name for resource '{id}' must not be empty"
            )));
        }

        Ok(Self {
            id,
            display_name,
            parent_id: None,
            child_resource_types: Vec::new(),
            traits: ResourceTraits::None,
        })
    }

    /// Sets the parent resource.
    #[must_use]
    pub fn with_parent(mut self, parent_id: ResourceId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Declares a resource type listed under this resource.
    #[must_use]
    pub fn with_child_resource_type(mut self, resource_type: &ResourceType) -> Self {
        self.child_resource_types.push(resource_type.id.to_owned());
        self
    }

    /// Attaches user trait details.
    #[must_use]
    pub fn with_user_trait(mut self, user_trait: UserTrait) -> Self {
        self.traits = ResourceTraits::User(user_trait);
        self
    }

    /// Attaches role trait details.
    #[must_use]
    pub fn with_role_trait(mut self, role_trait: RoleTrait) -> Self {
        self.traits = ResourceTraits::Role(role_trait);
        self
    }
}

/// Grantable capability exposed by a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Stable identifier, `{resource_type}:{resource}:{slug}`.
    pub id: String,
    /// Resource exposing the entitlement.
    pub resource: Resource,
    /// Short name unique within the resource.
    pub slug: String,
    /// Human-readable name.
    pub display_name: String,
    /// Human-readable description.
    pub description: String,
    /// Resource type ids allowed to hold the entitlement.
    pub grantable_to: Vec<String>,
}

impl Entitlement {
    /// Creates an assignment entitlement on a resource.
    pub fn assignment(
        resource: &Resource,
        slug: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        grantable_to: &[ResourceType],
    ) -> AppResult<Self> {
        let slug = slug.into();
        if slug.trim().is_empty() {
            return Err(AppError::Translation(format!(
                "entitlement slug on resource '{}' must not be empty",
                resource.id
            )));
        }

        Ok(Self {
            id: format!("{}:{slug}", resource.id),
            resource: resource.clone(),
            slug,
            display_name: display_name.into(),
            description: description.into(),
            grantable_to: grantable_to
                .iter()
                .map(|resource_type| resource_type.id.to_owned())
                .collect(),
        })
    }
}

/// Materialized edge: a principal holds an entitlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// Stable identifier, `{entitlement_id}:{principal}`.
    pub id: String,
    /// Entitlement held.
    pub entitlement: Entitlement,
    /// Principal holding the entitlement.
    pub principal: ResourceId,
}

impl Grant {
    /// Creates a grant edge.
    #[must_use]
    pub fn new(entitlement: &Entitlement, principal: ResourceId) -> Self {
        Self {
            id: format!("{}:{principal}", entitlement.id),
            entitlement: entitlement.clone(),
            principal,
        }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Cursor for the next page; empty when the listing is complete.
    pub next_token: String,
}

impl<T> Page<T> {
    /// Creates a final page holding every item.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: String::new(),
        }
    }

    /// Creates an empty final page.
    #[must_use]
    pub fn empty() -> Self {
        Self::complete(Vec::new())
    }

    /// Returns whether no further pages follow.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_token.is_empty()
    }
}

/// Everything collected by one full sync pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
    /// Resources in listing order.
    pub resources: Vec<Resource>,
    /// Entitlements of every listed resource.
    pub entitlements: Vec<Entitlement>,
    /// Grants of every listed resource.
    pub grants: Vec<Grant>,
}

impl GraphSnapshot {
    /// Counts collected resources of one type.
    #[must_use]
    pub fn resource_count(&self, resource_type: &ResourceType) -> usize {
        self.resources
            .iter()
            .filter(|resource| resource.id.is_of(resource_type))
            .count()
    }
}
