//! Pure mappings from directory entities to graph resources.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use tessera_core::AppResult;
use tessera_domain::{
    DeploymentRole, DeploymentUser, Organization, OrganizationMember, Resource, ResourceId,
    ResourceType, RoleMapping, RoleTrait, UserEmail, UserStatus, UserTrait,
};

/// Splits a full name into first name and the remainder.
#[must_use]
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.trim().splitn(2, ' ');
    let first_name = parts.next().unwrap_or_default().to_owned();
    let last_name = parts.next().unwrap_or_default().trim().to_owned();
    (first_name, last_name)
}

/// Translates a cloud organization. Organization members are listed below it.
pub fn organization_resource(organization: &Organization) -> AppResult<Resource> {
    Ok(Resource::new(
        organization.name.as_str(),
        &ResourceType::ORGANIZATION,
        organization.id.as_str(),
    )?
    .with_child_resource_type(&ResourceType::USER))
}

/// Translates an organization member scoped below its organization.
///
/// The display name falls back to the email, then to the user id.
pub fn organization_member_resource(
    member: &OrganizationMember,
    organization_id: &ResourceId,
) -> AppResult<Resource> {
    let (first_name, last_name) = split_full_name(member.name.as_str());
    let profile = BTreeMap::from([
        ("first_name".to_owned(), Value::from(first_name)),
        ("last_name".to_owned(), Value::from(last_name)),
        ("login".to_owned(), Value::from(member.email.as_str())),
        ("user_id".to_owned(), Value::from(member.user_id.as_str())),
        ("org_id".to_owned(), Value::from(member.organization_id.as_str())),
    ]);

    let display_name = first_non_empty(&[
        member.name.as_str(),
        member.email.as_str(),
        member.user_id.as_str(),
    ]);
    Ok(Resource::new(
        display_name,
        &ResourceType::USER,
        member.user_id.as_str(),
    )?
    .with_parent(organization_id.clone())
    .with_user_trait(UserTrait {
        profile,
        emails: primary_email(Some(member.email.as_str())),
        status: UserStatus::Unspecified,
    }))
}

/// Translates a deployment user. The username is the resource key.
pub fn deployment_user_resource(user: &DeploymentUser) -> AppResult<Resource> {
    let full_name = user.full_name.as_deref().unwrap_or_default();
    let (first_name, last_name) = split_full_name(full_name);
    let profile = BTreeMap::from([
        ("first_name".to_owned(), Value::from(first_name)),
        ("last_name".to_owned(), Value::from(last_name)),
        (
            "login".to_owned(),
            Value::from(user.email.as_deref().unwrap_or_default()),
        ),
        ("user_id".to_owned(), Value::from(user.username.as_str())),
    ]);

    // Disabled accounts are reported as unspecified.
    let status = if user.enabled {
        UserStatus::Enabled
    } else {
        UserStatus::Unspecified
    };

    let display_name = first_non_empty(&[full_name, user.username.as_str()]);
    Ok(Resource::new(
        display_name,
        &ResourceType::DEPLOYMENT_USER,
        user.username.as_str(),
    )?
    .with_user_trait(UserTrait {
        profile,
        emails: primary_email(user.email.as_deref()),
        status,
    }))
}

/// Addresses a deployment user by username without fetching the account.
pub fn deployment_user_principal(username: &str) -> AppResult<ResourceId> {
    ResourceId::new(&ResourceType::DEPLOYMENT_USER, username)
}

/// Translates a deployment role.
///
/// The upstream payload has no identifier other than the role name, so the
/// name is used as both the display name and the resource key. Role names
/// are unique within a deployment, so keys cannot collide.
pub fn deployment_role_resource(role: &DeploymentRole) -> AppResult<Resource> {
    let profile = BTreeMap::from([
        ("role_name".to_owned(), Value::from(role.name.as_str())),
        ("role_id".to_owned(), Value::from(role.name.as_str())),
        ("cluster".to_owned(), json!(role.cluster)),
        ("run_as".to_owned(), json!(role.run_as)),
    ]);

    Ok(Resource::new(
        role.name.as_str(),
        &ResourceType::DEPLOYMENT_ROLE,
        role.name.as_str(),
    )?
    .with_role_trait(RoleTrait { profile }))
}

/// Translates a role mapping. The mapping name is the resource key.
pub fn role_mapping_resource(mapping: &RoleMapping) -> AppResult<Resource> {
    let profile = BTreeMap::from([
        ("role_mapping_id".to_owned(), Value::from(mapping.name.as_str())),
        (
            "role_mapping_name".to_owned(),
            Value::from(mapping.name.as_str()),
        ),
        ("enabled".to_owned(), Value::from(mapping.enabled)),
        ("roles".to_owned(), json!(mapping.roles)),
    ]);

    Ok(Resource::new(
        mapping.name.as_str(),
        &ResourceType::ROLE_MAPPING,
        mapping.name.as_str(),
    )?
    .with_role_trait(RoleTrait { profile }))
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_default()
}

fn primary_email(email: Option<&str>) -> Vec<UserEmail> {
    email
        .filter(|address| !address.trim().is_empty())
        .map(|address| UserEmail {
            address: address.to_owned(),
            is_primary: true,
        })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use tessera_core::AppError;
    use tessera_domain::{
        DeploymentRole, DeploymentUser, Organization, OrganizationMember, ResourceId,
        ResourceTraits, ResourceType, RoleMapping, UserStatus,
    };

    use super::{
        deployment_role_resource, deployment_user_resource, organization_member_resource,
        organization_resource, role_mapping_resource, split_full_name,
    };

    #[test]
    fn split_full_name_keeps_remainder_as_last_name() {
        assert_eq!(
            split_full_name("Ada King Lovelace"),
            ("Ada".to_owned(), "King Lovelace".to_owned())
        );
        assert_eq!(split_full_name("Ada"), ("Ada".to_owned(), String::new()));
        assert_eq!(split_full_name(""), (String::new(), String::new()));
    }

    #[test]
    fn organization_declares_user_children() {
        let resource = organization_resource(&Organization {
            id: "org-1".to_owned(),
            name: "Acme".to_owned(),
        });
        assert!(resource.is_ok());

        if let Ok(resource) = resource {
            assert_eq!(resource.id.resource, "org-1");
            assert_eq!(resource.display_name, "Acme");
            assert_eq!(resource.child_resource_types, vec!["user".to_owned()]);
        }
    }

    #[test]
    fn organization_without_id_fails_translation() {
        let resource = organization_resource(&Organization {
            id: String::new(),
            name: "Acme".to_owned(),
        });
        assert!(matches!(resource, Err(AppError::Translation(_))));
    }

    #[test]
    fn organization_member_is_parented_and_profiled() {
        let parent = ResourceId::new(&ResourceType::ORGANIZATION, "org-1");
        assert!(parent.is_ok());
        let Ok(parent) = parent else { return };

        let resource = organization_member_resource(
            &OrganizationMember {
                user_id: "u-42".to_owned(),
                name: "Grace Hopper".to_owned(),
                email: "grace@example.com".to_owned(),
                organization_id: "org-1".to_owned(),
                member_since: None,
            },
            &parent,
        );
        assert!(resource.is_ok());
        let Ok(resource) = resource else { return };

        assert_eq!(resource.parent_id, Some(parent));
        let ResourceTraits::User(user_trait) = resource.traits else {
            panic!("organization member must carry a user trait");
        };
        assert_eq!(user_trait.profile["first_name"], "Grace");
        assert_eq!(user_trait.profile["last_name"], "Hopper");
        assert_eq!(user_trait.emails.len(), 1);
    }

    #[test]
    fn deployment_user_falls_back_to_username_and_reports_status() {
        let resource = deployment_user_resource(&DeploymentUser {
            username: "esadmin02".to_owned(),
            enabled: true,
            ..DeploymentUser::default()
        });
        assert!(resource.is_ok());
        let Ok(resource) = resource else { return };

        assert_eq!(resource.display_name, "esadmin02");
        assert_eq!(resource.id.resource, "esadmin02");
        let ResourceTraits::User(user_trait) = resource.traits else {
            panic!("deployment user must carry a user trait");
        };
        assert_eq!(user_trait.status, UserStatus::Enabled);
        assert!(user_trait.emails.is_empty());
    }

    #[test]
    fn deployment_user_without_username_fails_translation() {
        let resource = deployment_user_resource(&DeploymentUser {
            full_name: Some("Nobody".to_owned()),
            ..DeploymentUser::default()
        });
        assert!(matches!(resource, Err(AppError::Translation(_))));
    }

    #[test]
    fn deployment_role_uses_name_as_key() {
        let resource = deployment_role_resource(&DeploymentRole {
            name: "my_admin_role".to_owned(),
            cluster: vec!["all".to_owned()],
            ..DeploymentRole::default()
        });
        assert!(resource.is_ok());
        let Ok(resource) = resource else { return };

        assert_eq!(resource.id.resource, "my_admin_role");
        assert_eq!(resource.display_name, "my_admin_role");
        assert_eq!(resource.id.resource_type, "role");
    }

    #[test]
    fn role_mapping_uses_name_as_key() {
        let resource = role_mapping_resource(&RoleMapping {
            name: "mapping7".to_owned(),
            roles: vec!["admin".to_owned()],
            enabled: true,
            ..RoleMapping::default()
        });
        assert!(resource.is_ok());
        let Ok(resource) = resource else { return };

        assert_eq!(resource.id.resource_type, "roleMapping");
        assert_eq!(resource.id.resource, "mapping7");
    }
}
