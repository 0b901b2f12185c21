//! Entities exposed by the cloud organization and deployment security APIs.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Cloud organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization identifier.
    pub id: String,
    /// Organization name.
    pub name: String,
}

/// Member of a cloud organization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrganizationMember {
    /// Cloud user identifier.
    #[serde(default)]
    pub user_id: String,
    /// Member display name.
    #[serde(default)]
    pub name: String,
    /// Member email.
    #[serde(default)]
    pub email: String,
    /// Organization the member was fetched from.
    #[serde(default)]
    pub organization_id: String,
    /// Membership start, as reported upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,
}

/// Native user of the deployment security realm.
///
/// `roles` is replaced as a whole on every write.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentUser {
    /// Unique username.
    pub username: String,
    /// Assigned role names.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Full name, when set.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Email, when set.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the account can authenticate.
    #[serde(default)]
    pub enabled: bool,
    /// Opaque user metadata.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl DeploymentUser {
    /// Returns whether the user is currently assigned the role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|assigned| assigned == role)
    }
}

/// Field-level security of an index privilege.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSecurity {
    /// Fields readable under the privilege.
    #[serde(default)]
    pub grant: Vec<String>,
    /// Fields excluded from `grant`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
}

/// Privileges over a set of indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexPrivileges {
    /// Index names or patterns.
    #[serde(default)]
    pub names: Vec<String>,
    /// Index privilege names.
    #[serde(default)]
    pub privileges: Vec<String>,
    /// Field-level restrictions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_security: Option<FieldSecurity>,
    /// Document-level query, either a JSON string or an inline object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
}

/// Privileges over an application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplicationPrivileges {
    /// Application name.
    #[serde(default)]
    pub application: String,
    /// Application privilege names.
    #[serde(default)]
    pub privileges: Vec<String>,
    /// Resources the privileges apply to.
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Deployment security role.
///
/// The upstream payload has no identifier beyond the map key, so `name` is
/// filled from the key and never sent back in a request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentRole {
    /// Role name, unique within the deployment.
    #[serde(default, skip_serializing)]
    pub name: String,
    /// Cluster privileges.
    #[serde(default)]
    pub cluster: Vec<String>,
    /// Index privileges.
    #[serde(default)]
    pub indices: Vec<IndexPrivileges>,
    /// Application privileges.
    #[serde(default)]
    pub applications: Vec<ApplicationPrivileges>,
    /// Users this role may impersonate.
    #[serde(default)]
    pub run_as: Vec<String>,
    /// Opaque role metadata.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

/// `field` rule of a role mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleMappingField {
    /// Usernames matched by the rule, in stored order.
    #[serde(default, deserialize_with = "one_or_many")]
    pub username: Vec<String>,
}

/// Rules block of a role mapping. Only the `field` rule is modelled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleMappingRules {
    /// Username match rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<RoleMappingField>,
}

/// Deployment role mapping: binds a static username list to a static role list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleMapping {
    /// Mapping name, filled from the response map key.
    #[serde(default, skip_serializing)]
    pub name: String,
    /// Roles conferred by the mapping.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Whether the mapping is active.
    #[serde(default)]
    pub enabled: bool,
    /// Matching rules.
    #[serde(default)]
    pub rules: RoleMappingRules,
    /// Opaque mapping metadata, including any upstream version marker.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl RoleMapping {
    /// Returns the usernames matched by the mapping's `field` rule.
    #[must_use]
    pub fn usernames(&self) -> &[String] {
        self.rules
            .field
            .as_ref()
            .map(|field| field.username.as_slice())
            .unwrap_or_default()
    }
}

/// Full replacement body for a role mapping write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMappingBody {
    /// Roles conferred by the mapping.
    pub roles: Vec<String>,
    /// Whether the mapping is active.
    pub enabled: bool,
    /// Matching rules.
    pub rules: RoleMappingRules,
}

impl RoleMappingBody {
    /// Creates an enabled body matching the given usernames.
    #[must_use]
    pub fn for_usernames(roles: Vec<String>, usernames: Vec<String>) -> Self {
        Self {
            roles,
            enabled: true,
            rules: RoleMappingRules {
                field: Some(RoleMappingField {
                    username: usernames,
                }),
            },
        }
    }
}

/// Identity resolved from the deployment API key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AuthenticatedIdentity {
    /// Authenticated username.
    #[serde(default)]
    pub username: String,
    /// Whether the identity is enabled.
    #[serde(default)]
    pub enabled: bool,
}

impl AuthenticatedIdentity {
    /// Returns whether the probe resolved to a usable identity.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.username.is_empty() || self.enabled
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::{AuthenticatedIdentity, DeploymentRole, RoleMapping, RoleMappingBody};

    #[test]
    fn role_mapping_decodes_username_list_in_order() {
        let mapping = serde_json::from_value::<RoleMapping>(json!({
            "enabled": true,
            "roles": ["admin"],
            "rules": { "field": { "username": ["carol", "alice", "bob"] } },
            "metadata": { "version": 3 }
        }));
        assert!(mapping.is_ok());

        let mapping = mapping.unwrap_or_default();
        assert_eq!(mapping.usernames(), ["carol", "alice", "bob"]);
        assert_eq!(mapping.metadata["version"], 3);
    }

    #[test]
    fn role_mapping_accepts_single_username() {
        let mapping = serde_json::from_value::<RoleMapping>(json!({
            "enabled": true,
            "roles": ["viewer"],
            "rules": { "field": { "username": "alice" } }
        }))
        .unwrap_or_default();

        assert_eq!(mapping.usernames(), ["alice"]);
    }

    #[test]
    fn role_mapping_without_field_rule_has_no_usernames() {
        let mapping = serde_json::from_value::<RoleMapping>(json!({
            "enabled": true,
            "roles": ["viewer"],
            "rules": { "any": [{ "field": { "realm.name": "saml1" } }] }
        }))
        .unwrap_or_default();

        assert!(mapping.usernames().is_empty());
    }

    #[test]
    fn role_mapping_body_serializes_field_rule() {
        let body = RoleMappingBody::for_usernames(
            vec!["admin".to_owned()],
            vec!["alice".to_owned(), "bob".to_owned()],
        );

        assert_eq!(
            serde_json::to_value(&body).unwrap_or_default(),
            json!({
                "roles": ["admin"],
                "enabled": true,
                "rules": { "field": { "username": ["alice", "bob"] } }
            })
        );
    }

    #[test]
    fn deployment_role_name_is_not_serialized() {
        let role = DeploymentRole {
            name: "my_admin_role".to_owned(),
            cluster: vec!["all".to_owned()],
            ..DeploymentRole::default()
        };

        let value = serde_json::to_value(&role).unwrap_or_default();
        assert!(value.get("name").is_none());
        assert_eq!(value["cluster"], json!(["all"]));
    }

    #[test]
    fn authenticated_identity_requires_username_or_enabled() {
        assert!(!AuthenticatedIdentity::default().is_usable());
        assert!(
            AuthenticatedIdentity {
                username: "elastic".to_owned(),
                enabled: true,
            }
            .is_usable()
        );
    }

    proptest! {
        #[test]
        fn username_rule_preserves_order(usernames in proptest::collection::vec("[a-z0-9_]{1,12}", 0..8)) {
            let mapping = serde_json::from_value::<RoleMapping>(json!({
                "roles": ["admin"],
                "enabled": true,
                "rules": { "field": { "username": usernames.clone() } }
            }));
            prop_assert!(mapping.is_ok());
            let mapping = mapping.unwrap_or_default();
            prop_assert_eq!(mapping.usernames(), usernames.as_slice());
        }
    }
}
