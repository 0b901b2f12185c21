use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tessera_core::{AppError, AppResult};
use tessera_domain::{
    AuthenticatedIdentity, DeploymentRole, DeploymentUser, Organization, OrganizationMember,
    RoleMapping, RoleMappingBody,
};
use tokio::sync::Mutex;

use crate::DirectoryClient;

/// In-memory directory recording every call it serves.
#[derive(Default)]
pub(crate) struct FakeDirectoryClient {
    pub organizations: Vec<Organization>,
    pub members: HashMap<String, Vec<OrganizationMember>>,
    pub users: Mutex<BTreeMap<String, DeploymentUser>>,
    pub roles: Mutex<BTreeMap<String, DeploymentRole>>,
    pub mappings: Mutex<BTreeMap<String, RoleMapping>>,
    pub identity: AuthenticatedIdentity,
    pub fail_writes: bool,
    pub calls: Mutex<Vec<String>>,
    pub mapping_writes: Mutex<Vec<(String, RoleMappingBody)>>,
}

impl FakeDirectoryClient {
    pub fn with_organization(mut self, id: &str, name: &str) -> Self {
        self.organizations.push(Organization {
            id: id.to_owned(),
            name: name.to_owned(),
        });
        self
    }

    pub fn with_member(mut self, organization_id: &str, user_id: &str, name: &str) -> Self {
        self.members
            .entry(organization_id.to_owned())
            .or_default()
            .push(OrganizationMember {
                user_id: user_id.to_owned(),
                name: name.to_owned(),
                email: format!("{user_id}@example.com"),
                organization_id: organization_id.to_owned(),
                member_since: None,
            });
        self
    }

    pub fn with_user(mut self, username: &str, roles: &[&str]) -> Self {
        self.users.get_mut().insert(
            username.to_owned(),
            DeploymentUser {
                username: username.to_owned(),
                roles: roles.iter().map(|role| (*role).to_owned()).collect(),
                full_name: None,
                email: None,
                enabled: true,
                metadata: serde_json::Value::Null,
            },
        );
        self
    }

    pub fn with_role(mut self, name: &str) -> Self {
        self.roles.get_mut().insert(
            name.to_owned(),
            DeploymentRole {
                name: name.to_owned(),
                ..DeploymentRole::default()
            },
        );
        self
    }

    pub fn with_mapping(mut self, name: &str, roles: &[&str], usernames: &[&str]) -> Self {
        let body = RoleMappingBody::for_usernames(
            roles.iter().map(|role| (*role).to_owned()).collect(),
            usernames
                .iter()
                .map(|username| (*username).to_owned())
                .collect(),
        );
        self.mappings.get_mut().insert(
            name.to_owned(),
            RoleMapping {
                name: name.to_owned(),
                roles: body.roles,
                enabled: body.enabled,
                rules: body.rules,
                metadata: serde_json::Value::Null,
            },
        );
        self
    }

    pub fn with_identity(mut self, username: &str, enabled: bool) -> Self {
        self.identity = AuthenticatedIdentity {
            username: username.to_owned(),
            enabled,
        };
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub async fn user_roles(&self, username: &str) -> Vec<String> {
        self.users
            .lock()
            .await
            .get(username)
            .map(|user| user.roles.clone())
            .unwrap_or_default()
    }

    pub async fn mapping(&self, name: &str) -> RoleMapping {
        self.mappings
            .lock()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.starts_with("update_") || call.starts_with("delete_"))
            .count()
    }

    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().await.push(call.into());
    }

    fn reject_write(&self) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::Transport("connection reset by peer".to_owned()));
        }

        Ok(())
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectoryClient {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        self.record("list_organizations").await;
        Ok(self.organizations.clone())
    }

    async fn list_organization_members(
        &self,
        organization_id: &str,
    ) -> AppResult<Vec<OrganizationMember>> {
        self.record(format!("list_organization_members:{organization_id}"))
            .await;
        Ok(self
            .members
            .get(organization_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_deployment_users(&self) -> AppResult<BTreeMap<String, DeploymentUser>> {
        self.record("list_deployment_users").await;
        Ok(self.users.lock().await.clone())
    }

    async fn get_deployment_user(&self, username: &str) -> AppResult<DeploymentUser> {
        self.record(format!("get_deployment_user:{username}")).await;
        self.users
            .lock()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("deployment user '{username}'")))
    }

    async fn update_deployment_user(
        &self,
        username: &str,
        user: &DeploymentUser,
    ) -> AppResult<()> {
        self.record(format!("update_deployment_user:{username}"))
            .await;
        self.reject_write()?;
        self.users
            .lock()
            .await
            .insert(username.to_owned(), user.clone());
        Ok(())
    }

    async fn list_deployment_roles(&self) -> AppResult<BTreeMap<String, DeploymentRole>> {
        self.record("list_deployment_roles").await;
        Ok(self.roles.lock().await.clone())
    }

    async fn update_deployment_role(&self, name: &str, role: &DeploymentRole) -> AppResult<()> {
        self.record(format!("update_deployment_role:{name}")).await;
        self.reject_write()?;
        let mut role = role.clone();
        role.name = name.to_owned();
        self.roles.lock().await.insert(name.to_owned(), role);
        Ok(())
    }

    async fn list_role_mappings(&self) -> AppResult<BTreeMap<String, RoleMapping>> {
        self.record("list_role_mappings").await;
        Ok(self.mappings.lock().await.clone())
    }

    async fn get_role_mapping(&self, name: &str) -> AppResult<RoleMapping> {
        self.record(format!("get_role_mapping:{name}")).await;
        self.mappings
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("role mapping '{name}'")))
    }

    async fn update_role_mapping(&self, name: &str, body: &RoleMappingBody) -> AppResult<()> {
        self.record(format!("update_role_mapping:{name}")).await;
        self.reject_write()?;
        self.mapping_writes
            .lock()
            .await
            .push((name.to_owned(), body.clone()));

        let mut mappings = self.mappings.lock().await;
        let mapping = mappings.entry(name.to_owned()).or_default();
        mapping.name = name.to_owned();
        mapping.roles = body.roles.clone();
        mapping.enabled = body.enabled;
        mapping.rules = body.rules.clone();
        Ok(())
    }

    async fn delete_role_mapping(&self, name: &str) -> AppResult<()> {
        self.record(format!("delete_role_mapping:{name}")).await;
        self.reject_write()?;
        self.mappings
            .lock()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("role mapping '{name}'")))
    }

    async fn authenticate_deployment(&self) -> AppResult<AuthenticatedIdentity> {
        self.record("authenticate_deployment").await;
        if !self.identity.is_usable() {
            return Err(AppError::Unauthorized(
                "invalid deployment api key".to_owned(),
            ));
        }

        Ok(self.identity.clone())
    }
}
