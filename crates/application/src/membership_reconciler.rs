//! Membership derivation and read-modify-write updates.
//!
//! Deployment role membership is stored on the user (`roles`) and derived by
//! scanning every user. Role mapping membership is stored on the mapping
//! (`rules.field.username`). The upstream API only offers whole-object
//! replacement for both, so every change fetches the current record, edits it
//! in memory and writes it back in a single request.
//!
//! The two paths differ on repeated calls:
//!
//! | path          | grant when present | revoke when absent |
//! |---------------|--------------------|--------------------|
//! | role          | success, rewritten | success, rewritten |
//! | role mapping  | `AlreadyGranted`   | `NotGranted`       |
//!
//! Neither path guards against concurrent writers between fetch and write;
//! the last write wins upstream.

use std::sync::Arc;

use tessera_core::{AppError, AppResult};
use tessera_domain::{DeploymentUser, RoleMapping, RoleMappingBody};
use tracing::{info, warn};

use crate::DirectoryClient;

/// Applies membership changes through a directory client.
#[derive(Clone)]
pub struct MembershipReconciler {
    client: Arc<dyn DirectoryClient>,
}

impl MembershipReconciler {
    /// Creates a reconciler over a directory client.
    #[must_use]
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self { client }
    }

    /// Adds a role to a deployment user.
    ///
    /// Granting a role the user already holds rewrites the unchanged role list.
    pub async fn grant_role(&self, username: &str, role: &str) -> AppResult<()> {
        let mut user = self
            .client
            .get_deployment_user(username)
            .await
            .map_err(|error| error.context("error fetching user"))?;

        user.roles = roles_with(&user.roles, role);
        self.client
            .update_deployment_user(username, &user)
            .await
            .map_err(|error| error.context("failed to grant role to user"))?;

        info!(role, username, "role membership granted");
        Ok(())
    }

    /// Removes a role from a deployment user.
    ///
    /// Revoking a role the user does not hold rewrites the unchanged role list.
    pub async fn revoke_role(&self, username: &str, role: &str) -> AppResult<()> {
        let mut user = self
            .client
            .get_deployment_user(username)
            .await
            .map_err(|error| error.context("error fetching user"))?;

        user.roles = roles_without(&user.roles, role);
        self.client
            .update_deployment_user(username, &user)
            .await
            .map_err(|error| error.context("failed to revoke user role"))?;

        info!(role, username, "role membership revoked");
        Ok(())
    }

    /// Adds a username to a role mapping, failing if it is already listed.
    pub async fn grant_role_mapping(&self, username: &str, mapping_name: &str) -> AppResult<()> {
        let (user, mapping) = self.fetch_user_and_mapping(username, mapping_name).await?;

        let usernames = usernames_with(mapping.usernames(), user.username.as_str())
            .inspect_err(|_| {
                warn!(
                    role_mapping = mapping_name,
                    principal_id = username,
                    "user already has this role mapping"
                );
            })?;

        let body =
            RoleMappingBody::for_usernames(mapping_roles_for_write(&user, &mapping), usernames);
        self.client
            .update_role_mapping(mapping_name, &body)
            .await
            .map_err(|error| error.context("failed to grant role mapping to user"))?;

        info!(
            role_mapping = mapping_name,
            username, "role mapping membership granted"
        );
        Ok(())
    }

    /// Removes a username from a role mapping, failing if it is not listed.
    pub async fn revoke_role_mapping(&self, username: &str, mapping_name: &str) -> AppResult<()> {
        let (user, mapping) = self.fetch_user_and_mapping(username, mapping_name).await?;

        let usernames = usernames_without(mapping.usernames(), user.username.as_str())
            .inspect_err(|_| {
                warn!(
                    role_mapping = mapping_name,
                    principal_id = username,
                    "user does not have this role mapping"
                );
            })?;

        let body =
            RoleMappingBody::for_usernames(mapping_roles_for_write(&user, &mapping), usernames);
        self.client
            .update_role_mapping(mapping_name, &body)
            .await
            .map_err(|error| error.context("failed to revoke role mapping from user"))?;

        info!(
            role_mapping = mapping_name,
            username, "role mapping membership revoked"
        );
        Ok(())
    }

    async fn fetch_user_and_mapping(
        &self,
        username: &str,
        mapping_name: &str,
    ) -> AppResult<(DeploymentUser, RoleMapping)> {
        let user = self
            .client
            .get_deployment_user(username)
            .await
            .map_err(|error| error.context("error fetching user"))?;
        let mapping = self
            .client
            .get_role_mapping(mapping_name)
            .await
            .map_err(|error| error.context("error fetching role mapping"))?;

        Ok((user, mapping))
    }
}

/// Derives the members of a role from a snapshot of deployment users.
pub fn role_members<'a>(
    users: impl IntoIterator<Item = &'a DeploymentUser>,
    role: &str,
) -> Vec<&'a DeploymentUser> {
    users.into_iter().filter(|user| user.has_role(role)).collect()
}

/// Returns the role list with `role` present exactly once.
///
/// Duplicates already present upstream are collapsed; first-seen order is kept.
#[must_use]
pub fn roles_with(roles: &[String], role: &str) -> Vec<String> {
    let mut updated = deduplicated(roles);
    if !updated.iter().any(|assigned| assigned == role) {
        updated.push(role.to_owned());
    }

    updated
}

/// Returns the role list with every occurrence of `role` removed.
#[must_use]
pub fn roles_without(roles: &[String], role: &str) -> Vec<String> {
    deduplicated(roles)
        .into_iter()
        .filter(|assigned| assigned != role)
        .collect()
}

/// Returns the username list with `username` appended.
///
/// Duplicates already present upstream are collapsed, keeping first-seen order.
pub fn usernames_with(usernames: &[String], username: &str) -> AppResult<Vec<String>> {
    if usernames.iter().any(|listed| listed == username) {
        return Err(AppError::AlreadyGranted(format!(
            "user '{username}' already has this role mapping"
        )));
    }

    let mut updated = deduplicated(usernames);
    updated.push(username.to_owned());
    Ok(updated)
}

/// Returns the username list without the first occurrence of `username`.
///
/// The relative order of the remaining usernames is preserved.
pub fn usernames_without(usernames: &[String], username: &str) -> AppResult<Vec<String>> {
    let position = usernames
        .iter()
        .position(|listed| listed == username)
        .ok_or_else(|| {
            AppError::NotGranted(format!(
                "user '{username}' does not have this role mapping"
            ))
        })?;

    let mut updated = usernames.to_vec();
    updated.remove(position);
    Ok(updated)
}

/// Chooses the `roles` field written back with a role mapping update.
///
/// The update endpoint replaces the whole mapping, and the mapping's roles
/// are populated from the principal user's current role assignment rather
/// than from the mapping's stored roles. A mapping's roles therefore follow
/// the last user granted or revoked through it.
#[must_use]
pub fn mapping_roles_for_write(principal: &DeploymentUser, _mapping: &RoleMapping) -> Vec<String> {
    principal.roles.clone()
}

fn deduplicated(values: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(value) {
            unique.push(value.clone());
        }
    }

    unique
}
