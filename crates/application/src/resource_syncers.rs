//! One syncer per resource type, each composing translators with the directory client.

mod deployment_roles;
mod deployment_users;
mod organizations;
mod role_mappings;
mod users;

pub use deployment_roles::DeploymentRoleSyncer;
pub use deployment_users::DeploymentUserSyncer;
pub use organizations::OrganizationSyncer;
pub use role_mappings::RoleMappingSyncer;
pub use users::UserSyncer;

use tessera_core::AppResult;
use tessera_domain::Resource;

/// Translates a full listing, aborting on the first entity that fails.
fn translate_all<T>(
    entities: impl IntoIterator<Item = T>,
    translate: impl Fn(&T) -> AppResult<Resource>,
    context: &str,
) -> AppResult<Vec<Resource>> {
    entities
        .into_iter()
        .map(|entity| translate(&entity).map_err(|error| error.context(context)))
        .collect()
}
