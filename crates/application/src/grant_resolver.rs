use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use rolegate_core::{AppError, AppResult, TeamId};
use rolegate_domain::{
    GRANT_STATUS_INACTIVE, Permission, PermissionId, ROLE_RESOURCE_KIND, Resource, ResourceKey,
    Role, RoleId,
};
use tracing::{debug, warn};

use crate::acl_ports::{AclRepository, GrantFilter, RoleDerivedGrantQuery, TeamScope};

/// Whether rows with status `"inactive"` still authorize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InactiveGrantPolicy {
    /// Status is data only; inactive rows authorize like any other row.
    #[default]
    Honor,
    /// Inactive rows are skipped on both sides of a role-derived match.
    Exclude,
}

impl InactiveGrantPolicy {
    /// Returns a stable configuration value for this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Honor => "honor",
            Self::Exclude => "exclude",
        }
    }

    fn excluded_status(self) -> Option<String> {
        match self {
            Self::Honor => None,
            Self::Exclude => Some(GRANT_STATUS_INACTIVE.to_owned()),
        }
    }
}

impl FromStr for InactiveGrantPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "honor" => Ok(Self::Honor),
            "exclude" => Ok(Self::Exclude),
            other => Err(AppError::Validation(format!(
                "inactive grant policy must be 'honor' or 'exclude', got '{other}'"
            ))),
        }
    }
}

/// Read-only decision procedure over direct and role-derived grants.
///
/// Every call reads the current rows from storage. The boolean `check_*`
/// methods fail closed: storage errors and invalid input are logged and
/// reported as a denial. The `try_*` variants propagate them instead.
#[derive(Clone)]
pub struct GrantResolver {
    repository: Arc<dyn AclRepository>,
    inactive_grants: InactiveGrantPolicy,
}

impl GrantResolver {
    /// Creates a resolver honoring inactive grants.
    #[must_use]
    pub fn new(repository: Arc<dyn AclRepository>) -> Self {
        Self {
            repository,
            inactive_grants: InactiveGrantPolicy::default(),
        }
    }

    /// Returns a copy using the given inactive-grant policy.
    #[must_use]
    pub fn with_inactive_grant_policy(self, inactive_grants: InactiveGrantPolicy) -> Self {
        Self {
            inactive_grants,
            ..self
        }
    }

    /// Returns the active inactive-grant policy.
    #[must_use]
    pub fn inactive_grant_policy(&self) -> InactiveGrantPolicy {
        self.inactive_grants
    }

    /// Returns whether the resource holds the permission for any of the
    /// actions, regardless of team.
    pub async fn check_permission<R>(
        &self,
        resource: &R,
        permission: &Permission,
        actions: &[&str],
    ) -> bool
    where
        R: Resource + ?Sized,
    {
        let decision = self.try_check_permission(resource, permission, actions).await;
        fail_closed(resource, permission, decision)
    }

    /// Returns whether the resource holds the permission for any of the
    /// actions within exactly `team_id`.
    pub async fn check_permission_with_team<R>(
        &self,
        resource: &R,
        permission: &Permission,
        team_id: &str,
        actions: &[&str],
    ) -> bool
    where
        R: Resource + ?Sized,
    {
        let decision = self
            .try_check_permission_with_team(resource, permission, team_id, actions)
            .await;
        fail_closed(resource, permission, decision)
    }

    /// Same as [`Self::check_permission`] but propagates storage errors.
    pub async fn try_check_permission<R>(
        &self,
        resource: &R,
        permission: &Permission,
        actions: &[&str],
    ) -> AppResult<bool>
    where
        R: Resource + ?Sized,
    {
        self.resolve(resource, permission.id(), TeamScope::Any, actions)
            .await
    }

    /// Same as [`Self::check_permission_with_team`] but propagates storage
    /// errors and rejects a blank team id.
    pub async fn try_check_permission_with_team<R>(
        &self,
        resource: &R,
        permission: &Permission,
        team_id: &str,
        actions: &[&str],
    ) -> AppResult<bool>
    where
        R: Resource + ?Sized,
    {
        let team = TeamScope::Team(TeamId::new(team_id)?);
        self.resolve(resource, permission.id(), team, actions).await
    }

    /// Returns whether the role itself holds the permission for any action.
    pub async fn check_permission_in_role(
        &self,
        permission: &Permission,
        role: &Role,
        actions: &[&str],
    ) -> bool {
        self.check_permission(role, permission, actions).await
    }

    /// Returns whether the resource is linked to the role within `team_id`.
    pub async fn check_role_with_team<R>(&self, resource: &R, role: &Role, team_id: &str) -> bool
    where
        R: Resource + ?Sized,
    {
        let lookup = async {
            let filter = GrantFilter::for_resource(resource.resource_key()?)
                .with_role_ids(vec![role.id()])
                .in_team(TeamScope::Team(TeamId::new(team_id)?))
                .excluding_status(self.inactive_grants.excluded_status());
            self.repository.grant_exists(&filter).await
        };

        match lookup.await {
            Ok(linked) => linked,
            Err(error) => {
                warn!(
                    resource_kind = resource.resource_kind(),
                    role = role.name(),
                    team_id,
                    %error,
                    "role membership lookup failed; treating as not linked"
                );
                false
            }
        }
    }

    /// Lists every permission the resource holds directly or through its
    /// roles, in any team and for any action, ordered by name.
    pub async fn permissions_of<R>(&self, resource: &R) -> AppResult<Vec<Permission>>
    where
        R: Resource + ?Sized,
    {
        let excluded_status = self.inactive_grants.excluded_status();
        let resource_key = resource.resource_key()?;

        let mut permission_ids = self
            .direct_permission_ids(resource_key.clone(), excluded_status.clone())
            .await?;

        for role_id in self
            .linked_role_ids(resource_key, excluded_status.clone())
            .await?
        {
            let role_key = ResourceKey::new(ROLE_RESOURCE_KIND, role_id.to_string())?;
            permission_ids.extend(
                self.direct_permission_ids(role_key, excluded_status.clone())
                    .await?,
            );
        }

        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }

        let permission_ids = permission_ids.into_iter().collect::<Vec<_>>();
        self.repository
            .list_permissions(Some(permission_ids.as_slice()))
            .await
    }

    /// Lists the roles linked to the resource in any team, ordered by name.
    pub async fn roles_of<R>(&self, resource: &R) -> AppResult<Vec<Role>>
    where
        R: Resource + ?Sized,
    {
        let role_ids = self
            .linked_role_ids(
                resource.resource_key()?,
                self.inactive_grants.excluded_status(),
            )
            .await?;

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let role_ids = role_ids.into_iter().collect::<Vec<_>>();
        self.repository.list_roles(Some(role_ids.as_slice())).await
    }

    async fn resolve<R>(
        &self,
        resource: &R,
        permission_id: PermissionId,
        team: TeamScope,
        actions: &[&str],
    ) -> AppResult<bool>
    where
        R: Resource + ?Sized,
    {
        if actions.is_empty() {
            return Ok(false);
        }

        let resource_key = resource.resource_key()?;
        let actions = actions
            .iter()
            .map(|action| (*action).to_owned())
            .collect::<Vec<_>>();
        let excluded_status = self.inactive_grants.excluded_status();

        let direct = GrantFilter::for_resource(resource_key.clone())
            .with_permission_ids(vec![permission_id])
            .with_actions(actions.clone())
            .in_team(team.clone())
            .excluding_status(excluded_status.clone());

        if self.repository.grant_exists(&direct).await? {
            debug!(resource = %resource_key, %permission_id, "direct grant matched");
            return Ok(true);
        }

        let derived = RoleDerivedGrantQuery {
            resource: resource_key,
            permission_id,
            actions,
            team,
            excluded_status,
        };
        let allowed = self.repository.role_derived_grant_exists(&derived).await?;
        debug!(
            resource = %derived.resource,
            %permission_id,
            allowed,
            "role-derived grant evaluated"
        );

        Ok(allowed)
    }

    async fn direct_permission_ids(
        &self,
        resource_key: ResourceKey,
        excluded_status: Option<String>,
    ) -> AppResult<BTreeSet<PermissionId>> {
        let filter = GrantFilter::for_resource(resource_key)
            .direct()
            .excluding_status(excluded_status);

        Ok(self
            .repository
            .find_grants(&filter)
            .await?
            .into_iter()
            .filter_map(|grant| grant.kind.permission_id())
            .collect())
    }

    async fn linked_role_ids(
        &self,
        resource_key: ResourceKey,
        excluded_status: Option<String>,
    ) -> AppResult<BTreeSet<RoleId>> {
        let filter = GrantFilter::for_resource(resource_key)
            .role_links()
            .excluding_status(excluded_status);

        Ok(self
            .repository
            .find_grants(&filter)
            .await?
            .into_iter()
            .filter_map(|grant| grant.kind.role_id())
            .collect())
    }
}

fn fail_closed<R>(resource: &R, permission: &Permission, decision: AppResult<bool>) -> bool
where
    R: Resource + ?Sized,
{
    match decision {
        Ok(allowed) => allowed,
        Err(error) => {
            warn!(
                resource_kind = resource.resource_kind(),
                resource_id = %resource.resource_id(),
                permission = permission.name(),
                %error,
                "grant resolution failed; denying"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests;
