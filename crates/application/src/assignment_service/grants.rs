use rolegate_core::TeamId;
use rolegate_domain::{GrantKind, NewGrant, Permission, PermissionId, Resource, Role, RoleId};
use tracing::info;

use crate::acl_ports::{GrantFilter, TeamScope};

use super::*;

impl AssignmentService {
    /// Grants a permission to the resource, one row per action.
    ///
    /// Each row carries the resource's own team, if any.
    pub async fn assign_permission<R>(
        &self,
        resource: &R,
        permission: &Permission,
        actions: &[&str],
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        self.assign_permission_by_id(resource, permission.id(), actions)
            .await
    }

    /// Resolves the permission by machine name, then grants it.
    pub async fn assign_permission_by_name<R>(
        &self,
        resource: &R,
        permission_name: &str,
        actions: &[&str],
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        let permission = self
            .repository
            .find_permission_by_name(permission_name.trim())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_name}' was not found"))
            })?;

        self.assign_permission_by_id(resource, permission.id(), actions)
            .await
    }

    /// Grants a permission identity to the resource, one row per action.
    pub async fn assign_permission_by_id<R>(
        &self,
        resource: &R,
        permission_id: PermissionId,
        actions: &[&str],
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        validate_actions(actions)?;
        let resource_key = resource.resource_key()?;
        let team_id = resource.team_id().cloned();

        for action in actions {
            self.repository
                .insert_grant(NewGrant {
                    kind: GrantKind::Direct { permission_id },
                    resource: resource_key.clone(),
                    team_id: team_id.clone(),
                    action: (*action).to_owned(),
                    status: String::new(),
                    remarks: String::new(),
                })
                .await?;
        }

        info!(
            resource = %resource_key,
            permission_id = %permission_id,
            actions = ?actions,
            "permission assigned"
        );
        Ok(())
    }

    /// Removes the resource's direct grants of the given permissions.
    pub async fn retract_permission<R>(
        &self,
        resource: &R,
        permissions: &[Permission],
    ) -> AppResult<u64>
    where
        R: Resource + ?Sized,
    {
        let permission_ids = permissions
            .iter()
            .map(Permission::id)
            .collect::<Vec<_>>();
        self.retract_permission_by_id(resource, &permission_ids)
            .await
    }

    /// Removes the resource's direct grants of the given permission ids.
    ///
    /// Returns the number of rows removed; an empty id set removes nothing.
    pub async fn retract_permission_by_id<R>(
        &self,
        resource: &R,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>
    where
        R: Resource + ?Sized,
    {
        let resource_key = resource.resource_key()?;
        if permission_ids.is_empty() {
            return Ok(0);
        }

        let removed = self
            .repository
            .hard_delete_grants(
                &GrantFilter::for_resource(resource_key.clone())
                    .with_permission_ids(permission_ids.to_vec())
                    .including_deleted(),
            )
            .await?;

        info!(resource = %resource_key, removed, "permissions retracted");
        Ok(removed)
    }

    /// Links the resource to a role. A blank `team_id` links it unscoped.
    pub async fn assign_role<R>(
        &self,
        resource: &R,
        role: &Role,
        team_id: &str,
        status: &str,
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        self.insert_role_link(resource, role.id(), team_id, status, "")
            .await
    }

    /// Links the resource to a role and records free-form remarks.
    pub async fn assign_role_with_remarks<R>(
        &self,
        resource: &R,
        role: &Role,
        team_id: &str,
        status: &str,
        remarks: &str,
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        self.insert_role_link(resource, role.id(), team_id, status, remarks)
            .await
    }

    /// Links the resource to a role identity without checking the catalog.
    pub async fn assign_role_by_id<R>(
        &self,
        resource: &R,
        role_id: RoleId,
        team_id: &str,
        status: &str,
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        self.insert_role_link(resource, role_id, team_id, status, "")
            .await
    }

    /// Resolves the role by machine name, then links it with an empty status.
    pub async fn assign_role_by_name<R>(
        &self,
        resource: &R,
        role_name: &str,
        team_id: &str,
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        self.assign_role_by_name_with_status(resource, role_name, team_id, "")
            .await
    }

    /// Resolves the role by machine name, then links it with `status`.
    pub async fn assign_role_by_name_with_status<R>(
        &self,
        resource: &R,
        role_name: &str,
        team_id: &str,
        status: &str,
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        let role = self
            .repository
            .find_role_by_name(role_name.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' was not found")))?;

        self.insert_role_link(resource, role.id(), team_id, status, "")
            .await
    }

    /// Soft-deletes the resource's links to the role.
    ///
    /// A blank `team_id` removes the link in every team.
    pub async fn unassign_role<R>(&self, resource: &R, role: &Role, team_id: &str) -> AppResult<u64>
    where
        R: Resource + ?Sized,
    {
        let resource_key = resource.resource_key()?;
        let team = TeamId::from_optional(team_id)
            .map(TeamScope::Team)
            .unwrap_or_default();

        let removed = self
            .repository
            .soft_delete_grants(
                &GrantFilter::for_resource(resource_key.clone())
                    .with_role_ids(vec![role.id()])
                    .in_team(team),
            )
            .await?;

        info!(
            resource = %resource_key,
            role = role.name(),
            team_id,
            removed,
            "role unassigned"
        );
        Ok(removed)
    }

    async fn insert_role_link<R>(
        &self,
        resource: &R,
        role_id: RoleId,
        team_id: &str,
        status: &str,
        remarks: &str,
    ) -> AppResult<()>
    where
        R: Resource + ?Sized,
    {
        let resource_key = resource.resource_key()?;

        self.repository
            .insert_grant(NewGrant {
                kind: GrantKind::RoleLink { role_id },
                resource: resource_key.clone(),
                team_id: TeamId::from_optional(team_id),
                action: String::new(),
                status: status.to_owned(),
                remarks: remarks.to_owned(),
            })
            .await?;

        info!(resource = %resource_key, role_id = %role_id, team_id, status, "role assigned");
        Ok(())
    }
}
