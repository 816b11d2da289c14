use rolegate_domain::{CatalogDetails, Permission, PermissionId, Role, RoleId};
use tracing::info;

use crate::acl_ports::GrantFilter;

use super::*;

impl AssignmentService {
    /// Creates a permission with a globally unique machine name.
    pub async fn create_permission(
        &self,
        title: &str,
        name: &str,
        description: &str,
    ) -> AppResult<Permission> {
        let details = CatalogDetails::new(title, name, description)?;

        if self
            .repository
            .find_permission_by_name(details.name())
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateName(format!(
                "permission '{}' already exists",
                details.name()
            )));
        }

        let permission = self.repository.create_permission(details).await?;
        info!(permission_id = %permission.id(), name = permission.name(), "permission created");
        Ok(permission)
    }

    /// Updates title, name, and description of an existing permission.
    pub async fn update_permission(
        &self,
        permission_id: PermissionId,
        title: &str,
        name: &str,
        description: &str,
    ) -> AppResult<Permission> {
        let details = CatalogDetails::new(title, name, description)?;
        let existing = self.require_permission(permission_id).await?;

        if let Some(other) = self
            .repository
            .find_permission_by_name(details.name())
            .await?
            && other.id() != permission_id
        {
            return Err(AppError::DuplicateName(format!(
                "permission '{}' already exists",
                details.name()
            )));
        }

        self.repository
            .update_permission(existing.with_details(details))
            .await
    }

    /// Deletes a permission after removing every grant row that references it.
    pub async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let permission = self.require_permission(permission_id).await?;

        let removed = self
            .repository
            .hard_delete_grants(
                &GrantFilter::default()
                    .with_permission_ids(vec![permission_id])
                    .including_deleted(),
            )
            .await?;
        self.repository.delete_permission(permission_id).await?;

        info!(
            permission_id = %permission_id,
            name = permission.name(),
            removed_grants = removed,
            "permission deleted"
        );
        Ok(())
    }

    /// Lists all permissions ordered by name.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.repository.list_permissions(None).await
    }

    /// Finds a permission by machine name.
    pub async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        self.repository.find_permission_by_name(name.trim()).await
    }

    /// Creates a role with a globally unique machine name.
    pub async fn create_role(&self, title: &str, name: &str, description: &str) -> AppResult<Role> {
        let details = CatalogDetails::new(title, name, description)?;

        if self
            .repository
            .find_role_by_name(details.name())
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateName(format!(
                "role '{}' already exists",
                details.name()
            )));
        }

        let role = self.repository.create_role(details).await?;
        info!(role_id = %role.id(), name = role.name(), "role created");
        Ok(role)
    }

    /// Updates title, name, and description of an existing role.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        title: &str,
        name: &str,
        description: &str,
    ) -> AppResult<Role> {
        let details = CatalogDetails::new(title, name, description)?;
        let existing = self.require_role(role_id).await?;

        if let Some(other) = self.repository.find_role_by_name(details.name()).await?
            && other.id() != role_id
        {
            return Err(AppError::DuplicateName(format!(
                "role '{}' already exists",
                details.name()
            )));
        }

        self.repository
            .update_role(existing.with_details(details))
            .await
    }

    /// Deletes the role row only.
    ///
    /// Role links pointing at the role and the role's own permission grants
    /// are left in place and keep resolving until they are retracted.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let role = self.require_role(role_id).await?;
        self.repository.delete_role(role_id).await?;

        info!(role_id = %role_id, name = role.name(), "role deleted");
        Ok(())
    }

    /// Lists all roles ordered by name.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.list_roles(None).await
    }

    /// Finds a role by machine name.
    pub async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.repository.find_role_by_name(name.trim()).await
    }

    async fn require_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission {permission_id} was not found")))
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} was not found")))
    }
}
