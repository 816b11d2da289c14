use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::{
    AssignedPermission, CatalogDetails, NewGrant, Permission, PermissionId, Role, RoleId,
};

use super::filters::{GrantFilter, RoleDerivedGrantQuery};

/// Storage port for the permission/role catalog and grant rows.
///
/// Implementations own uniqueness of machine names and report violations as
/// `AppError::DuplicateName`; every other failure is `AppError::Storage`.
#[async_trait]
pub trait AclRepository: Send + Sync {
    /// Inserts a permission and returns it with its assigned identity.
    async fn create_permission(&self, details: CatalogDetails) -> AppResult<Permission>;

    /// Finds a permission by identity.
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>>;

    /// Finds a permission by machine name.
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// Lists permissions ordered by name, optionally restricted to ids.
    async fn list_permissions(
        &self,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>>;

    /// Overwrites title, name, and description of an existing permission.
    async fn update_permission(&self, permission: Permission) -> AppResult<Permission>;

    /// Deletes a permission row. Grant rows are not touched.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Inserts a role and returns it with its assigned identity.
    async fn create_role(&self, details: CatalogDetails) -> AppResult<Role>;

    /// Finds a role by identity.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by machine name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Lists roles ordered by name, optionally restricted to ids.
    async fn list_roles(&self, role_ids: Option<&[RoleId]>) -> AppResult<Vec<Role>>;

    /// Overwrites title, name, and description of an existing role.
    async fn update_role(&self, role: Role) -> AppResult<Role>;

    /// Deletes a role row. Grant rows are not touched.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Inserts one grant row.
    async fn insert_grant(&self, grant: NewGrant) -> AppResult<AssignedPermission>;

    /// Lists live grant rows matching the filter, ordered by id.
    async fn find_grants(&self, filter: &GrantFilter) -> AppResult<Vec<AssignedPermission>>;

    /// Returns whether at least one live row matches the filter.
    async fn grant_exists(&self, filter: &GrantFilter) -> AppResult<bool>;

    /// Evaluates the role-link join in one storage round trip where possible.
    async fn role_derived_grant_exists(&self, query: &RoleDerivedGrantQuery) -> AppResult<bool>;

    /// Sets `status` on matching rows and returns the affected count.
    async fn update_grant_status(&self, filter: &GrantFilter, status: &str) -> AppResult<u64>;

    /// Stamps `deleted_at` on matching rows and returns the affected count.
    async fn soft_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64>;

    /// Removes matching rows and returns the affected count.
    ///
    /// Soft-deleted rows are removed only when the filter includes them.
    async fn hard_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64>;
}
