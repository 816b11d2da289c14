use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rolegate_application::{AclRepository, GrantFilter, RoleDerivedGrantQuery};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    AssignedPermission, CatalogDetails, GrantId, NewGrant, Permission, PermissionId, Role, RoleId,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct AclState {
    permissions: BTreeMap<PermissionId, Permission>,
    roles: BTreeMap<RoleId, Role>,
    grants: BTreeMap<GrantId, AssignedPermission>,
    last_permission_id: i64,
    last_role_id: i64,
    last_grant_id: i64,
}

/// In-memory ACL repository for embedding and tests.
///
/// All state sits behind one lock, so every call observes a consistent
/// snapshot and writes are serialized.
#[derive(Debug, Default)]
pub struct InMemoryAclRepository {
    state: RwLock<AclState>,
}

impl InMemoryAclRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name<T>(mut values: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    values.sort_by(|left, right| name(left).cmp(name(right)));
    values
}

#[async_trait]
impl AclRepository for InMemoryAclRepository {
    async fn create_permission(&self, details: CatalogDetails) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        if state
            .permissions
            .values()
            .any(|permission| permission.name() == details.name())
        {
            return Err(AppError::DuplicateName(format!(
                "permission '{}' already exists",
                details.name()
            )));
        }

        state.last_permission_id += 1;
        let permission = Permission::new(PermissionId::new(state.last_permission_id), details);
        state
            .permissions
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .get(&permission_id)
            .cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .find(|permission| permission.name() == name)
            .cloned())
    }

    async fn list_permissions(
        &self,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let values = state
            .permissions
            .values()
            .filter(|permission| permission_ids.is_none_or(|ids| ids.contains(&permission.id())))
            .cloned()
            .collect();

        Ok(sorted_by_name(values, Permission::name))
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        if !state.permissions.contains_key(&permission.id()) {
            return Err(AppError::NotFound(format!(
                "permission {} was not found",
                permission.id()
            )));
        }
        if state
            .permissions
            .values()
            .any(|stored| stored.id() != permission.id() && stored.name() == permission.name())
        {
            return Err(AppError::DuplicateName(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }

        state
            .permissions
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.state
            .write()
            .await
            .permissions
            .remove(&permission_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("permission {permission_id} was not found")))
    }

    async fn create_role(&self, details: CatalogDetails) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state.roles.values().any(|role| role.name() == details.name()) {
            return Err(AppError::DuplicateName(format!(
                "role '{}' already exists",
                details.name()
            )));
        }

        state.last_role_id += 1;
        let role = Role::new(RoleId::new(state.last_role_id), details);
        state.roles.insert(role.id(), role.clone());
        Ok(role)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .find(|role| role.name() == name)
            .cloned())
    }

    async fn list_roles(&self, role_ids: Option<&[RoleId]>) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let values = state
            .roles
            .values()
            .filter(|role| role_ids.is_none_or(|ids| ids.contains(&role.id())))
            .cloned()
            .collect();

        Ok(sorted_by_name(values, Role::name))
    }

    async fn update_role(&self, role: Role) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role.id()) {
            return Err(AppError::NotFound(format!(
                "role {} was not found",
                role.id()
            )));
        }
        if state
            .roles
            .values()
            .any(|stored| stored.id() != role.id() && stored.name() == role.name())
        {
            return Err(AppError::DuplicateName(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        state.roles.insert(role.id(), role.clone());
        Ok(role)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.state
            .write()
            .await
            .roles
            .remove(&role_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} was not found")))
    }

    async fn insert_grant(&self, grant: NewGrant) -> AppResult<AssignedPermission> {
        let mut state = self.state.write().await;
        if let Some(permission_id) = grant.kind.permission_id()
            && !state.permissions.contains_key(&permission_id)
        {
            return Err(AppError::NotFound(format!(
                "permission {permission_id} was not found"
            )));
        }

        state.last_grant_id += 1;
        let row =
            AssignedPermission::from_new(GrantId::new(state.last_grant_id), grant, Utc::now());
        state.grants.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_grants(&self, filter: &GrantFilter) -> AppResult<Vec<AssignedPermission>> {
        Ok(self
            .state
            .read()
            .await
            .grants
            .values()
            .filter(|grant| filter.matches(grant))
            .cloned()
            .collect())
    }

    async fn grant_exists(&self, filter: &GrantFilter) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .grants
            .values()
            .any(|grant| filter.matches(grant)))
    }

    async fn role_derived_grant_exists(&self, query: &RoleDerivedGrantQuery) -> AppResult<bool> {
        let state = self.state.read().await;
        let link_filter = query.role_link_filter();

        for role_id in state
            .grants
            .values()
            .filter(|grant| link_filter.matches(grant))
            .filter_map(|grant| grant.kind.role_id())
        {
            let role_filter = query.role_grant_filter(role_id)?;
            if state.grants.values().any(|grant| role_filter.matches(grant)) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn update_grant_status(&self, filter: &GrantFilter, status: &str) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut updated = 0;

        for grant in state
            .grants
            .values_mut()
            .filter(|grant| filter.matches(grant))
        {
            grant.status = status.to_owned();
            grant.updated_at = now;
            updated += 1;
        }

        Ok(updated)
    }

    async fn soft_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut deleted = 0;

        for grant in state
            .grants
            .values_mut()
            .filter(|grant| filter.matches(grant))
        {
            grant.deleted_at = Some(now);
            grant.updated_at = now;
            deleted += 1;
        }

        Ok(deleted)
    }

    async fn hard_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.grants.len();
        state.grants.retain(|_, grant| !filter.matches(grant));

        Ok(u64::try_from(before - state.grants.len()).unwrap_or(u64::MAX))
    }
}
