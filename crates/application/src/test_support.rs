//! Shared fake storage for service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    AssignedPermission, CatalogDetails, GrantId, NewGrant, Permission, PermissionId, Role, RoleId,
};

use crate::acl_ports::{AclRepository, GrantFilter, RoleDerivedGrantQuery};

#[derive(Default)]
struct FakeState {
    permissions: Vec<Permission>,
    roles: Vec<Role>,
    grants: Vec<AssignedPermission>,
    next_id: i64,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Vec-backed repository with switchable failures.
#[derive(Default)]
pub(crate) struct FakeAclRepository {
    state: Mutex<FakeState>,
    fail_reads: AtomicBool,
    inserts_before_failure: Mutex<Option<usize>>,
    inserts: AtomicUsize,
}

impl FakeAclRepository {
    /// Makes every grant read fail with a storage error.
    pub(crate) fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Lets `count` more grant inserts succeed, then fails the rest.
    pub(crate) async fn fail_inserts_after(&self, count: usize) {
        *self.inserts_before_failure.lock().await = Some(count);
    }

    pub(crate) async fn grants(&self) -> Vec<AssignedPermission> {
        self.state.lock().await.grants.clone()
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Storage("connection reset".to_owned()));
        }
        Ok(())
    }
}

fn duplicate(kind: &str, name: &str) -> AppError {
    AppError::DuplicateName(format!("{kind} '{name}' already exists"))
}

#[async_trait]
impl AclRepository for FakeAclRepository {
    async fn create_permission(&self, details: CatalogDetails) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        if state
            .permissions
            .iter()
            .any(|permission| permission.name() == details.name())
        {
            return Err(duplicate("permission", details.name()));
        }

        let permission = Permission::new(PermissionId::new(state.next_id()), details);
        state.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        let state = self.state.lock().await;
        Ok(state
            .permissions
            .iter()
            .find(|permission| permission.id() == permission_id)
            .cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let state = self.state.lock().await;
        Ok(state
            .permissions
            .iter()
            .find(|permission| permission.name() == name)
            .cloned())
    }

    async fn list_permissions(
        &self,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.lock().await;
        let mut permissions = state
            .permissions
            .iter()
            .filter(|permission| permission_ids.is_none_or(|ids| ids.contains(&permission.id())))
            .cloned()
            .collect::<Vec<_>>();
        permissions.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(permissions)
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        if state
            .permissions
            .iter()
            .any(|stored| stored.name() == permission.name() && stored.id() != permission.id())
        {
            return Err(duplicate("permission", permission.name()));
        }

        let stored = state
            .permissions
            .iter_mut()
            .find(|stored| stored.id() == permission.id())
            .ok_or_else(|| AppError::NotFound(format!("permission {}", permission.id())))?;
        *stored = permission.clone();
        Ok(permission)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let before = state.permissions.len();
        state
            .permissions
            .retain(|permission| permission.id() != permission_id);
        if state.permissions.len() == before {
            return Err(AppError::NotFound(format!("permission {permission_id}")));
        }
        Ok(())
    }

    async fn create_role(&self, details: CatalogDetails) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|role| role.name() == details.name()) {
            return Err(duplicate("role", details.name()));
        }

        let role = Role::new(RoleId::new(state.next_id()), details);
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|role| role.id() == role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|role| role.name() == name).cloned())
    }

    async fn list_roles(&self, role_ids: Option<&[RoleId]>) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        let mut roles = state
            .roles
            .iter()
            .filter(|role| role_ids.is_none_or(|ids| ids.contains(&role.id())))
            .cloned()
            .collect::<Vec<_>>();
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    async fn update_role(&self, role: Role) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        if state
            .roles
            .iter()
            .any(|stored| stored.name() == role.name() && stored.id() != role.id())
        {
            return Err(duplicate("role", role.name()));
        }

        let stored = state
            .roles
            .iter_mut()
            .find(|stored| stored.id() == role.id())
            .ok_or_else(|| AppError::NotFound(format!("role {}", role.id())))?;
        *stored = role.clone();
        Ok(role)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let before = state.roles.len();
        state.roles.retain(|role| role.id() != role_id);
        if state.roles.len() == before {
            return Err(AppError::NotFound(format!("role {role_id}")));
        }
        Ok(())
    }

    async fn insert_grant(&self, grant: NewGrant) -> AppResult<AssignedPermission> {
        if let Some(limit) = *self.inserts_before_failure.lock().await
            && self.inserts.load(Ordering::SeqCst) >= limit
        {
            return Err(AppError::Storage("insert rejected".to_owned()));
        }
        self.inserts.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        let row = AssignedPermission::from_new(GrantId::new(state.next_id()), grant, Utc::now());
        state.grants.push(row.clone());
        Ok(row)
    }

    async fn find_grants(&self, filter: &GrantFilter) -> AppResult<Vec<AssignedPermission>> {
        self.check_reads()?;
        let state = self.state.lock().await;
        Ok(state
            .grants
            .iter()
            .filter(|grant| filter.matches(grant))
            .cloned()
            .collect())
    }

    async fn grant_exists(&self, filter: &GrantFilter) -> AppResult<bool> {
        self.check_reads()?;
        let state = self.state.lock().await;
        Ok(state.grants.iter().any(|grant| filter.matches(grant)))
    }

    async fn role_derived_grant_exists(&self, query: &RoleDerivedGrantQuery) -> AppResult<bool> {
        self.check_reads()?;
        let state = self.state.lock().await;
        let link_filter = query.role_link_filter();

        for link in state.grants.iter().filter(|grant| link_filter.matches(grant)) {
            let Some(role_id) = link.kind.role_id() else {
                continue;
            };
            let role_filter = query.role_grant_filter(role_id)?;
            if state.grants.iter().any(|grant| role_filter.matches(grant)) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn update_grant_status(&self, filter: &GrantFilter, status: &str) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut affected = 0;
        for grant in state.grants.iter_mut().filter(|grant| filter.matches(grant)) {
            grant.status = status.to_owned();
            grant.updated_at = Utc::now();
            affected += 1;
        }
        Ok(affected)
    }

    async fn soft_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut affected = 0;
        for grant in state.grants.iter_mut().filter(|grant| filter.matches(grant)) {
            grant.deleted_at = Some(Utc::now());
            affected += 1;
        }
        Ok(affected)
    }

    async fn hard_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.grants.len();
        state.grants.retain(|grant| !filter.matches(grant));
        Ok(u64::try_from(before - state.grants.len()).unwrap_or(u64::MAX))
    }
}
