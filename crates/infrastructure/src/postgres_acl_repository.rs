mod catalog;
mod filters;
mod grants;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolegate_application::{AclRepository, GrantFilter, RoleDerivedGrantQuery};
use rolegate_core::{AppError, AppResult, TeamId};
use rolegate_domain::{
    AssignedPermission, CatalogDetails, GrantId, GrantKind, NewGrant, Permission, PermissionId,
    ResourceKey, Role, RoleId,
};
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed ACL repository.
///
/// Expects the schema from this crate's `migrations` directory.
#[derive(Clone)]
pub struct PostgresAclRepository {
    pool: PgPool,
}

impl PostgresAclRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CatalogRow {
    id: i64,
    title: String,
    name: String,
    description: Option<String>,
}

impl CatalogRow {
    fn into_details(self) -> AppResult<(i64, CatalogDetails)> {
        let details =
            CatalogDetails::new(self.title, self.name, self.description.unwrap_or_default())
                .map_err(|error| {
                    AppError::Storage(format!("catalog row {} is invalid: {error}", self.id))
                })?;
        Ok((self.id, details))
    }

    fn into_permission(self) -> AppResult<Permission> {
        let (id, details) = self.into_details()?;
        Ok(Permission::new(PermissionId::new(id), details))
    }

    fn into_role(self) -> AppResult<Role> {
        let (id, details) = self.into_details()?;
        Ok(Role::new(RoleId::new(id), details))
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    id: i64,
    permission_id: Option<i64>,
    role_id: Option<i64>,
    team_id: Option<String>,
    resource_kind: String,
    resource_id: String,
    action: String,
    status: String,
    remarks: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<GrantRow> for AssignedPermission {
    type Error = AppError;

    fn try_from(row: GrantRow) -> Result<Self, Self::Error> {
        let kind = GrantKind::from_columns(row.permission_id, row.role_id).ok_or_else(|| {
            AppError::Storage(format!(
                "grant row {} must reference exactly one of permission or role",
                row.id
            ))
        })?;
        let resource = ResourceKey::new(row.resource_kind, row.resource_id).map_err(|error| {
            AppError::Storage(format!("grant row {} is invalid: {error}", row.id))
        })?;

        Ok(Self {
            id: GrantId::new(row.id),
            kind,
            resource,
            team_id: row.team_id.as_deref().and_then(TeamId::from_optional),
            action: row.action,
            status: row.status,
            remarks: row.remarks,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn map_name_conflict(error: sqlx::Error, label: &str, name: &str, operation: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::DuplicateName(format!("{label} '{name}' already exists"));
    }

    AppError::Storage(format!("failed to {operation} {label}: {error}"))
}

#[async_trait]
impl AclRepository for PostgresAclRepository {
    async fn create_permission(&self, details: CatalogDetails) -> AppResult<Permission> {
        self.create_catalog_entry(catalog::CatalogTable::Permissions, &details)
            .await?
            .into_permission()
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        self.find_catalog_entry(catalog::CatalogTable::Permissions, permission_id.as_i64())
            .await?
            .map(CatalogRow::into_permission)
            .transpose()
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        self.find_catalog_entry_by_name(catalog::CatalogTable::Permissions, name)
            .await?
            .map(CatalogRow::into_permission)
            .transpose()
    }

    async fn list_permissions(
        &self,
        permission_ids: Option<&[PermissionId]>,
    ) -> AppResult<Vec<Permission>> {
        let ids = permission_ids.map(|ids| ids.iter().map(PermissionId::as_i64).collect());
        self.list_catalog_entries(catalog::CatalogTable::Permissions, ids)
            .await?
            .into_iter()
            .map(CatalogRow::into_permission)
            .collect()
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<Permission> {
        self.update_catalog_entry(
            catalog::CatalogTable::Permissions,
            permission.id().as_i64(),
            permission.details(),
        )
        .await?
        .into_permission()
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.delete_catalog_entry(catalog::CatalogTable::Permissions, permission_id.as_i64())
            .await
    }

    async fn create_role(&self, details: CatalogDetails) -> AppResult<Role> {
        self.create_catalog_entry(catalog::CatalogTable::Roles, &details)
            .await?
            .into_role()
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_catalog_entry(catalog::CatalogTable::Roles, role_id.as_i64())
            .await?
            .map(CatalogRow::into_role)
            .transpose()
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.find_catalog_entry_by_name(catalog::CatalogTable::Roles, name)
            .await?
            .map(CatalogRow::into_role)
            .transpose()
    }

    async fn list_roles(&self, role_ids: Option<&[RoleId]>) -> AppResult<Vec<Role>> {
        let ids = role_ids.map(|ids| ids.iter().map(RoleId::as_i64).collect());
        self.list_catalog_entries(catalog::CatalogTable::Roles, ids)
            .await?
            .into_iter()
            .map(CatalogRow::into_role)
            .collect()
    }

    async fn update_role(&self, role: Role) -> AppResult<Role> {
        self.update_catalog_entry(catalog::CatalogTable::Roles, role.id().as_i64(), role.details())
            .await?
            .into_role()
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.delete_catalog_entry(catalog::CatalogTable::Roles, role_id.as_i64())
            .await
    }

    async fn insert_grant(&self, grant: NewGrant) -> AppResult<AssignedPermission> {
        self.insert_grant_impl(grant).await
    }

    async fn find_grants(&self, filter: &GrantFilter) -> AppResult<Vec<AssignedPermission>> {
        self.find_grants_impl(filter).await
    }

    async fn grant_exists(&self, filter: &GrantFilter) -> AppResult<bool> {
        self.grant_exists_impl(filter).await
    }

    async fn role_derived_grant_exists(&self, query: &RoleDerivedGrantQuery) -> AppResult<bool> {
        self.role_derived_grant_exists_impl(query).await
    }

    async fn update_grant_status(&self, filter: &GrantFilter, status: &str) -> AppResult<u64> {
        self.update_grant_status_impl(filter, status).await
    }

    async fn soft_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64> {
        self.soft_delete_grants_impl(filter).await
    }

    async fn hard_delete_grants(&self, filter: &GrantFilter) -> AppResult<u64> {
        self.hard_delete_grants_impl(filter).await
    }
}
