use rolegate_domain::ROLE_RESOURCE_KIND;
use sqlx::{Postgres, QueryBuilder};
use tracing::debug;

use super::filters::{GRANT_COLUMNS, push_grant_filter};
use super::*;

const GRANT_ALIAS: &str = "grant_row";

impl PostgresAclRepository {
    pub(super) async fn insert_grant_impl(&self, grant: NewGrant) -> AppResult<AssignedPermission> {
        let statement = format!(
            r#"
            INSERT INTO acl_assigned_permissions (
                permission_id,
                role_id,
                team_id,
                resource_kind,
                resource_id,
                action,
                status,
                remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {GRANT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, GrantRow>(statement.as_str())
            .bind(grant.kind.permission_id().map(|id| id.as_i64()))
            .bind(grant.kind.role_id().map(|id| id.as_i64()))
            .bind(grant.team_id.as_ref().map(TeamId::as_str))
            .bind(grant.resource.kind())
            .bind(grant.resource.id())
            .bind(grant.action.as_str())
            .bind(grant.status.as_str())
            .bind(grant.remarks.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| map_grant_insert_error(error, &grant))?;

        AssignedPermission::try_from(row)
    }

    pub(super) async fn find_grants_impl(
        &self,
        filter: &GrantFilter,
    ) -> AppResult<Vec<AssignedPermission>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {GRANT_COLUMNS} FROM acl_assigned_permissions AS {GRANT_ALIAS} WHERE TRUE"
        ));
        push_grant_filter(&mut builder, GRANT_ALIAS, filter);
        builder.push(format!(" ORDER BY {GRANT_ALIAS}.id"));

        builder
            .build_query_as::<GrantRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to find grants: {error}")))?
            .into_iter()
            .map(AssignedPermission::try_from)
            .collect()
    }

    pub(super) async fn grant_exists_impl(&self, filter: &GrantFilter) -> AppResult<bool> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT EXISTS (SELECT 1 FROM acl_assigned_permissions AS {GRANT_ALIAS} WHERE TRUE"
        ));
        push_grant_filter(&mut builder, GRANT_ALIAS, filter);
        builder.push(")");

        builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to check grant: {error}")))
    }

    pub(super) async fn role_derived_grant_exists_impl(
        &self,
        query: &RoleDerivedGrantQuery,
    ) -> AppResult<bool> {
        let role_grants = GrantFilter::default()
            .with_permission_ids(vec![query.permission_id])
            .with_actions(query.actions.clone())
            .excluding_status(query.excluded_status.clone());

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT EXISTS (SELECT 1 FROM acl_assigned_permissions AS link \
             JOIN acl_assigned_permissions AS role_grant \
             ON role_grant.resource_kind = ",
        );
        builder.push_bind(ROLE_RESOURCE_KIND);
        builder.push(" AND role_grant.resource_id = link.role_id::TEXT WHERE TRUE");
        push_grant_filter(&mut builder, "link", &query.role_link_filter());
        push_grant_filter(&mut builder, "role_grant", &role_grants);
        builder.push(")");

        let allowed = builder
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to check role-derived grant: {error}"))
            })?;

        debug!(resource = %query.resource, allowed, "role-derived grant query executed");
        Ok(allowed)
    }

    pub(super) async fn update_grant_status_impl(
        &self,
        filter: &GrantFilter,
        status: &str,
    ) -> AppResult<u64> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "UPDATE acl_assigned_permissions AS {GRANT_ALIAS} SET status = "
        ));
        builder.push_bind(status.to_owned());
        builder.push(", updated_at = now() WHERE TRUE");
        push_grant_filter(&mut builder, GRANT_ALIAS, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to update grant status: {error}")))?;

        Ok(result.rows_affected())
    }

    pub(super) async fn soft_delete_grants_impl(&self, filter: &GrantFilter) -> AppResult<u64> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "UPDATE acl_assigned_permissions AS {GRANT_ALIAS} \
             SET deleted_at = now(), updated_at = now() WHERE TRUE"
        ));
        push_grant_filter(&mut builder, GRANT_ALIAS, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to soft-delete grants: {error}")))?;

        debug!(deleted = result.rows_affected(), "grants soft-deleted");
        Ok(result.rows_affected())
    }

    pub(super) async fn hard_delete_grants_impl(&self, filter: &GrantFilter) -> AppResult<u64> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "DELETE FROM acl_assigned_permissions AS {GRANT_ALIAS} WHERE TRUE"
        ));
        push_grant_filter(&mut builder, GRANT_ALIAS, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to delete grants: {error}")))?;

        debug!(deleted = result.rows_affected(), "grants deleted");
        Ok(result.rows_affected())
    }
}

fn map_grant_insert_error(error: sqlx::Error, grant: &NewGrant) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
        && let Some(permission_id) = grant.kind.permission_id()
    {
        return AppError::NotFound(format!("permission {permission_id} was not found"));
    }

    AppError::Storage(format!(
        "failed to insert grant for {}: {error}",
        grant.resource
    ))
}
