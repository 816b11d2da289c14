use rolegate_application::{GrantKindFilter, TeamScope};
use sqlx::{Postgres, QueryBuilder};

use super::*;

pub(super) const GRANT_COLUMNS: &str = "id, permission_id, role_id, team_id, resource_kind, \
     resource_id, action, status, remarks, created_at, updated_at, deleted_at";

/// Appends `AND`-joined predicates for `filter` on rows aliased as `alias`.
///
/// Callers start from `WHERE TRUE`. Soft-deleted rows are excluded unless the
/// filter opts into them.
pub(super) fn push_grant_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    alias: &str,
    filter: &GrantFilter,
) {
    if !filter.include_deleted {
        builder.push(format!(" AND {alias}.deleted_at IS NULL"));
    }

    if let Some(resource) = &filter.resource {
        builder.push(format!(" AND {alias}.resource_kind = "));
        builder.push_bind(resource.kind().to_owned());
        builder.push(format!(" AND {alias}.resource_id = "));
        builder.push_bind(resource.id().to_owned());
    }

    match filter.kind {
        GrantKindFilter::Any => {}
        GrantKindFilter::Direct => {
            builder.push(format!(" AND {alias}.permission_id IS NOT NULL"));
        }
        GrantKindFilter::RoleLink => {
            builder.push(format!(" AND {alias}.role_id IS NOT NULL"));
        }
    }

    if let Some(permission_ids) = &filter.permission_ids {
        builder.push(format!(" AND {alias}.permission_id = ANY("));
        builder.push_bind(
            permission_ids
                .iter()
                .map(PermissionId::as_i64)
                .collect::<Vec<_>>(),
        );
        builder.push(")");
    }

    if let Some(role_ids) = &filter.role_ids {
        builder.push(format!(" AND {alias}.role_id = ANY("));
        builder.push_bind(role_ids.iter().map(RoleId::as_i64).collect::<Vec<_>>());
        builder.push(")");
    }

    if let TeamScope::Team(team_id) = &filter.team {
        builder.push(format!(" AND {alias}.team_id = "));
        builder.push_bind(team_id.as_str().to_owned());
    }

    if let Some(actions) = &filter.actions {
        builder.push(format!(" AND {alias}.action = ANY("));
        builder.push_bind(actions.clone());
        builder.push(")");
    }

    if let Some(status) = &filter.excluded_status {
        builder.push(format!(" AND {alias}.status <> "));
        builder.push_bind(status.clone());
    }
}
