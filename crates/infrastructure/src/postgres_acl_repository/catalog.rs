use super::*;

/// Catalog table backing permissions or roles; both share one shape.
#[derive(Debug, Clone, Copy)]
pub(super) enum CatalogTable {
    Permissions,
    Roles,
}

impl CatalogTable {
    fn table(self) -> &'static str {
        match self {
            Self::Permissions => "acl_permissions",
            Self::Roles => "acl_roles",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Permissions => "permission",
            Self::Roles => "role",
        }
    }
}

impl PostgresAclRepository {
    pub(super) async fn create_catalog_entry(
        &self,
        table: CatalogTable,
        details: &CatalogDetails,
    ) -> AppResult<CatalogRow> {
        let statement = format!(
            r#"
            INSERT INTO {} (title, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, name, description
            "#,
            table.table()
        );

        sqlx::query_as::<_, CatalogRow>(statement.as_str())
            .bind(details.title())
            .bind(details.name())
            .bind(details.description())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| map_name_conflict(error, table.label(), details.name(), "create"))
    }

    pub(super) async fn find_catalog_entry(
        &self,
        table: CatalogTable,
        id: i64,
    ) -> AppResult<Option<CatalogRow>> {
        let statement = format!(
            r#"
            SELECT id, title, name, description
            FROM {}
            WHERE id = $1
            "#,
            table.table()
        );

        sqlx::query_as::<_, CatalogRow>(statement.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to find {} {id}: {error}", table.label()))
            })
    }

    pub(super) async fn find_catalog_entry_by_name(
        &self,
        table: CatalogTable,
        name: &str,
    ) -> AppResult<Option<CatalogRow>> {
        let statement = format!(
            r#"
            SELECT id, title, name, description
            FROM {}
            WHERE name = $1
            "#,
            table.table()
        );

        sqlx::query_as::<_, CatalogRow>(statement.as_str())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Storage(format!(
                    "failed to find {} '{name}': {error}",
                    table.label()
                ))
            })
    }

    pub(super) async fn list_catalog_entries(
        &self,
        table: CatalogTable,
        ids: Option<Vec<i64>>,
    ) -> AppResult<Vec<CatalogRow>> {
        let statement = format!(
            r#"
            SELECT id, title, name, description
            FROM {}
            WHERE $1::BIGINT[] IS NULL OR id = ANY($1)
            ORDER BY name
            "#,
            table.table()
        );

        sqlx::query_as::<_, CatalogRow>(statement.as_str())
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to list {}s: {error}", table.label()))
            })
    }

    pub(super) async fn update_catalog_entry(
        &self,
        table: CatalogTable,
        id: i64,
        details: &CatalogDetails,
    ) -> AppResult<CatalogRow> {
        let statement = format!(
            r#"
            UPDATE {}
            SET title = $2, name = $3, description = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, title, name, description
            "#,
            table.table()
        );

        sqlx::query_as::<_, CatalogRow>(statement.as_str())
            .bind(id)
            .bind(details.title())
            .bind(details.name())
            .bind(details.description())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| map_name_conflict(error, table.label(), details.name(), "update"))?
            .ok_or_else(|| AppError::NotFound(format!("{} {id} was not found", table.label())))
    }

    pub(super) async fn delete_catalog_entry(&self, table: CatalogTable, id: i64) -> AppResult<()> {
        let statement = format!("DELETE FROM {} WHERE id = $1", table.table());

        let result = sqlx::query(statement.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to delete {} {id}: {error}", table.label()))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} {id} was not found",
                table.label()
            )));
        }

        Ok(())
    }
}
