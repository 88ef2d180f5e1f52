use super::*;

use custos_domain::policy_matrix;
use tracing::info;

impl PostgresRoleStore {
    pub(super) async fn list_active_permissions_impl(
        &self,
        resource: Resource,
        action: Option<Action>,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT
                roles.role_key,
                permissions.resource,
                permissions.action,
                permissions.is_active,
                permissions.field_restrictions
            FROM role_permissions AS permissions
            INNER JOIN roles
                ON roles.id = permissions.role_id
            WHERE permissions.resource = $1
                AND ($2::TEXT IS NULL OR permissions.action = $2)
                AND permissions.is_active
                AND roles.is_active
            ORDER BY roles.tier, roles.role_key, permissions.action
            "#,
        )
        .bind(resource.as_str())
        .bind(action.map(|value| value.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter()
            .map(|row| {
                let record = permission_record(row)?;
                Ok(PermissionGrant::from(&record))
            })
            .collect()
    }

    /// Seeds the default policy matrix when the permission table is empty.
    ///
    /// Returns the number of inserted records.
    pub async fn seed_default_permissions(&self) -> AppResult<u64> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM role_permissions")
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to count permissions: {error}"))
            })?;

        if existing > 0 {
            return Ok(0);
        }

        let mut inserted = 0_u64;
        for record in policy_matrix::default_permissions() {
            let result = sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, resource, action, is_active, field_restrictions)
                SELECT id, $2, $3, $4, $5
                FROM roles
                WHERE role_key = $1
                ON CONFLICT (role_id, resource, action) DO NOTHING
                "#,
            )
            .bind(record.role_key.as_str())
            .bind(record.resource.as_str())
            .bind(record.action.as_str())
            .bind(record.is_active)
            .bind(Json(encoded_field_restrictions(&record.field_restrictions)))
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to seed default permissions: {error}"))
            })?;

            if result.rows_affected() == 0 {
                return Err(AppError::Configuration(format!(
                    "default permission references missing role '{}'",
                    record.role_key
                )));
            }
            inserted += result.rows_affected();
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        info!(inserted, "seeded default permission matrix");
        Ok(inserted)
    }

    pub(super) async fn save_permission_impl(&self, record: PermissionRecord) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;
        let field_restrictions = Json(encoded_field_restrictions(&record.field_restrictions));

        let result = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, resource, action, is_active, field_restrictions)
            SELECT id, $2, $3, $4, $5
            FROM roles
            WHERE role_key = $1
            ON CONFLICT (role_id, resource, action) DO UPDATE
            SET
                is_active = EXCLUDED.is_active,
                field_restrictions = EXCLUDED.field_restrictions,
                updated_at = now()
            "#,
        )
        .bind(record.role_key.as_str())
        .bind(record.resource.as_str())
        .bind(record.action.as_str())
        .bind(record.is_active)
        .bind(&field_restrictions)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save permission: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                record.role_key
            )));
        }

        // Field restrictions cover the whole resource; keep sibling actions in step.
        sqlx::query(
            r#"
            UPDATE role_permissions AS permissions
            SET
                field_restrictions = $3,
                updated_at = now()
            FROM roles
            WHERE roles.id = permissions.role_id
                AND roles.role_key = $1
                AND permissions.resource = $2
                AND permissions.field_restrictions <> $3
            "#,
        )
        .bind(record.role_key.as_str())
        .bind(record.resource.as_str())
        .bind(&field_restrictions)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to share field restrictions: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}

fn permission_record(row: PermissionRow) -> AppResult<PermissionRecord> {
    Ok(PermissionRecord {
        role_key: stored_role_key(row.role_key)?,
        resource: stored::<Resource>(row.resource.as_str(), "resource")?,
        action: stored::<Action>(row.action.as_str(), "action")?,
        is_active: row.is_active,
        field_restrictions: stored_field_restrictions(row.field_restrictions.0)?,
    })
}
