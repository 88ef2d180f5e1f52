use super::*;

impl PostgresRoleStore {
    pub(super) async fn list_roles_impl(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role_key, role_name, country_code, is_system, is_active, tier
            FROM roles
            ORDER BY tier, role_key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    pub(super) async fn find_role_impl(&self, role_key: &RoleKey) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role_key, role_name, country_code, is_system, is_active, tier
            FROM roles
            WHERE role_key = $1
            "#,
        )
        .bind(role_key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        .map(Role::try_from)
        .transpose()
    }

    pub(super) async fn update_role_impl(
        &self,
        role_key: &RoleKey,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET
                role_name = $2,
                country_code = $3,
                is_active = $4,
                tier = $5,
                updated_at = now()
            WHERE role_key = $1
                AND NOT is_system
            RETURNING role_key, role_name, country_code, is_system, is_active, tier
            "#,
        )
        .bind(role_key.as_str())
        .bind(input.role_name.trim())
        .bind(input.country_code)
        .bind(input.is_active)
        .bind(input.tier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?
        .ok_or_else(|| {
            AppError::NotFound(format!("non-system role '{role_key}' does not exist"))
        })?;

        Role::try_from(row)
    }

    pub(super) async fn assign_role_impl(&self, input: AssignRoleInput) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_assignments (subject, role_id, company_id, location_id, expires_at)
            SELECT $1, id, $3, $4, $5
            FROM roles
            WHERE role_key = $2
            "#,
        )
        .bind(input.subject.as_str())
        .bind(input.role_key.as_str())
        .bind(input.company_id.as_ref().map(OrganizationId::as_str))
        .bind(input.location_id.as_deref())
        .bind(input.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| map_assignment_error(error, input.company_id.as_ref()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                input.role_key
            )));
        }

        Ok(())
    }

    pub(super) async fn revoke_role_impl(&self, input: RevokeRoleInput) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE role_assignments AS assignments
            SET is_active = false
            FROM roles
            WHERE roles.id = assignments.role_id
                AND roles.role_key = $2
                AND assignments.subject = $1
                AND assignments.is_active
                AND assignments.company_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(input.subject.as_str())
        .bind(input.role_key.as_str())
        .bind(input.company_id.as_ref().map(OrganizationId::as_str))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke role: {error}")))?;

        Ok(result.rows_affected())
    }
}

fn map_assignment_error(error: sqlx::Error, company_id: Option<&OrganizationId>) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::Validation(format!(
            "organization '{}' does not exist",
            company_id.map_or("", OrganizationId::as_str)
        ));
    }

    AppError::Internal(format!("failed to assign role: {error}"))
}
