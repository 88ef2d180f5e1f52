use super::*;

impl PostgresRoleStore {
    pub(super) async fn list_active_role_assignments_impl(
        &self,
        subject: &str,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT
                roles.role_key,
                roles.role_name,
                assignments.company_id,
                assignments.location_id,
                assignments.expires_at,
                roles.country_code,
                assignments.is_active,
                roles.is_active AS role_is_active
            FROM role_assignments AS assignments
            INNER JOIN roles
                ON roles.id = assignments.role_id
            WHERE assignments.subject = $1
                AND assignments.is_active
                AND roles.is_active
                AND (assignments.expires_at IS NULL OR assignments.expires_at > now())
            ORDER BY roles.tier, assignments.created_at
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(RoleAssignmentRecord {
                    role_key: stored_role_key(row.role_key)?,
                    role_name: row.role_name,
                    company_id: row.company_id.map(stored_organization_id).transpose()?,
                    location_id: row.location_id,
                    expires_at: row.expires_at,
                    country_code: row.country_code,
                    is_active: row.is_active,
                    role_is_active: row.role_is_active,
                })
            })
            .collect()
    }

    pub(super) async fn list_active_memberships_impl(
        &self,
        subject: &str,
    ) -> AppResult<Vec<MembershipRecord>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT organization_id, role, is_active
            FROM organization_memberships
            WHERE subject = $1
                AND is_active
            ORDER BY created_at, organization_id
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list memberships: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(MembershipRecord {
                    organization_id: stored_organization_id(row.organization_id)?,
                    role: row.role,
                    is_active: row.is_active,
                })
            })
            .collect()
    }

    pub(super) async fn list_all_organization_ids_impl(&self) -> AppResult<Vec<OrganizationId>> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id
            FROM organizations
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list organizations: {error}")))?;

        ids.into_iter().map(stored_organization_id).collect()
    }
}
