use super::permission_models::{Module, ModuleSetting, PermissionRecord, UserPermissionSummary};
use crate::{common::page_offset, error::Result};
use sqlx::{types::Json, PgPool};

const ENABLED_FUNCTIONS: &str = "SELECT f.id
     FROM organization_modules orgm,
          JSONB_ARRAY_ELEMENTS(orgm.modules) AS orgms
     JOIN modules m ON (orgms->>'module_id')::int = m.id
     JOIN functions f ON f.module_id = m.id
     WHERE (orgms->>'status')::boolean
       AND orgm.organization_id = $1
       AND orgm.deleted_at IS NULL
       AND f.deleted_at IS NULL
     ORDER BY f.id";

#[derive(Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_org_modules_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        modules: &[ModuleSetting],
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO organization_modules (organization_id, modules)
             VALUES ($1, $2)
             ON CONFLICT (organization_id) DO UPDATE SET
                modules = EXCLUDED.modules,
                deleted_at = NULL,
                updated_at = NOW()",
        )
        .bind(organization_id)
        .bind(Json(modules))
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn enabled_function_ids(&self, organization_id: i32) -> Result<Vec<i32>> {
        let ids = sqlx::query_scalar::<_, i32>(ENABLED_FUNCTIONS)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    pub async fn enabled_function_ids_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
    ) -> Result<Vec<i32>> {
        let ids = sqlx::query_scalar::<_, i32>(ENABLED_FUNCTIONS)
            .bind(organization_id)
            .fetch_all(&mut **tx)
            .await?;

        Ok(ids)
    }

    /// Writes `status` for every `(user, function)` pair, overwriting earlier grants.
    pub async fn grant_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        user_id: i32,
        function_ids: &[i32],
        status: i32,
    ) -> Result<()> {
        if function_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO user_permissions (organization_id, user_id, function_id, status)
             SELECT $1, $2, function_id, $3 FROM UNNEST($4::int[]) AS function_id
             ON CONFLICT (user_id, function_id) DO UPDATE SET
                status = EXCLUDED.status,
                deleted_at = NULL,
                updated_at = NOW()",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(status)
        .bind(function_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn modules(&self) -> Result<Vec<Module>> {
        let modules = sqlx::query_as::<_, Module>(
            "SELECT id, name FROM modules WHERE deleted_at IS NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    pub async fn user_permission_summaries(
        &self,
        organization_id: i32,
        name: &str,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<UserPermissionSummary>, i64)> {
        let pattern = format!("%{}%", name.trim().to_lowercase());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)
             FROM users usr
             JOIN user_profiles pro ON pro.user_id = usr.id
             WHERE usr.organization_id = $1 AND usr.deleted_at IS NULL
               AND LOWER(pro.first_name || ' ' || pro.last_name) LIKE $2",
        )
        .bind(organization_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let records = sqlx::query_as::<_, UserPermissionSummary>(
            "SELECT usr.id, usr.email, usr.role_id, pro.avatar, pro.first_name, pro.last_name,
                    COUNT(up.user_id) AS has_custom
             FROM users usr
             JOIN user_profiles pro ON pro.user_id = usr.id
             LEFT JOIN user_permissions up ON up.user_id = usr.id AND up.deleted_at IS NULL
             WHERE usr.organization_id = $1 AND usr.deleted_at IS NULL
               AND LOWER(pro.first_name || ' ' || pro.last_name) LIKE $2
             GROUP BY usr.id, pro.avatar, pro.first_name, pro.last_name
             ORDER BY usr.id ASC
             LIMIT $3 OFFSET $4",
        )
        .bind(organization_id)
        .bind(&pattern)
        .bind(row_per_page)
        .bind(page_offset(current_page, row_per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok((records, total))
    }

    pub async fn permissions_of_user(&self, organization_id: i32, user_id: i32) -> Result<Vec<PermissionRecord>> {
        let records = sqlx::query_as::<_, PermissionRecord>(
            "SELECT up.function_id, f.name, f.module_id, up.status
             FROM organization_modules orgm,
                  JSONB_ARRAY_ELEMENTS(orgm.modules) AS orgms
             JOIN modules m ON (orgms->>'module_id')::int = m.id
             JOIN functions f ON f.module_id = m.id
             JOIN user_permissions up ON up.function_id = f.id
             WHERE (orgms->>'status')::boolean
               AND up.user_id = $1
               AND orgm.organization_id = $2
               AND orgm.deleted_at IS NULL
               AND up.deleted_at IS NULL
             ORDER BY up.function_id",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn update_permission(
        &self,
        organization_id: i32,
        user_id: i32,
        function_id: i32,
        status: i32,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_permissions SET status = $1, updated_at = NOW()
             WHERE organization_id = $2 AND user_id = $3 AND function_id = $4",
        )
        .bind(status)
        .bind(organization_id)
        .bind(user_id)
        .bind(function_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
