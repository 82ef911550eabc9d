use super::permission_models::{initial_status, ModuleSetting, NOTACCESSFUNC};
use super::permission_repository::PermissionRepository;
use crate::{error::Result, user::UserRepository};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PermissionService {
    db: PgPool,
    repo: PermissionRepository,
    users: UserRepository,
}

impl PermissionService {
    pub fn new(db: PgPool, repo: PermissionRepository, users: UserRepository) -> Self {
        Self { db, repo, users }
    }

    pub fn repository(&self) -> &PermissionRepository {
        &self.repo
    }

    pub async fn setting_org_modules(&self, organization_id: i32, modules: &[ModuleSetting]) -> Result<()> {
        let mut tx = self.db.begin().await?;
        self.repo
            .upsert_org_modules_with_tx(&mut tx, organization_id, modules)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Grants every enabled function to every user of the organization.
    pub async fn setting_org_functions(&self, organization_id: i32) -> Result<()> {
        let users = self.users.roles_by_org(organization_id).await?;

        let mut tx = self.db.begin().await?;
        let function_ids = self
            .repo
            .enabled_function_ids_with_tx(&mut tx, organization_id)
            .await?;
        for (user_id, role_id) in users {
            self.repo
                .grant_with_tx(&mut tx, organization_id, user_id, &function_ids, initial_status(role_id))
                .await?;
        }
        tx.commit().await?;

        tracing::info!(organization_id, "Organization functions granted");
        Ok(())
    }

    pub async fn setting_user_functions(&self, organization_id: i32, user_id: i32) -> Result<()> {
        let mut tx = self.db.begin().await?;
        self.grant_enabled_with_tx(&mut tx, organization_id, user_id, NOTACCESSFUNC)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn grant_enabled_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        user_id: i32,
        status: i32,
    ) -> Result<()> {
        let function_ids = self
            .repo
            .enabled_function_ids_with_tx(tx, organization_id)
            .await?;
        self.repo
            .grant_with_tx(tx, organization_id, user_id, &function_ids, status)
            .await
    }
}
