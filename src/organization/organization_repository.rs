use super::organization_models::{
    Branch, Organization, OrganizationListItem, RegistrationCode, RegistrationRequest,
};
use crate::{common::labels::Language, error::Result, mailer::MailCredentials};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const ORGANIZATION_COLUMNS: &str = "id, name, tag, description, phone_number, email, email_password,
     setting_step, expiration_reset_day_off, language_id";

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_tag(&self, tag: &str) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations WHERE tag = $1 AND deleted_at IS NULL",
            ORGANIZATION_COLUMNS
        ))
        .bind(tag)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations WHERE id = $1 AND deleted_at IS NULL",
            ORGANIZATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    pub async fn list(&self) -> Result<Vec<OrganizationListItem>> {
        let orgs = sqlx::query_as::<_, OrganizationListItem>(
            "SELECT id, name, tag, description, phone_number
             FROM organizations WHERE deleted_at IS NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orgs)
    }

    pub async fn all(&self) -> Result<Vec<Organization>> {
        let orgs = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations WHERE deleted_at IS NULL ORDER BY id",
            ORGANIZATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orgs)
    }

    pub async fn create_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        name: &str,
        tag: &str,
    ) -> Result<Organization> {
        let org = sqlx::query_as::<_, Organization>(&format!(
            "INSERT INTO organizations (name, tag) VALUES ($1, $2) RETURNING {}",
            ORGANIZATION_COLUMNS
        ))
        .bind(name)
        .bind(tag)
        .fetch_one(&mut **tx)
        .await?;

        Ok(org)
    }

    pub async fn create_registration_request_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: Option<i32>,
        email: &str,
    ) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO registration_requests (organization_id, email) VALUES ($1, $2) RETURNING id",
        )
        .bind(organization_id)
        .bind(email)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn create_code_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        request_id: i32,
        email: &str,
        code: &str,
        expired_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO registration_codes (registration_request_id, email, code, expired_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(request_id)
        .bind(email)
        .bind(code)
        .bind(expired_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find_code(&self, code: &str) -> Result<Option<RegistrationCode>> {
        let code = sqlx::query_as::<_, RegistrationCode>(
            "SELECT id, registration_request_id, email, code, expired_at
             FROM registration_codes WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    pub async fn find_registration_request(&self, id: i32) -> Result<Option<RegistrationRequest>> {
        let request = sqlx::query_as::<_, RegistrationRequest>(
            "SELECT id, organization_id, email FROM registration_requests
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Used codes stay for auditing but can no longer register anyone.
    pub async fn expire_code_with_tx(&self, tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, id: i32) -> Result<()> {
        sqlx::query("UPDATE registration_codes SET expired_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn branches(&self, organization_id: i32) -> Result<Vec<Branch>> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT id, name FROM branches WHERE organization_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(branches)
    }

    pub async fn mail_credentials(&self, organization_id: i32) -> Result<Option<MailCredentials>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT email, email_password FROM organizations WHERE id = $1")
                .bind(organization_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(address, password)| MailCredentials::from_parts(&address, &password)))
    }

    pub async fn language(&self, organization_id: i32) -> Result<Language> {
        let id: Option<i32> = sqlx::query_scalar("SELECT language_id FROM organizations WHERE id = $1")
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(Language::from_id(id.unwrap_or_default()))
    }

    pub async fn update_email(
        &self,
        organization_id: i32,
        email: &str,
        email_password: &str,
        setting_step: i32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE organizations SET email = $1, email_password = $2, setting_step = $3, updated_at = NOW()
             WHERE id = $4",
        )
        .bind(email)
        .bind(email_password)
        .bind(setting_step)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_expiration_reset_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        months: i32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE organizations SET expiration_reset_day_off = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(months)
        .bind(organization_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
