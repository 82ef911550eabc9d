use super::user_models::{NewUser, ReminderProfile, User, UserName, UserProfile, USER_STATUS_ACTIVE};
use crate::{common::roles::GENERAL_MANAGER_ROLE_ID, error::Result, notification::dispatch::UserDirectory};
use axum::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

/// Display name of the `user_profiles` row aliased `up`.
pub const FULL_NAME: &str = "up.first_name || ' ' || up.last_name";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user: &NewUser<'_>,
    ) -> Result<i32> {
        let user_id: i32 = sqlx::query_scalar(
            "INSERT INTO users (organization_id, email, password_hash, role_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(user.organization_id)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role_id)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO user_profiles (user_id, first_name, last_name, company_joined_date)
             VALUES ($1, $2, $3, CURRENT_DATE)",
        )
        .bind(user_id)
        .bind(user.first_name)
        .bind(user.last_name)
        .execute(&mut **tx)
        .await?;

        Ok(user_id)
    }

    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, organization_id, email, password_hash, google_id, role_id, created_at, updated_at
             FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email_in_org(&self, organization_id: i32, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, organization_id, email, password_hash, google_id, role_id, created_at, updated_at
             FROM users
             WHERE organization_id = $1 AND LOWER(email) = LOWER($2) AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_google_id(&self, organization_id: i32, google_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, organization_id, email, password_hash, google_id, role_id, created_at, updated_at
             FROM users
             WHERE organization_id = $1 AND google_id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn set_google_id(&self, user_id: i32, google_id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET google_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(google_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn find_profile(&self, user_id: i32) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT u.id AS user_id, u.organization_id, u.email, u.role_id,
                    up.first_name, up.last_name, up.avatar, up.birthday,
                    up.company_joined_date, up.contract_expiration_date, up.branch
             FROM users u
             JOIN user_profiles up ON up.user_id = u.id
             WHERE u.id = $1 AND u.deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn full_name(&self, user_id: i32) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>(&format!(
            "SELECT {} FROM user_profiles up WHERE up.user_id = $1",
            FULL_NAME
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name)
    }

    pub async fn names_by_org(&self, organization_id: i32) -> Result<Vec<UserName>> {
        let names = sqlx::query_as::<_, UserName>(&format!(
            "SELECT u.id AS user_id, {} AS full_name
             FROM users u
             JOIN user_profiles up ON up.user_id = u.id
             WHERE u.organization_id = $1 AND u.deleted_at IS NULL
             ORDER BY u.id",
            FULL_NAME
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// `(user_id, avatar file)` of users that have an avatar.
    pub async fn avatars_by_ids(&self, user_ids: &[i32]) -> Result<Vec<(i32, String)>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let avatars = sqlx::query_as::<_, (i32, String)>(
            "SELECT user_id, avatar FROM user_profiles
             WHERE user_id = ANY($1) AND avatar IS NOT NULL AND avatar <> ''",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(avatars)
    }

    pub async fn emails_by_ids(&self, user_ids: &[i32]) -> Result<Vec<String>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT email FROM users WHERE id = ANY($1) AND deleted_at IS NULL ORDER BY id",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(emails)
    }

    pub async fn general_manager_ids(&self, organization_id: i32) -> Result<Vec<i32>> {
        let ids = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM users
             WHERE organization_id = $1 AND role_id = $2 AND deleted_at IS NULL
             ORDER BY id",
        )
        .bind(organization_id)
        .bind(GENERAL_MANAGER_ROLE_ID)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// `(user_id, role_id)` of every user of an organization.
    pub async fn roles_by_org(&self, organization_id: i32) -> Result<Vec<(i32, i32)>> {
        let rows = sqlx::query_as::<_, (i32, i32)>(
            "SELECT id, role_id FROM users WHERE organization_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn reminder_profiles(&self, organization_id: i32) -> Result<Vec<ReminderProfile>> {
        let profiles = sqlx::query_as::<_, ReminderProfile>(&format!(
            "SELECT u.id AS user_id, {} AS full_name,
                    up.birthday, up.company_joined_date, up.contract_expiration_date
             FROM users u
             JOIN user_profiles up ON up.user_id = u.id
             WHERE u.organization_id = $1 AND up.status = $2
               AND u.deleted_at IS NULL AND up.deleted_at IS NULL
             ORDER BY u.id",
            FULL_NAME
        ))
        .bind(organization_id)
        .bind(USER_STATUS_ACTIVE)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    pub async fn update_contract_expiration_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: i32,
        expiration: Option<NaiveDate>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE user_profiles SET contract_expiration_date = $1, updated_at = NOW() WHERE user_id = $2",
        )
        .bind(expiration)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn emails_of_users(&self, user_ids: &[i32]) -> Result<Vec<String>> {
        self.emails_by_ids(user_ids).await
    }
}
