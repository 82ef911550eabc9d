use super::dispatch::FcmTokenStore;
use crate::error::Result;
use axum::async_trait;
use sqlx::PgPool;

#[derive(Clone)]
pub struct FcmTokenRepository {
    pool: PgPool,
}

impl FcmTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A device token belongs to the user who registered it last.
    pub async fn upsert(&self, user_id: i32, token: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO fcm_tokens (user_id, token)
             VALUES ($1, $2)
             ON CONFLICT (token) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                deleted_at = NULL,
                updated_at = NOW()",
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_for_user(&self, user_id: i32, token: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM fcm_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl FcmTokenStore for FcmTokenRepository {
    async fn tokens_of_users(&self, user_ids: &[i32]) -> Result<Vec<String>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let tokens = sqlx::query_scalar::<_, String>(
            "SELECT token FROM fcm_tokens WHERE user_id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    async fn delete_token(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM fcm_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
