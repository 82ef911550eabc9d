use super::{
    dispatch::NotiRequestStore,
    notification_models::{
        EmailNotiRequestRecord, NewEmailNotiRequest, NewNotifications, NotiRequest, NotiRequestRow,
        NotiRequestStatus, NotificationRecord, RequestNotification, NOTIFICATION_STATUS_READ,
        NOTIFICATION_STATUS_SEEN, NOTIFICATION_STATUS_UNREAD,
    },
};
use crate::{
    common::{fanout, page_offset},
    error::{AppError, Result},
};
use axum::async_trait;
use sqlx::PgPool;

/// Notifications older than this are no longer counted as unread.
const UNREAD_WINDOW_DAYS: i32 = 31;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts one row per receiver after dropping the sender and duplicates.
    /// Returns the receivers that were actually notified.
    pub async fn insert_notifications_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        notifications: &NewNotifications<'_>,
    ) -> Result<Vec<i32>> {
        let receivers = fanout::recipients(notifications.sender, notifications.receivers);
        if receivers.is_empty() {
            return Ok(receivers);
        }

        sqlx::query(
            "INSERT INTO notifications
                (organization_id, sender, receiver, title, content, redirect_url, status, noti_request_id)
             SELECT $1, $2, receiver, $3, $4, $5, $6, $7
             FROM UNNEST($8::int[]) AS receiver",
        )
        .bind(notifications.organization_id)
        .bind(notifications.sender)
        .bind(notifications.title)
        .bind(notifications.content)
        .bind(notifications.redirect_url)
        .bind(NOTIFICATION_STATUS_UNREAD)
        .bind(notifications.noti_request_id)
        .bind(&receivers)
        .execute(&mut **tx)
        .await?;

        Ok(receivers)
    }

    pub async fn create_noti_request_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO noti_requests (status) VALUES ($1) RETURNING id",
        )
        .bind(NotiRequestStatus::Initial.as_str())
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn create_email_noti_request_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        request: &NewEmailNotiRequest<'_>,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO email_noti_requests
                (noti_request_id, organization_id, sender, to_user_ids, subject, content, url, template)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(request.noti_request_id)
        .bind(request.organization_id)
        .bind(request.sender)
        .bind(request.to_user_ids)
        .bind(request.subject)
        .bind(request.content)
        .bind(request.url)
        .bind(request.template.key())
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn mark_all_read(&self, organization_id: i32, receiver: i32) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications
             SET status = $1, updated_at = NOW()
             WHERE organization_id = $2 AND receiver = $3 AND status = $4
               AND created_at > NOW() - make_interval(days => $5)
               AND deleted_at IS NULL",
        )
        .bind(NOTIFICATION_STATUS_READ)
        .bind(organization_id)
        .bind(receiver)
        .bind(NOTIFICATION_STATUS_UNREAD)
        .bind(UNREAD_WINDOW_DAYS)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_receiver(&self, organization_id: i32, id: i32) -> Result<Option<i32>> {
        let receiver = sqlx::query_scalar::<_, i32>(
            "SELECT receiver FROM notifications
             WHERE id = $1 AND organization_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receiver)
    }

    /// `SEEN` stamps `datetime_seen`; any other status clears it.
    pub async fn update_status(&self, id: i32, status: i32) -> Result<()> {
        sqlx::query(
            "UPDATE notifications
             SET status = $1,
                 datetime_seen = CASE WHEN $1 = $2 THEN NOW() ELSE NULL END,
                 updated_at = NOW()
             WHERE id = $3",
        )
        .bind(status)
        .bind(NOTIFICATION_STATUS_SEEN)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_receiver(
        &self,
        organization_id: i32,
        receiver: i32,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<NotificationRecord>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications
             WHERE organization_id = $1 AND receiver = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(receiver)
        .fetch_one(&self.pool)
        .await?;

        let records = sqlx::query_as::<_, NotificationRecord>(
            "SELECT ntf.id, up.first_name || ' ' || up.last_name AS sender,
                    ntf.content, ntf.status, ntf.redirect_url, ntf.created_at,
                    up.avatar AS avatar_sender
             FROM notifications ntf
             JOIN user_profiles up ON up.user_id = ntf.sender
             WHERE ntf.organization_id = $1 AND ntf.receiver = $2 AND ntf.deleted_at IS NULL
             ORDER BY ntf.created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(organization_id)
        .bind(receiver)
        .bind(row_per_page)
        .bind(page_offset(current_page, row_per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok((records, total))
    }

    pub async fn count_unread(&self, organization_id: i32, receiver: i32) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications
             WHERE organization_id = $1 AND receiver = $2 AND status = $3
               AND created_at > NOW() - make_interval(days => $4)
               AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(receiver)
        .bind(NOTIFICATION_STATUS_UNREAD)
        .bind(UNREAD_WINDOW_DAYS)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<()> {
        sqlx::query("UPDATE notifications SET deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl NotiRequestStore for NotificationRepository {
    async fn find_request(&self, id: i32) -> Result<Option<NotiRequest>> {
        let row = sqlx::query_as::<_, NotiRequestRow>(
            "SELECT id, status FROM noti_requests WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            NotiRequestStatus::parse(&row.status)
                .map(|status| NotiRequest { id: row.id, status })
                .ok_or_else(|| {
                    AppError::Internal(format!("noti request {} has unknown status {}", row.id, row.status))
                })
        })
        .transpose()
    }

    async fn swap_status(&self, id: i32, from: NotiRequestStatus, to: NotiRequestStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE noti_requests SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
        )
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() < 1 {
            return Err(AppError::Conflict(
                "Notification request is being processed".to_string(),
            ));
        }

        Ok(())
    }

    async fn notifications_of_request(&self, id: i32) -> Result<Vec<RequestNotification>> {
        let notifications = sqlx::query_as::<_, RequestNotification>(
            "SELECT ntf.id, ntf.sender, up.first_name || ' ' || up.last_name AS sender_name,
                    ntf.receiver, ntf.title, ntf.content, ntf.redirect_url
             FROM notifications ntf
             JOIN user_profiles up ON up.user_id = ntf.sender
             WHERE ntf.noti_request_id = $1
             ORDER BY ntf.created_at DESC, ntf.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn email_requests_of_request(&self, id: i32) -> Result<Vec<EmailNotiRequestRecord>> {
        let requests = sqlx::query_as::<_, EmailNotiRequestRecord>(
            "SELECT enr.id, enr.sender, enr.to_user_ids, enr.subject, enr.content, enr.url, enr.template,
                    org.email, org.email_password, org.tag AS org_tag
             FROM email_noti_requests enr
             JOIN organizations org ON org.id = enr.organization_id
             WHERE enr.noti_request_id = $1 AND enr.deleted_at IS NULL
             ORDER BY enr.created_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
