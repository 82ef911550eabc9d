use super::{
    calendar::{HourQuery, LeaveCalendar},
    leave_models::{
        consume_fifo, leave_request_url, ExpiredHours, LeaveDayStatus, LeaveHours, NewLeaveBonus,
        NewLeaveRequest, LEAVE_REQUEST_CONTENT, LEAVE_REQUEST_SUBJECT, SUBTRACT_LEAVE_BALANCE,
    },
    leave_repository::LeaveRepository,
};
use crate::{
    common::{dates, roles},
    error::{AppError, Result},
    mailer::MailTemplate,
    middleware::CurrentUser,
    notification::{
        notification_models::{NewEmailNotiRequest, NewNotifications},
        NotificationRepository,
    },
    user::UserRepository,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

pub const LEAVE_NOT_FOUND: &str = "Leave request does not exist";
const LEAVE_NOTIFICATION_TITLE: &str = "Leave request";

pub struct CreateLeave<'a> {
    pub leave_request_type_id: i32,
    pub datetime_leave_from: NaiveDateTime,
    pub datetime_leave_to: NaiveDateTime,
    pub subtract_day_off_type_id: i32,
    pub extra_time: f64,
    pub reason: &'a str,
    pub email_title: &'a str,
    pub email_content: &'a str,
    pub send_to: &'a [i32],
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedLeave {
    pub id: i32,
    pub hour: f64,
    pub noti_request_id: i32,
}

#[derive(Clone)]
pub struct LeaveService {
    db: PgPool,
    repo: LeaveRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    calendar: Arc<dyn LeaveCalendar>,
}

impl LeaveService {
    pub fn new(
        db: PgPool,
        repo: LeaveRepository,
        users: UserRepository,
        notifications: NotificationRepository,
        calendar: Arc<dyn LeaveCalendar>,
    ) -> Self {
        Self {
            db,
            repo,
            users,
            notifications,
            calendar,
        }
    }

    pub fn repository(&self) -> &LeaveRepository {
        &self.repo
    }

    /// Stores the request with its computed hours, takes those hours from the
    /// user's grants when the leave is paid from the balance, and queues the
    /// notifications, all in one transaction.
    pub async fn create_leave_request(&self, user: &CurrentUser, input: &CreateLeave<'_>) -> Result<CreatedLeave> {
        if input.datetime_leave_to < input.datetime_leave_from {
            return Err(AppError::BadRequest(
                "Datetime leave to must be greater than datetime leave from".to_string(),
            ));
        }

        let hour = self
            .calendar
            .leave_hours(
                user.organization_id,
                &HourQuery {
                    leave_request_type_id: input.leave_request_type_id,
                    datetime_leave_from: input.datetime_leave_from,
                    datetime_leave_to: input.datetime_leave_to,
                    extra_time: input.extra_time,
                },
            )
            .await?;

        let mut candidates = self.users.general_manager_ids(user.organization_id).await?;
        candidates.extend_from_slice(input.send_to);

        let mut tx = self.db.begin().await?;

        let id = self
            .repo
            .insert_request_with_tx(
                &mut tx,
                &NewLeaveRequest {
                    organization_id: user.organization_id,
                    user_id: user.user_id,
                    leave_request_type_id: input.leave_request_type_id,
                    datetime_leave_from: input.datetime_leave_from,
                    datetime_leave_to: input.datetime_leave_to,
                    subtract_day_off_type_id: input.subtract_day_off_type_id,
                    reason: input.reason,
                    email_title: input.email_title,
                    email_content: input.email_content,
                    hour,
                },
            )
            .await?;

        if input.subtract_day_off_type_id == SUBTRACT_LEAVE_BALANCE {
            let grants = self
                .repo
                .valid_grants_with_tx(&mut tx, user.organization_id, user.user_id, dates::today())
                .await?;
            let updates = consume_fifo(&grants, hour);
            self.repo
                .update_hour_remaining_with_tx(&mut tx, &updates, user.user_id)
                .await?;
        }

        let noti_request_id = self.notifications.create_noti_request_with_tx(&mut tx).await?;
        let url = leave_request_url(
            id,
            user.user_id,
            input.datetime_leave_from.date(),
            input.datetime_leave_to.date(),
        );
        let receivers = self
            .notifications
            .insert_notifications_with_tx(
                &mut tx,
                &NewNotifications {
                    organization_id: user.organization_id,
                    sender: user.user_id,
                    receivers: &candidates,
                    title: LEAVE_NOTIFICATION_TITLE,
                    content: LEAVE_REQUEST_CONTENT,
                    redirect_url: &url,
                    noti_request_id: Some(noti_request_id),
                },
            )
            .await?;

        let subject = if input.email_title.trim().is_empty() {
            LEAVE_REQUEST_SUBJECT
        } else {
            input.email_title
        };
        let content = if input.email_content.trim().is_empty() {
            input.reason
        } else {
            input.email_content
        };
        self.notifications
            .create_email_noti_request_with_tx(
                &mut tx,
                &NewEmailNotiRequest {
                    noti_request_id,
                    organization_id: user.organization_id,
                    sender: user.user_id,
                    to_user_ids: &receivers,
                    subject,
                    content,
                    url: &url,
                    template: MailTemplate::LeaveRequest,
                },
            )
            .await?;

        tx.commit().await?;

        Ok(CreatedLeave {
            id,
            hour,
            noti_request_id,
        })
    }

    /// Only the owner or a general manager may remove a leave request. Hours
    /// already taken from grants stay consumed.
    pub async fn remove_leave(&self, user: &CurrentUser, id: i32) -> Result<()> {
        let request = self
            .repo
            .find_request(user.organization_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(LEAVE_NOT_FOUND.to_string()))?;

        if request.user_id != user.user_id && !roles::is_general_manager(user.role_id) {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to remove leave".to_string(),
            ));
        }

        self.repo.soft_delete_request(id, user.user_id).await
    }

    pub async fn day_status(&self, organization_id: i32, user_id: i32, year: i32) -> Result<LeaveDayStatus> {
        let hours = LeaveHours {
            used: self.repo.hour_used(organization_id, user_id, year).await?,
            bonus: self.repo.hour_bonus(organization_id, user_id, year).await?,
            remaining: self.repo.hour_remaining(organization_id, user_id, year).await?,
            used_previous: self.repo.hour_used(organization_id, user_id, year - 1).await?,
            bonus_previous: self.repo.hour_bonus(organization_id, user_id, year - 1).await?,
        };

        Ok(hours.into())
    }

    pub async fn create_bonuses(&self, user: &CurrentUser, bonuses: &[NewLeaveBonus]) -> Result<Vec<i32>> {
        let mut tx = self.db.begin().await?;
        let mut ids = Vec::with_capacity(bonuses.len());
        for bonus in bonuses {
            ids.push(
                self.repo
                    .insert_bonus_with_tx(&mut tx, user.organization_id, bonus, user.user_id)
                    .await?,
            );
        }
        tx.commit().await?;

        Ok(ids)
    }

    /// Expires every grant whose date has passed and reports the hours lost per user.
    pub async fn clear_expired(&self, organization_id: i32) -> Result<Vec<ExpiredHours>> {
        let today = dates::today();
        let expired = self.repo.expired_hours(organization_id, today).await?;
        let cleared = self.repo.clear_expired(organization_id, today).await?;
        info!(organization_id, cleared, "Expired leave grants cleared");

        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::calendar::MockLeaveCalendar;
    use chrono::NaiveDate;

    fn service(calendar: MockLeaveCalendar) -> LeaveService {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        LeaveService::new(
            pool.clone(),
            LeaveRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            NotificationRepository::new(pool),
            Arc::new(calendar),
        )
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_leave_ending_before_start_is_rejected() {
        let mut calendar = MockLeaveCalendar::new();
        calendar.expect_leave_hours().never();
        let service = service(calendar);

        let user = CurrentUser {
            user_id: 4,
            organization_id: 1,
            role_id: 3,
            email: "member@example.com".into(),
        };
        let input = CreateLeave {
            leave_request_type_id: 1,
            datetime_leave_from: at(5, 8),
            datetime_leave_to: at(4, 17),
            subtract_day_off_type_id: SUBTRACT_LEAVE_BALANCE,
            extra_time: 0.0,
            reason: "trip",
            email_title: "",
            email_content: "",
            send_to: &[],
        };

        let err = service.create_leave_request(&user, &input).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::BadRequest(m) if m == "Datetime leave to must be greater than datetime leave from"
        ));
    }
}
