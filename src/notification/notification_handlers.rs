use super::{
    notification_dto::{
        EditNotificationStatusRequest, EditStatusReadRequest, GetNotificationsRequest, GetTotalUnreadRequest,
        NotificationIdRequest, NotificationItem, NotificationsResponse, TotalUnreadResponse, DEFAULT_CURRENT_PAGE,
        DEFAULT_ROW_PER_PAGE,
    },
    notification_models::NotificationRecord,
};
use crate::{
    common::{dates, labels::notification_status_labels, JsonResponse, Pagination},
    error::{AppError, Result},
    middleware::{AuthUser, CurrentUser, ValidJson},
    state::AppState,
    storage::folders,
};
use axum::{extract::State, Json};
use chrono::{DateTime, FixedOffset, Utc};

/// Largest accepted drift between the client clock and ours.
const CLIENT_TIME_TOLERANCE_SECS: i64 = 3;

fn ensure_receiver(user: &CurrentUser, receiver: i32, message: &str) -> Result<()> {
    if user.user_id != receiver {
        return Err(AppError::MethodNotAllowed(message.to_string()));
    }
    Ok(())
}

/// Loads a notification of the actor's organization and checks the actor received it.
async fn owned_notification(state: &AppState, user: &CurrentUser, id: i32, message: &str) -> Result<()> {
    let receiver = state
        .notification_repository
        .find_receiver(user.organization_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification does not exist".to_string()))?;

    ensure_receiver(user, receiver, message)
}

fn client_time_in_sync(client_time: &DateTime<FixedOffset>, now: DateTime<Utc>) -> bool {
    (now - client_time.with_timezone(&Utc)).num_milliseconds().abs() <= CLIENT_TIME_TOLERANCE_SECS * 1000
}

/// Date of the oldest notification on the page, in the business timezone.
fn smallest_day(records: &[NotificationRecord]) -> String {
    records
        .iter()
        .map(|r| r.created_at)
        .min()
        .map(|oldest| dates::database_date(oldest.with_timezone(&dates::business_offset()).date_naive()))
        .unwrap_or_default()
}

#[utoipa::path(
    post,
    path = "/notification/edit-notification-status-read",
    request_body = EditStatusReadRequest,
    responses(
        (status = 200, description = "Recent unread notifications marked as read"),
        (status = 405, description = "Receiver is not the current user")
    ),
    tag = "notification",
    security(("bearer_auth" = []))
)]
pub async fn edit_notification_status_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditStatusReadRequest>,
) -> Result<Json<JsonResponse>> {
    ensure_receiver(&user, payload.receiver, "You not have permission to edit notification status")?;

    state
        .notification_repository
        .mark_all_read(user.organization_id, payload.receiver)
        .await?;

    Ok(Json(JsonResponse::message("Edit notification status to read successful")))
}

#[utoipa::path(
    post,
    path = "/notification/edit-notification-status",
    request_body = EditNotificationStatusRequest,
    responses(
        (status = 200, description = "Notification status changed"),
        (status = 404, description = "Notification does not exist"),
        (status = 405, description = "Notification belongs to another user")
    ),
    tag = "notification",
    security(("bearer_auth" = []))
)]
pub async fn edit_notification_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditNotificationStatusRequest>,
) -> Result<Json<JsonResponse>> {
    owned_notification(&state, &user, payload.id, "You not have permission to edit notification status").await?;

    state
        .notification_repository
        .update_status(payload.id, payload.status)
        .await?;

    Ok(Json(JsonResponse::message("Edit notification status successful")))
}

#[utoipa::path(
    post,
    path = "/notification/get-notifications",
    request_body = GetNotificationsRequest,
    responses(
        (status = 200, description = "Page of the current user's notifications", body = NotificationsResponse),
        (status = 405, description = "Receiver is not the current user")
    ),
    tag = "notification",
    security(("bearer_auth" = []))
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetNotificationsRequest>,
) -> Result<Json<JsonResponse<NotificationsResponse>>> {
    ensure_receiver(&user, payload.receiver, "You not have permission to get notifications")?;

    let current_page = payload.current_page.unwrap_or(DEFAULT_CURRENT_PAGE);
    let row_per_page = payload.row_per_page.unwrap_or(DEFAULT_ROW_PER_PAGE);

    let (records, total) = state
        .notification_repository
        .list_for_receiver(user.organization_id, payload.receiver, current_page, row_per_page)
        .await?;
    let language = state
        .organization_service
        .repository()
        .language(user.organization_id)
        .await?;

    let mut notifications = Vec::with_capacity(records.len());
    for record in &records {
        let avatar_sender = match record.avatar_sender.as_deref().filter(|a| !a.is_empty()) {
            Some(avatar) => state
                .storage
                .download(folders::AVATARS, avatar)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(avatar, "Could not load sender avatar: {}", e);
                    String::new()
                }),
            None => String::new(),
        };

        notifications.push(NotificationItem {
            id: record.id,
            sender: record.sender.clone(),
            content: record.content.clone(),
            status: record.status,
            redirect_url: record.redirect_url.clone(),
            created_at: record
                .created_at
                .with_timezone(&dates::business_offset())
                .format(dates::FORMAT_DATE_NO_SEC)
                .to_string(),
            avatar_sender,
        });
    }

    Ok(Json(JsonResponse::success(
        "Get notifications successful",
        NotificationsResponse {
            pagination: Pagination::new(current_page, row_per_page, total),
            notification_status_map: notification_status_labels(language),
            smallest_day: smallest_day(&records),
            notifications,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/notification/get-total-notifications-unread",
    request_body = GetTotalUnreadRequest,
    responses(
        (status = 200, description = "Number of recent unread notifications", body = TotalUnreadResponse),
        (status = 405, description = "Receiver is not the current user"),
        (status = 422, description = "Client clock is out of sync")
    ),
    tag = "notification",
    security(("bearer_auth" = []))
)]
pub async fn get_total_notifications_unread(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetTotalUnreadRequest>,
) -> Result<Json<JsonResponse<TotalUnreadResponse>>> {
    ensure_receiver(&user, payload.receiver, "You not have permission to get notifications")?;

    let in_sync = DateTime::parse_from_rfc3339(payload.client_time.trim())
        .map(|client_time| client_time_in_sync(&client_time, Utc::now()))
        .unwrap_or(false);
    if !in_sync {
        return Err(AppError::Unprocessable("Server could not precess the request".to_string()));
    }

    let total = state
        .notification_repository
        .count_unread(user.organization_id, payload.receiver)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get total notifications unread successful",
        TotalUnreadResponse { total },
    )))
}

#[utoipa::path(
    post,
    path = "/notification/remove-notification",
    request_body = NotificationIdRequest,
    responses(
        (status = 200, description = "Notification removed"),
        (status = 404, description = "Notification does not exist"),
        (status = 405, description = "Notification belongs to another user")
    ),
    tag = "notification",
    security(("bearer_auth" = []))
)]
pub async fn remove_notification(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<NotificationIdRequest>,
) -> Result<Json<JsonResponse>> {
    owned_notification(&state, &user, payload.id, "You not have permission to remove notification").await?;

    state.notification_repository.soft_delete(payload.id).await?;

    Ok(Json(JsonResponse::message("Remove notification successful")))
}

#[utoipa::path(
    post,
    path = "/notification/send-noti-request",
    request_body = NotificationIdRequest,
    responses(
        (status = 200, description = "Notification request delivered"),
        (status = 400, description = "Request is not dispatchable"),
        (status = 404, description = "Notification request does not exist"),
        (status = 409, description = "Request is being processed by another call"),
        (status = 500, description = "Delivery failed, request marked FAILED")
    ),
    tag = "notification",
    security(("bearer_auth" = []))
)]
pub async fn send_noti_request(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    ValidJson(payload): ValidJson<NotificationIdRequest>,
) -> Result<Json<JsonResponse>> {
    state.dispatcher.dispatch(payload.id).await?;

    Ok(Json(JsonResponse::message("Send notification request successful")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i32, created_at: DateTime<Utc>) -> NotificationRecord {
        NotificationRecord {
            id,
            sender: "Linh Tran".into(),
            content: "has just created a leave request".into(),
            status: 1,
            redirect_url: "/hrm/leave".into(),
            created_at,
            avatar_sender: None,
        }
    }

    #[test]
    fn test_client_time_tolerance() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap();
        let close = DateTime::parse_from_rfc3339("2024-05-10T10:00:02+07:00").unwrap();
        let far = DateTime::parse_from_rfc3339("2024-05-10T10:00:05+07:00").unwrap();

        assert!(client_time_in_sync(&close, now));
        assert!(!client_time_in_sync(&far, now));
    }

    #[test]
    fn test_smallest_day_uses_business_timezone() {
        let records = vec![
            record(1, Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap()),
            // 2024-05-08 23:30 UTC is already the 9th in UTC+7
            record(2, Utc.with_ymd_and_hms(2024, 5, 8, 23, 30, 0).unwrap()),
        ];
        assert_eq!(smallest_day(&records), "2024-05-09");
        assert_eq!(smallest_day(&[]), "");
    }

    #[test]
    fn test_receiver_must_be_actor() {
        let user = CurrentUser {
            user_id: 3,
            organization_id: 1,
            role_id: 3,
            email: "member@example.com".into(),
        };
        assert!(ensure_receiver(&user, 3, "denied").is_ok());
        assert!(matches!(
            ensure_receiver(&user, 4, "denied"),
            Err(AppError::MethodNotAllowed(m)) if m == "denied"
        ));
    }
}
