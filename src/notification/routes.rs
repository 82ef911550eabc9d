use super::notification_handlers as handlers;
use crate::{reminder::reminder_handlers, state::AppState};
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/edit-notification-status-read", post(handlers::edit_notification_status_read))
        .route("/edit-notification-status", post(handlers::edit_notification_status))
        .route("/get-notifications", post(handlers::get_notifications))
        .route("/get-total-notifications-unread", post(handlers::get_total_notifications_unread))
        .route("/remove-notification", post(handlers::remove_notification))
        .route("/send-noti-request", post(handlers::send_noti_request))
        .route("/event-remind", post(reminder_handlers::event_remind))
}
