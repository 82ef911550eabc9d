use super::leave_handlers as handlers;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-leave-request", post(handlers::create_leave_request))
        .route("/get-leave-requests", post(handlers::get_leave_requests))
        .route("/get-leave-history", post(handlers::get_leave_history))
        .route("/get-leave-request", post(handlers::get_leave_request))
        .route("/update-calendar-event", post(handlers::update_calendar_event))
        .route("/remove-leave", post(handlers::remove_leave))
        .route("/get-leave-day-status", post(handlers::get_leave_day_status))
        .route("/create-leave-bonus", post(handlers::create_leave_bonus))
        .route("/create-leave-bonuses", post(handlers::create_leave_bonuses))
        .route("/get-leave-bonuses", post(handlers::get_leave_bonuses))
        .route("/get-leave-bonus", post(handlers::get_leave_bonus))
        .route("/edit-leave-bonus", post(handlers::edit_leave_bonus))
        .route("/remove-leave-bonus", post(handlers::remove_leave_bonus))
        .route("/get-valid-leave-bonuses", post(handlers::get_valid_leave_bonuses))
        .route("/clear-expire-leave", post(handlers::clear_expire_leave))
}
