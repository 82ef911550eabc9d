use super::user_handlers as handlers;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/get-profile", post(handlers::get_profile))
        .route("/get-user-names", post(handlers::get_user_names))
        .route("/register-fcm-token", post(handlers::register_fcm_token))
        .route("/remove-fcm-token", post(handlers::remove_fcm_token))
}
