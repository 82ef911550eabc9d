use super::auth_handlers as handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/google", get(handlers::google_login))
        .route("/google/callback", get(handlers::google_callback))
}
