use super::organization_handlers as handlers;
use crate::state::AppState;
use axum::{routing::post, Router};

/// Sign-up endpoints reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/find-organization", post(handlers::find_organization))
        .route("/get-organizations", post(handlers::get_organizations))
        .route("/check-organization", post(handlers::check_organization))
        .route("/request-registration", post(handlers::request_registration))
        .route("/register-organization", post(handlers::register_organization))
        .route("/register-invite-link", post(handlers::register_invite_link))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/invite-user", post(handlers::invite_user))
        .route("/edit-organization-email", post(handlers::edit_organization_email))
        .route("/get-organization-setting", post(handlers::get_organization_setting))
        .route("/edit-expiration-reset-day-off", post(handlers::edit_expiration_reset_day_off))
}
