use super::permission_handlers as handlers;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/setting-org-module", post(handlers::setting_org_module))
        .route("/setting-org-functions", post(handlers::setting_org_functions))
        .route("/get-modules", post(handlers::get_modules))
        .route("/setting-user-functions", post(handlers::setting_user_functions))
}

pub fn user_permission_routes() -> Router<AppState> {
    Router::new()
        .route("/get-user-permissions", post(handlers::get_user_permissions))
        .route("/get-permissions", post(handlers::get_permissions))
        .route("/edit-user-permission", post(handlers::edit_user_permission))
}
