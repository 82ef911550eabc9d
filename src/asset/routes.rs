use super::asset_handlers as handlers;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/get-asset-list", post(handlers::get_asset_list))
        .route("/create-asset-type", post(handlers::create_asset_type))
        .route("/get-asset-type-list", post(handlers::get_asset_type_list))
        .route("/remove-asset-type", post(handlers::remove_asset_type))
        .route("/create-asset", post(handlers::create_asset))
        .route("/get-asset", post(handlers::get_asset))
        .route("/update-asset", post(handlers::update_asset))
        .route("/remove-asset", post(handlers::remove_asset))
        .route("/create-request-asset", post(handlers::create_request_asset))
        .route("/get-user-request-asset", post(handlers::get_user_request_asset))
        .route("/edit-user-request-asset", post(handlers::edit_user_request_asset))
        .route("/get-asset-log", post(handlers::get_asset_log))
        .route("/create-asset-log", post(handlers::create_asset_log))
}
