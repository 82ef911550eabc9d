use super::contract_handlers as handlers;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/get-contract-current-list", post(handlers::get_contract_current_list))
        .route("/get-contract-by-user", post(handlers::get_contract_by_user))
        .route("/create-contract", post(handlers::create_contract))
        .route("/remove-contract", post(handlers::remove_contract))
        .route("/create-contract-type", post(handlers::create_contract_type))
        .route("/get-contract-type-list", post(handlers::get_contract_type_list))
        .route("/get-contract-type", post(handlers::get_contract_type))
        .route("/edit-contract-type", post(handlers::edit_contract_type))
        .route("/remove-contract-type", post(handlers::remove_contract_type))
        .route("/preview-contract", post(handlers::preview_contract))
        .route("/delete-preview-contract", post(handlers::delete_preview_contract))
}
