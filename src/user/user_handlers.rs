use super::{user_dto::FcmTokenRequest, user_models::UserProfile};
use crate::{
    common::JsonResponse,
    error::{AppError, Result},
    middleware::{AuthUser, ValidJson},
    state::AppState,
};
use axum::{extract::State, Json};
use std::collections::BTreeMap;

/// Profile of the logged-in user
#[utoipa::path(
    post,
    path = "/api/user/get-profile",
    responses(
        (status = 200, description = "Current user's profile", body = UserProfile),
        (status = 404, description = "User profile does not exist")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JsonResponse<UserProfile>>> {
    let profile = state
        .user_repository
        .find_profile(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile does not exist".to_string()))?;

    Ok(Json(JsonResponse::success("Get profile successful", profile)))
}

/// Full names of the organization's users keyed by id
#[utoipa::path(
    post,
    path = "/api/user/get-user-names",
    responses((status = 200, description = "Map of user id to full name")),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub async fn get_user_names(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JsonResponse<BTreeMap<i32, String>>>> {
    let names = state
        .user_repository
        .names_by_org(user.organization_id)
        .await?
        .into_iter()
        .map(|n| (n.user_id, n.full_name))
        .collect();

    Ok(Json(JsonResponse::success("Get user names successful", names)))
}

#[utoipa::path(
    post,
    path = "/api/user/register-fcm-token",
    request_body = FcmTokenRequest,
    responses((status = 200, description = "Push token stored for the current user")),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub async fn register_fcm_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<FcmTokenRequest>,
) -> Result<Json<JsonResponse>> {
    state.fcm_repository.upsert(user.user_id, payload.token.trim()).await?;

    Ok(Json(JsonResponse::message("Register fcm token successful")))
}

#[utoipa::path(
    post,
    path = "/api/user/remove-fcm-token",
    request_body = FcmTokenRequest,
    responses(
        (status = 200, description = "Push token removed"),
        (status = 404, description = "Fcm token does not exist")
    ),
    tag = "user",
    security(("bearer_auth" = []))
)]
pub async fn remove_fcm_token(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<FcmTokenRequest>,
) -> Result<Json<JsonResponse>> {
    let removed = state
        .fcm_repository
        .delete_for_user(user.user_id, payload.token.trim())
        .await?;

    if removed == 0 {
        return Err(AppError::NotFound("Fcm token does not exist".to_string()));
    }

    Ok(Json(JsonResponse::message("Remove fcm token successful")))
}
