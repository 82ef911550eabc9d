use super::permission_dto::{
    EditUserPermissionRequest, GetPermissionsRequest, GetUserPermissionsRequest, SettingOrgFunctionsRequest,
    SettingOrgModuleRequest, SettingUserFunctionsRequest,
};
use super::permission_models::{Module, PermissionRecord, UserPermissionSummary};
use crate::{
    common::{JsonResponse, Pagination},
    error::{AppError, Result},
    middleware::{require_general_manager, AuthUser, ValidJson},
    state::AppState,
};
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPermissionsResponse {
    pub pagination: Pagination,
    pub users: Vec<UserPermissionSummary>,
}

#[utoipa::path(
    post,
    path = "/admin/setting-org-module",
    request_body = SettingOrgModuleRequest,
    responses((status = 200, description = "Modules of the organization stored")),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn setting_org_module(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<SettingOrgModuleRequest>,
) -> Result<Json<JsonResponse>> {
    require_general_manager(&user)?;

    state
        .permission_service
        .setting_org_modules(payload.organization_id, &payload.modules)
        .await?;

    Ok(Json(JsonResponse::message("Init data organization module successfully.")))
}

#[utoipa::path(
    post,
    path = "/admin/setting-org-functions",
    request_body = SettingOrgFunctionsRequest,
    responses((status = 200, description = "Every user of the organization received the enabled functions")),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn setting_org_functions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<SettingOrgFunctionsRequest>,
) -> Result<Json<JsonResponse>> {
    require_general_manager(&user)?;

    state
        .permission_service
        .setting_org_functions(payload.organization_id)
        .await?;

    Ok(Json(JsonResponse::message("Setting organization functions successfully.")))
}

#[utoipa::path(
    post,
    path = "/admin/get-modules",
    responses((status = 200, description = "All modules", body = [Module])),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_modules(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JsonResponse<Vec<Module>>>> {
    require_general_manager(&user)?;

    let modules = state.permission_service.repository().modules().await?;

    Ok(Json(JsonResponse::success("Get module list successfully.", modules)))
}

#[utoipa::path(
    post,
    path = "/admin/setting-user-functions",
    request_body = SettingUserFunctionsRequest,
    responses((status = 200, description = "Enabled functions locked for the user")),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn setting_user_functions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<SettingUserFunctionsRequest>,
) -> Result<Json<JsonResponse>> {
    require_general_manager(&user)?;

    state
        .permission_service
        .setting_user_functions(payload.organization_id, payload.user_id)
        .await?;

    Ok(Json(JsonResponse::message("Setting functions for user successfully.")))
}

#[utoipa::path(
    post,
    path = "/user-permission/get-user-permissions",
    request_body = GetUserPermissionsRequest,
    responses((status = 200, description = "Users with their custom permission count", body = UserPermissionsResponse)),
    tag = "user-permission",
    security(("bearer_auth" = []))
)]
pub async fn get_user_permissions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetUserPermissionsRequest>,
) -> Result<Json<JsonResponse<UserPermissionsResponse>>> {
    let (users, total) = state
        .permission_service
        .repository()
        .user_permission_summaries(
            user.organization_id,
            &payload.name,
            payload.current_page,
            payload.row_per_page,
        )
        .await?;

    Ok(Json(JsonResponse::success(
        "Get user permissions successful",
        UserPermissionsResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            users,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/user-permission/get-permissions",
    request_body = GetPermissionsRequest,
    responses((status = 200, description = "Enabled functions of the user", body = [PermissionRecord])),
    tag = "user-permission",
    security(("bearer_auth" = []))
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetPermissionsRequest>,
) -> Result<Json<JsonResponse<Vec<PermissionRecord>>>> {
    let permissions = state
        .permission_service
        .repository()
        .permissions_of_user(user.organization_id, payload.user_id)
        .await?;

    Ok(Json(JsonResponse::success("Get permissions successful", permissions)))
}

#[utoipa::path(
    post,
    path = "/user-permission/edit-user-permission",
    request_body = EditUserPermissionRequest,
    responses(
        (status = 200, description = "Permission updated"),
        (status = 404, description = "Permission does not exist")
    ),
    tag = "user-permission",
    security(("bearer_auth" = []))
)]
pub async fn edit_user_permission(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditUserPermissionRequest>,
) -> Result<Json<JsonResponse>> {
    let updated = state
        .permission_service
        .repository()
        .update_permission(user.organization_id, payload.user_id, payload.function_id, payload.status)
        .await?;

    if updated == 0 {
        return Err(AppError::NotFound("Permission does not exist".to_string()));
    }

    Ok(Json(JsonResponse::message("Edit user permission successful")))
}
