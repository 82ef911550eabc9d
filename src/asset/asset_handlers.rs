use super::asset_dto::{
    AssetIdRequest, AssetListResponse, AssetLogsResponse, AssetPayload, AssetRequestsResponse, CreateAssetLogRequest,
    CreateAssetTypeRequest, CreateRequestAssetRequest, EditUserRequestAssetRequest, GetAssetListRequest,
    GetAssetLogRequest, GetUserRequestAssetRequest,
};
use super::asset_models::{Asset, AssetListItem, AssetType, NewAsset};
use super::asset_repository::{AssetFilter, AssetRequestFilter};
use super::asset_service::NewAssetRequest;
use super::lending::LendingDecision;
use crate::{
    common::{dates, labels, JsonResponse, Pagination},
    error::{AppError, Result},
    middleware::{require_general_manager, AuthUser, ValidJson},
    state::AppState,
};
use axum::{extract::State, Json};
use chrono::NaiveDate;

const ASSET_NOT_FOUND: &str = "Asset does not exist";

fn optional_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    dates::parse_optional_date(value)
        .map_err(|_| AppError::InvalidParams(format!("{} must be formatted YYYY-MM-DD", field)))
}

impl TryFrom<AssetPayload> for NewAsset {
    type Error = AppError;

    fn try_from(payload: AssetPayload) -> Result<Self> {
        Ok(NewAsset {
            date_of_purchase: optional_date(payload.date_of_purchase.as_deref(), "date_of_purchase")?,
            license_end_date: optional_date(payload.license_end_date.as_deref(), "license_end_date")?,
            date_started_use: optional_date(payload.date_started_use.as_deref(), "date_started_use")?,
            asset_type_id: payload.asset_type_id,
            user_id: payload.user_id,
            branch_id: payload.branch_id,
            asset_code: payload.asset_code.trim().to_string(),
            asset_name: payload.asset_name.trim().to_string(),
            managed_by: payload.managed_by,
            status: payload.status,
            description: payload.description,
            purchase_price: payload.purchase_price,
            depreciation_period: payload.depreciation_period,
            status_req: payload.status_req,
        })
    }
}

#[utoipa::path(
    post,
    path = "/asset/get-asset-list",
    request_body = GetAssetListRequest,
    responses((status = 200, description = "Page of assets with lookup tables", body = AssetListResponse)),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn get_asset_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetAssetListRequest>,
) -> Result<Json<JsonResponse<AssetListResponse>>> {
    let filter = AssetFilter {
        asset_name: payload.asset_name,
        asset_code: payload.asset_code,
        asset_type_id: payload.asset_type_id,
        branch_id: payload.branch_id,
        user_name: payload.user_name,
        status: payload.status,
    };

    let (rows, total) = state
        .asset_service
        .repository()
        .list(user.organization_id, &filter, payload.current_page, payload.row_per_page)
        .await?;
    let today = dates::today();
    let asset_list = rows.into_iter().map(|row| AssetListItem::from_row(row, today)).collect();

    let users = state
        .user_repository
        .names_by_org(user.organization_id)
        .await?
        .into_iter()
        .map(|n| (n.user_id, n.full_name))
        .collect();

    let organizations = state.organization_service.repository();
    let branches = organizations
        .branches(user.organization_id)
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();
    let language = organizations.language(user.organization_id).await?;

    Ok(Json(JsonResponse::success(
        "Get asset list successfully.",
        AssetListResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            asset_list,
            users,
            branches,
            asset_status: labels::asset_status_labels(language),
            asset_request_status: labels::asset_request_status_labels(language),
        },
    )))
}

#[utoipa::path(
    post,
    path = "/asset/create-asset-type",
    request_body = CreateAssetTypeRequest,
    responses((status = 200, description = "Asset type created", body = AssetType)),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn create_asset_type(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateAssetTypeRequest>,
) -> Result<Json<JsonResponse<AssetType>>> {
    let asset_type = state
        .asset_service
        .repository()
        .create_type(user.organization_id, payload.name.trim())
        .await?;

    Ok(Json(JsonResponse::success("Create asset type successfully.", asset_type)))
}

#[utoipa::path(
    post,
    path = "/asset/get-asset-type-list",
    responses((status = 200, description = "Asset types of the organization", body = [AssetType])),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn get_asset_type_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JsonResponse<Vec<AssetType>>>> {
    let types = state.asset_service.repository().types(user.organization_id).await?;

    Ok(Json(JsonResponse::success("Get asset type list successfully.", types)))
}

#[utoipa::path(
    post,
    path = "/asset/remove-asset-type",
    request_body = AssetIdRequest,
    responses((status = 200, description = "Asset type removed")),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn remove_asset_type(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AssetIdRequest>,
) -> Result<Json<JsonResponse>> {
    let removed = state
        .asset_service
        .repository()
        .delete_type(user.organization_id, payload.id)
        .await?;
    if removed == 0 {
        return Err(AppError::NotFound("Asset type does not exist".to_string()));
    }

    Ok(Json(JsonResponse::message("Delete asset type successfully.")))
}

#[utoipa::path(
    post,
    path = "/asset/create-asset",
    request_body = AssetPayload,
    responses(
        (status = 200, description = "Asset created", body = Asset),
        (status = 500, description = "Duplicate asset code value violates")
    ),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn create_asset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AssetPayload>,
) -> Result<Json<JsonResponse<Asset>>> {
    let asset = NewAsset::try_from(payload)?;
    let created = state.asset_service.create_asset(user.organization_id, &asset).await?;

    Ok(Json(JsonResponse::success("Create asset successfully.", created)))
}

#[utoipa::path(
    post,
    path = "/asset/get-asset",
    request_body = AssetIdRequest,
    responses(
        (status = 200, description = "Asset detail", body = Asset),
        (status = 404, description = "Asset does not exist")
    ),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn get_asset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AssetIdRequest>,
) -> Result<Json<JsonResponse<Asset>>> {
    let asset = state
        .asset_service
        .repository()
        .find(user.organization_id, payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound(ASSET_NOT_FOUND.to_string()))?;

    Ok(Json(JsonResponse::success("Get asset successfully.", asset)))
}

#[utoipa::path(
    post,
    path = "/asset/update-asset",
    request_body = AssetPayload,
    responses((status = 200, description = "Asset updated")),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn update_asset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AssetPayload>,
) -> Result<Json<JsonResponse>> {
    let id = payload.id;
    if id <= 0 {
        return Err(AppError::InvalidParams("id is required".to_string()));
    }
    let asset = NewAsset::try_from(payload)?;

    let updated = state.asset_service.update_asset(user.organization_id, id, &asset).await?;
    if updated == 0 {
        return Err(AppError::NotFound(ASSET_NOT_FOUND.to_string()));
    }

    Ok(Json(JsonResponse::message("Update asset successfully.")))
}

#[utoipa::path(
    post,
    path = "/asset/remove-asset",
    request_body = AssetIdRequest,
    responses((status = 200, description = "Asset removed")),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn remove_asset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<AssetIdRequest>,
) -> Result<Json<JsonResponse>> {
    let removed = state
        .asset_service
        .repository()
        .soft_delete(user.organization_id, payload.id)
        .await?;
    if removed == 0 {
        return Err(AppError::NotFound(ASSET_NOT_FOUND.to_string()));
    }

    Ok(Json(JsonResponse::message("Delete asset successfully.")))
}

#[utoipa::path(
    post,
    path = "/asset/create-request-asset",
    request_body = CreateRequestAssetRequest,
    responses(
        (status = 200, description = "Request filed and managers notified"),
        (status = 405, description = "Requests can only be filed for yourself")
    ),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn create_request_asset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateRequestAssetRequest>,
) -> Result<Json<JsonResponse>> {
    let request = NewAssetRequest {
        asset_id: payload.asset_id,
        user_id: payload.user_id,
        status: payload.status,
        status_req: payload.status_req,
    };
    state.asset_service.create_request(&user, &request).await?;

    Ok(Json(JsonResponse::message("Create request asset successfully.")))
}

#[utoipa::path(
    post,
    path = "/asset/get-user-request-asset",
    request_body = GetUserRequestAssetRequest,
    responses((status = 200, description = "Page of borrow and return requests", body = AssetRequestsResponse)),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn get_user_request_asset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetUserRequestAssetRequest>,
) -> Result<Json<JsonResponse<AssetRequestsResponse>>> {
    let filter = AssetRequestFilter {
        user_name: payload.user_name,
        status: payload.status,
    };

    let (requests, total) = state
        .asset_service
        .repository()
        .list_requests(user.organization_id, &filter, payload.current_page, payload.row_per_page)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get request asset successfully.",
        AssetRequestsResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            requests,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/asset/edit-user-request-asset",
    request_body = EditUserRequestAssetRequest,
    responses((status = 200, description = "Request decided and the asset updated")),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn edit_user_request_asset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditUserRequestAssetRequest>,
) -> Result<Json<JsonResponse>> {
    require_general_manager(&user)?;

    let decision = LendingDecision {
        request_id: payload.id,
        asset_id: payload.asset_id,
        user_id: payload.user_id,
        status: payload.status,
    };
    state
        .asset_service
        .decide_request(user.organization_id, &decision)
        .await?;

    Ok(Json(JsonResponse::message("Update status request successfully.")))
}

#[utoipa::path(
    post,
    path = "/asset/get-asset-log",
    request_body = GetAssetLogRequest,
    responses((status = 200, description = "Usage history of an asset", body = AssetLogsResponse)),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn get_asset_log(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetAssetLogRequest>,
) -> Result<Json<JsonResponse<AssetLogsResponse>>> {
    let (asset_logs, total) = state
        .asset_service
        .repository()
        .logs(user.organization_id, payload.asset_id, payload.current_page, payload.row_per_page)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get asset log successfully.",
        AssetLogsResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            asset_logs,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/asset/create-asset-log",
    request_body = CreateAssetLogRequest,
    responses((status = 200, description = "Asset handed to a new holder")),
    tag = "asset",
    security(("bearer_auth" = []))
)]
pub async fn create_asset_log(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateAssetLogRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .asset_service
        .repository()
        .reassign(user.organization_id, payload.asset_id, payload.current_user_id, payload.new_user_id)
        .await?;

    Ok(Json(JsonResponse::message("Create new asset log successfully.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> AssetPayload {
        AssetPayload {
            id: 0,
            asset_type_id: 1,
            user_id: 0,
            branch_id: 2,
            asset_code: " LP-001 ".into(),
            asset_name: "Laptop".into(),
            managed_by: 1,
            status: 1,
            description: String::new(),
            purchase_price: 1200.0,
            depreciation_period: 3,
            date_of_purchase: Some("2023-05-01".into()),
            license_end_date: Some(String::new()),
            date_started_use: None,
            status_req: 0,
        }
    }

    #[test]
    fn test_payload_converts_dates_and_trims_code() {
        let asset = NewAsset::try_from(payload()).unwrap();
        assert_eq!(asset.asset_code, "LP-001");
        assert_eq!(asset.date_of_purchase, NaiveDate::from_ymd_opt(2023, 5, 1));
        assert_eq!(asset.license_end_date, None);
        assert_eq!(asset.date_started_use, None);
    }

    #[test]
    fn test_depreciation_period_is_capped() {
        use validator::Validate;

        let mut long = payload();
        long.depreciation_period = 400_000_000;
        assert!(long.validate().is_err());
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_payload_with_bad_date_is_invalid() {
        let mut bad = payload();
        bad.date_started_use = Some("05/01/2023".into());
        assert!(matches!(NewAsset::try_from(bad), Err(AppError::InvalidParams(m)) if m.contains("date_started_use")));
    }
}
