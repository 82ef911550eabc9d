use super::asset_models::{AssetListItem, AssetLogRecord, AssetRequestRecord};
use crate::common::{labels::LabelMap, Pagination};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetAssetListRequest {
    pub asset_name: Option<String>,
    pub asset_code: Option<String>,
    pub asset_type_id: Option<i32>,
    pub branch_id: Option<i32>,
    pub user_name: Option<String>,
    pub status: Option<i32>,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1))]
    pub row_per_page: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetListResponse {
    pub pagination: Pagination,
    pub asset_list: Vec<AssetListItem>,
    #[schema(value_type = Object)]
    pub users: BTreeMap<i32, String>,
    #[schema(value_type = Object)]
    pub branches: BTreeMap<i32, String>,
    #[schema(value_type = Object)]
    pub asset_status: LabelMap,
    #[schema(value_type = Object)]
    pub asset_request_status: LabelMap,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetTypeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssetIdRequest {
    #[validate(range(min = 1))]
    pub id: i32,
}

/// Body of both create-asset and update-asset; dates are `YYYY-MM-DD` or empty.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssetPayload {
    #[serde(default)]
    pub id: i32,
    #[validate(range(min = 1))]
    pub asset_type_id: i32,
    #[serde(default)]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub branch_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub asset_code: String,
    #[validate(length(min = 1, max = 255))]
    pub asset_name: String,
    #[validate(range(min = 1))]
    pub managed_by: i32,
    #[validate(range(min = 1, max = 4))]
    pub status: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub purchase_price: f64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub depreciation_period: i32,
    pub date_of_purchase: Option<String>,
    pub license_end_date: Option<String>,
    pub date_started_use: Option<String>,
    #[serde(default)]
    pub status_req: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequestAssetRequest {
    #[validate(range(min = 1))]
    pub asset_id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1, max = 4))]
    pub status: i32,
    #[validate(range(min = 1, max = 6))]
    pub status_req: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetUserRequestAssetRequest {
    pub user_name: Option<String>,
    pub status: Option<i32>,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1))]
    pub row_per_page: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetRequestsResponse {
    pub pagination: Pagination,
    pub requests: Vec<AssetRequestRecord>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditUserRequestAssetRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub asset_id: i32,
    #[validate(range(min = 1, max = 6))]
    pub status: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetAssetLogRequest {
    #[validate(range(min = 1))]
    pub asset_id: i32,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1))]
    pub row_per_page: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetLogsResponse {
    pub pagination: Pagination,
    pub asset_logs: Vec<AssetLogRecord>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetLogRequest {
    #[validate(range(min = 1))]
    pub asset_id: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub current_user_id: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub new_user_id: i32,
}
