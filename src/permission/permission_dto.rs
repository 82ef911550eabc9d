use super::permission_models::ModuleSetting;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SettingOrgModuleRequest {
    #[validate(range(min = 1))]
    pub organization_id: i32,
    #[validate(length(min = 1))]
    pub modules: Vec<ModuleSetting>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SettingOrgFunctionsRequest {
    #[validate(range(min = 1))]
    pub organization_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SettingUserFunctionsRequest {
    #[validate(range(min = 1))]
    pub organization_id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetUserPermissionsRequest {
    #[serde(default)]
    pub name: String,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1))]
    pub row_per_page: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetPermissionsRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditUserPermissionRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub function_id: i32,
    #[validate(range(min = 1, max = 2))]
    pub status: i32,
}
