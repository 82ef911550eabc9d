use super::contract_models::{ContractItem, ContractType};
use crate::common::Pagination;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetContractCurrentListRequest {
    pub user_name: Option<String>,
    pub contract_type_id: Option<i32>,
    pub currency_unit: Option<i32>,
    pub branch_id: Option<i32>,
    /// `YYYY-MM-DD`
    pub contract_start_date: Option<String>,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1, max = 100))]
    pub row_per_page: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractListResponse {
    pub pagination: Pagination,
    pub contract_list: Vec<ContractItem>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetContractByUserRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1, max = 100))]
    pub row_per_page: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContractRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub contract_type_id: i32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub insurance_salary: f64,
    #[validate(length(min = 1))]
    pub total_salary: String,
    /// `YYYY-MM-DD`
    #[validate(length(min = 1))]
    pub contract_start_date: String,
    pub contract_end_date: Option<String>,
    #[validate(range(min = 1))]
    pub currency_unit: i32,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    /// Base64 document.
    #[validate(length(min = 1))]
    pub contract_content: String,
    pub labor_contract_number: Option<String>,
    pub contract_creation_date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedContract {
    pub contract_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ContractIdRequest {
    #[validate(range(min = 1))]
    pub id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContractTypeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Base64 pdf, doc or docx template.
    pub file_template_content: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetContractTypeListRequest {
    pub name: Option<String>,
    /// 0 returns every type.
    #[serde(default)]
    pub current_page: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub row_per_page: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractTypeListResponse {
    pub pagination: Pagination,
    pub contract_types: Vec<ContractType>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetContractTypeRequest {
    #[validate(range(min = 1))]
    pub contract_type_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractTypeDetail {
    pub contract_type: ContractType,
    pub file_template_content: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditContractTypeRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Replaces the current template when present.
    pub file_template_content: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EditedContractType {
    pub contract_type_id: i32,
    pub organization_id: i32,
    pub contact_type_name: String,
    pub file_template_name: String,
}

impl From<ContractType> for EditedContractType {
    fn from(value: ContractType) -> Self {
        Self {
            contract_type_id: value.id,
            organization_id: value.organization_id,
            contact_type_name: value.name,
            file_template_name: value.file_template_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveContractTypeRequest {
    #[validate(length(min = 1))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PreviewContractRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub file_content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewContractResponse {
    pub url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeletePreviewContractRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
}
