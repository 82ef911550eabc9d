use super::contract_dto::{
    ContractIdRequest, ContractListResponse, ContractTypeDetail, ContractTypeListResponse, CreateContractRequest,
    CreateContractTypeRequest, CreatedContract, DeletePreviewContractRequest, EditContractTypeRequest,
    EditedContractType, GetContractByUserRequest, GetContractCurrentListRequest, GetContractTypeListRequest,
    GetContractTypeRequest, PreviewContractRequest, PreviewContractResponse, RemoveContractTypeRequest,
};
use super::contract_models::{ContractType, NewContract};
use super::contract_repository::ContractFilter;
use super::contract_service::CreateContract;
use crate::{
    common::{dates, JsonResponse, Pagination},
    error::{AppError, Result},
    middleware::{AuthUser, ValidJson},
    state::AppState,
};
use axum::{extract::State, Json};
use chrono::NaiveDate;

fn invalid_field(field: &str) -> AppError {
    AppError::BadRequest(format!("Invalid value for field {}", field))
}

fn required_date(value: &str, field: &str) -> Result<NaiveDate> {
    dates::parse_date(value).ok_or_else(|| invalid_field(field))
}

fn optional_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    dates::parse_optional_date(value).map_err(|_| invalid_field(field))
}

impl TryFrom<&CreateContractRequest> for NewContract {
    type Error = AppError;

    fn try_from(payload: &CreateContractRequest) -> Result<Self> {
        Ok(NewContract {
            contract_start_date: required_date(&payload.contract_start_date, "contract_start_date")?,
            contract_end_date: optional_date(payload.contract_end_date.as_deref(), "contract_end_date")?,
            contract_creation_date: optional_date(
                payload.contract_creation_date.as_deref(),
                "contract_creation_date",
            )?,
            user_id: payload.user_id,
            contract_type_id: payload.contract_type_id,
            insurance_salary: payload.insurance_salary,
            total_salary: payload.total_salary.trim().to_string(),
            currency_unit: payload.currency_unit,
            file_name: payload.file_name.clone(),
            labor_contract_number: payload
                .labor_contract_number
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }
}

#[utoipa::path(
    post,
    path = "/contract/get-contract-current-list",
    request_body = GetContractCurrentListRequest,
    responses((status = 200, description = "Newest contract of each active user", body = ContractListResponse)),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn get_contract_current_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetContractCurrentListRequest>,
) -> Result<Json<JsonResponse<ContractListResponse>>> {
    let filter = ContractFilter {
        user_name: payload.user_name,
        contract_type_id: payload.contract_type_id,
        currency_unit: payload.currency_unit,
        branch_id: payload.branch_id,
        contract_start_date: optional_date(payload.contract_start_date.as_deref(), "contract_start_date")?,
    };

    let (contract_list, total) = state
        .contract_service
        .current_list(user.organization_id, &filter, payload.current_page, payload.row_per_page)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get contract current list successfully.",
        ContractListResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            contract_list,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/contract/get-contract-by-user",
    request_body = GetContractByUserRequest,
    responses((status = 200, description = "Contract history of a user", body = ContractListResponse)),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn get_contract_by_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetContractByUserRequest>,
) -> Result<Json<JsonResponse<ContractListResponse>>> {
    let (contract_list, total) = state
        .contract_service
        .by_user(user.organization_id, payload.user_id, payload.current_page, payload.row_per_page)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get contract by user successfully.",
        ContractListResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            contract_list,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/contract/create-contract",
    request_body = CreateContractRequest,
    responses(
        (status = 200, description = "Contract stored", body = CreatedContract),
        (status = 400, description = "Invalid value for field contract_creation_date")
    ),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn create_contract(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateContractRequest>,
) -> Result<Json<JsonResponse<CreatedContract>>> {
    let contract = NewContract::try_from(&payload)?;
    let contract_id = state
        .contract_service
        .create_contract(
            user.organization_id,
            CreateContract {
                contract,
                contract_content: &payload.contract_content,
            },
        )
        .await?;

    Ok(Json(JsonResponse::success(
        "Create contract successfully.",
        CreatedContract { contract_id },
    )))
}

#[utoipa::path(
    post,
    path = "/contract/remove-contract",
    request_body = ContractIdRequest,
    responses((status = 200, description = "Contract removed")),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn remove_contract(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<ContractIdRequest>,
) -> Result<Json<JsonResponse>> {
    let removed = state
        .contract_service
        .repository()
        .soft_delete(user.organization_id, payload.id)
        .await?;
    if removed == 0 {
        return Err(AppError::NotFound("Contract does not exist".to_string()));
    }

    Ok(Json(JsonResponse::message("Remove contract successfully.")))
}

#[utoipa::path(
    post,
    path = "/contract/create-contract-type",
    request_body = CreateContractTypeRequest,
    responses(
        (status = 200, description = "Contract type created", body = ContractType),
        (status = 400, description = "Invalid Contract Type File Template"),
        (status = 500, description = "Duplicate contract type value violates")
    ),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn create_contract_type(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateContractTypeRequest>,
) -> Result<Json<JsonResponse<ContractType>>> {
    let created = state
        .contract_service
        .create_contract_type(
            user.organization_id,
            payload.name.trim(),
            payload.file_template_content.as_deref(),
        )
        .await?;

    Ok(Json(JsonResponse::success("Create new contract type successful", created)))
}

#[utoipa::path(
    post,
    path = "/contract/get-contract-type-list",
    request_body = GetContractTypeListRequest,
    responses(
        (status = 200, description = "Contract types, paged unless current_page is 0", body = ContractTypeListResponse),
        (status = 400, description = "The current_page must be >= 0")
    ),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn get_contract_type_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetContractTypeListRequest>,
) -> Result<Json<JsonResponse<ContractTypeListResponse>>> {
    if payload.current_page < 0 {
        return Err(AppError::BadRequest("The current_page must be >= 0".to_string()));
    }

    let (contract_types, total) = state
        .contract_service
        .repository()
        .list_types(
            user.organization_id,
            payload.name.as_deref(),
            payload.current_page,
            payload.row_per_page,
        )
        .await?;

    Ok(Json(JsonResponse::success(
        "Get contract type list successful",
        ContractTypeListResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            contract_types,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/contract/get-contract-type",
    request_body = GetContractTypeRequest,
    responses(
        (status = 200, description = "Contract type with its template", body = ContractTypeDetail),
        (status = 400, description = "Contract type is not found")
    ),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn get_contract_type(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetContractTypeRequest>,
) -> Result<Json<JsonResponse<ContractTypeDetail>>> {
    let (contract_type, file_template_content) = state
        .contract_service
        .contract_type(user.organization_id, payload.contract_type_id)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get contract type successful",
        ContractTypeDetail {
            contract_type,
            file_template_content,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/contract/edit-contract-type",
    request_body = EditContractTypeRequest,
    responses(
        (status = 200, description = "Contract type updated", body = EditedContractType),
        (status = 400, description = "Contract type is not found or the template is invalid")
    ),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn edit_contract_type(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditContractTypeRequest>,
) -> Result<Json<JsonResponse<EditedContractType>>> {
    let updated = state
        .contract_service
        .edit_contract_type(
            user.organization_id,
            payload.id,
            payload.name.trim(),
            payload.file_template_content.as_deref(),
        )
        .await?;

    Ok(Json(JsonResponse::success(
        "Contract Type Updated Successful",
        EditedContractType::from(updated),
    )))
}

#[utoipa::path(
    post,
    path = "/contract/remove-contract-type",
    request_body = RemoveContractTypeRequest,
    responses((status = 200, description = "Contract types removed")),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn remove_contract_type(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<RemoveContractTypeRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .contract_service
        .remove_contract_types(user.organization_id, &payload.ids)
        .await?;

    Ok(Json(JsonResponse::message("Remove contract type successful")))
}

#[utoipa::path(
    post,
    path = "/contract/preview-contract",
    request_body = PreviewContractRequest,
    responses((status = 200, description = "Public URL of the temporary file", body = PreviewContractResponse)),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn preview_contract(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<PreviewContractRequest>,
) -> Result<Json<JsonResponse<PreviewContractResponse>>> {
    let url = state
        .contract_service
        .preview(user.organization_id, payload.file_name.trim(), &payload.file_content)
        .await?;

    Ok(Json(JsonResponse::success(
        "Create temporary file successfully.",
        PreviewContractResponse { url },
    )))
}

#[utoipa::path(
    post,
    path = "/contract/delete-preview-contract",
    request_body = DeletePreviewContractRequest,
    responses((status = 200, description = "Temporary file removed")),
    tag = "contract",
    security(("bearer_auth" = []))
)]
pub async fn delete_preview_contract(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<DeletePreviewContractRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .contract_service
        .delete_preview(user.organization_id, payload.file_name.trim())
        .await?;

    Ok(Json(JsonResponse::message("Delete temporary file successfully.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateContractRequest {
        CreateContractRequest {
            user_id: 5,
            contract_type_id: 2,
            insurance_salary: 5_000_000.0,
            total_salary: " 12000000 ".into(),
            contract_start_date: "2024-01-01".into(),
            contract_end_date: Some("2025-12-31".into()),
            currency_unit: 1,
            file_name: "contract.pdf".into(),
            contract_content: "JVBERi0=".into(),
            labor_contract_number: Some("  ".into()),
            contract_creation_date: None,
        }
    }

    #[test]
    fn test_contract_payload_conversion() {
        let contract = NewContract::try_from(&payload()).unwrap();
        assert_eq!(contract.total_salary, "12000000");
        assert_eq!(contract.contract_end_date, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(contract.labor_contract_number, None);
        assert_eq!(contract.contract_creation_date, None);
    }

    #[test]
    fn test_bad_creation_date_names_the_field() {
        let mut bad = payload();
        bad.contract_creation_date = Some("31-12-2023".into());

        let err = NewContract::try_from(&bad).err().unwrap();
        assert!(matches!(err, AppError::BadRequest(m) if m == "Invalid value for field contract_creation_date"));
    }

    #[test]
    fn test_edited_contract_type_keeps_client_field_names() {
        let now = chrono::Utc::now();
        let edited = EditedContractType::from(ContractType {
            id: 3,
            organization_id: 1,
            name: "Probation".into(),
            file_template_name: "Probation_1700000000.pdf".into(),
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(edited).unwrap();
        assert_eq!(json["contact_type_name"], "Probation");
        assert_eq!(json["contract_type_id"], 3);
    }
}
