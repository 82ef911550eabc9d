use crate::{
    auth::{auth_dto, auth_handlers},
    organization::{organization_dto, organization_handlers, organization_models},
    user::{user_dto, user_handlers, user_models},
    notification::{notification_dto, notification_handlers},
    reminder::{reminder_dto, reminder_handlers},
    asset::{asset_dto, asset_handlers, asset_models},
    contract::{contract_dto, contract_handlers, contract_models},
    leave::{leave_dto, leave_handlers, leave_models, leave_service},
    recruitment::{recruitment_dto, recruitment_handlers, recruitment_models},
    permission::{permission_dto, permission_handlers, permission_models},
    common,
    middleware::auth_middleware,
    state::AppState,
};
use axum::{middleware, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // auth
        auth_handlers::login,
        auth_handlers::google_login,
        auth_handlers::google_callback,
        // organization
        organization_handlers::find_organization,
        organization_handlers::get_organizations,
        organization_handlers::check_organization,
        organization_handlers::request_registration,
        organization_handlers::register_organization,
        organization_handlers::invite_user,
        organization_handlers::register_invite_link,
        organization_handlers::edit_organization_email,
        organization_handlers::get_organization_setting,
        organization_handlers::edit_expiration_reset_day_off,
        // user
        user_handlers::get_profile,
        user_handlers::get_user_names,
        user_handlers::register_fcm_token,
        user_handlers::remove_fcm_token,
        // notification
        notification_handlers::edit_notification_status_read,
        notification_handlers::edit_notification_status,
        notification_handlers::get_notifications,
        notification_handlers::get_total_notifications_unread,
        notification_handlers::remove_notification,
        notification_handlers::send_noti_request,
        // reminder
        reminder_handlers::event_remind,
        // asset
        asset_handlers::get_asset_list,
        asset_handlers::create_asset_type,
        asset_handlers::get_asset_type_list,
        asset_handlers::remove_asset_type,
        asset_handlers::create_asset,
        asset_handlers::get_asset,
        asset_handlers::update_asset,
        asset_handlers::remove_asset,
        asset_handlers::create_request_asset,
        asset_handlers::get_user_request_asset,
        asset_handlers::edit_user_request_asset,
        asset_handlers::get_asset_log,
        asset_handlers::create_asset_log,
        // contract
        contract_handlers::get_contract_current_list,
        contract_handlers::get_contract_by_user,
        contract_handlers::create_contract,
        contract_handlers::remove_contract,
        contract_handlers::create_contract_type,
        contract_handlers::get_contract_type_list,
        contract_handlers::get_contract_type,
        contract_handlers::edit_contract_type,
        contract_handlers::remove_contract_type,
        contract_handlers::preview_contract,
        contract_handlers::delete_preview_contract,
        // leave
        leave_handlers::create_leave_request,
        leave_handlers::get_leave_requests,
        leave_handlers::get_leave_history,
        leave_handlers::get_leave_request,
        leave_handlers::update_calendar_event,
        leave_handlers::remove_leave,
        leave_handlers::get_leave_day_status,
        leave_handlers::create_leave_bonus,
        leave_handlers::create_leave_bonuses,
        leave_handlers::get_leave_bonuses,
        leave_handlers::get_leave_bonus,
        leave_handlers::edit_leave_bonus,
        leave_handlers::remove_leave_bonus,
        leave_handlers::get_valid_leave_bonuses,
        leave_handlers::clear_expire_leave,
        // recruitment
        recruitment_handlers::create_job,
        recruitment_handlers::edit_job,
        recruitment_handlers::get_jobs,
        recruitment_handlers::get_job,
        recruitment_handlers::remove_job,
        recruitment_handlers::create_detail_job,
        recruitment_handlers::update_detail_job,
        recruitment_handlers::upload_detail_job_file,
        recruitment_handlers::get_detail_job_file,
        recruitment_handlers::remove_detail_job_file,
        recruitment_handlers::create_cv,
        recruitment_handlers::get_cvs,
        recruitment_handlers::get_cv,
        recruitment_handlers::update_cv,
        recruitment_handlers::remove_cv,
        recruitment_handlers::create_cv_comment,
        recruitment_handlers::edit_cv_comment,
        recruitment_handlers::get_cv_comments,
        recruitment_handlers::remove_cv_comment,
        recruitment_handlers::create_log_cv_status,
        recruitment_handlers::get_log_cv_status,
        recruitment_handlers::statistic_cv_by_status,
        // permission
        permission_handlers::setting_org_module,
        permission_handlers::setting_org_functions,
        permission_handlers::get_modules,
        permission_handlers::setting_user_functions,
        permission_handlers::get_user_permissions,
        permission_handlers::get_permissions,
        permission_handlers::edit_user_permission,
    ),
    components(
        schemas(
            common::Pagination,
            auth_dto::LoginRequest,
            auth_dto::AuthResponse,
            organization_dto::FindOrganizationRequest,
            organization_dto::CheckOrganizationRequest,
            organization_dto::RequestRegistrationRequest,
            organization_dto::RegisterOrganizationRequest,
            organization_dto::InviteUserRequest,
            organization_dto::RegisterInviteLinkRequest,
            organization_dto::EditOrganizationEmailRequest,
            organization_dto::EditExpirationResetDayOffRequest,
            organization_models::OrganizationSummary,
            organization_models::OrganizationListItem,
            organization_models::OrganizationSetting,
            organization_models::Branch,
            user_dto::FcmTokenRequest,
            user_models::UserProfile,
            user_models::UserName,
            notification_dto::EditStatusReadRequest,
            notification_dto::EditNotificationStatusRequest,
            notification_dto::GetNotificationsRequest,
            notification_dto::GetTotalUnreadRequest,
            notification_dto::NotificationIdRequest,
            notification_dto::NotificationItem,
            notification_dto::NotificationsResponse,
            notification_dto::TotalUnreadResponse,
            reminder_dto::BirthdayItem,
            reminder_dto::CompanyJoinedItem,
            reminder_dto::ContractRemindItem,
            reminder_dto::EventRemindResponse,
            asset_dto::GetAssetListRequest,
            asset_dto::AssetListResponse,
            asset_dto::CreateAssetTypeRequest,
            asset_dto::AssetIdRequest,
            asset_dto::AssetPayload,
            asset_dto::CreateRequestAssetRequest,
            asset_dto::GetUserRequestAssetRequest,
            asset_dto::AssetRequestsResponse,
            asset_dto::EditUserRequestAssetRequest,
            asset_dto::GetAssetLogRequest,
            asset_dto::AssetLogsResponse,
            asset_dto::CreateAssetLogRequest,
            asset_models::AssetType,
            asset_models::Asset,
            asset_models::AssetListItem,
            asset_models::AssetRequestRecord,
            asset_models::AssetLogRecord,
            contract_dto::GetContractCurrentListRequest,
            contract_dto::ContractListResponse,
            contract_dto::GetContractByUserRequest,
            contract_dto::CreateContractRequest,
            contract_dto::CreatedContract,
            contract_dto::ContractIdRequest,
            contract_dto::CreateContractTypeRequest,
            contract_dto::GetContractTypeListRequest,
            contract_dto::ContractTypeListResponse,
            contract_dto::GetContractTypeRequest,
            contract_dto::ContractTypeDetail,
            contract_dto::EditContractTypeRequest,
            contract_dto::EditedContractType,
            contract_dto::RemoveContractTypeRequest,
            contract_dto::PreviewContractRequest,
            contract_dto::PreviewContractResponse,
            contract_dto::DeletePreviewContractRequest,
            contract_models::ContractType,
            contract_models::ContractItem,
            leave_dto::CreateLeaveRequestRequest,
            leave_dto::GetLeaveRequestsRequest,
            leave_dto::GetLeaveHistoryRequest,
            leave_dto::LeaveIdRequest,
            leave_dto::UpdateCalendarEventRequest,
            leave_dto::GetLeaveDayStatusRequest,
            leave_dto::CreateLeaveBonusRequest,
            leave_dto::CreateLeaveBonusesRequest,
            leave_dto::GetLeaveBonusesRequest,
            leave_dto::EditLeaveBonusRequest,
            leave_dto::RemoveLeaveBonusRequest,
            leave_dto::GetValidLeaveBonusesRequest,
            leave_handlers::LeaveRequestsResponse,
            leave_handlers::LeaveBonusesResponse,
            leave_handlers::CreatedLeaveBonuses,
            leave_models::LeaveDayStatus,
            leave_models::LeaveRequestRecord,
            leave_models::LeaveHistoryRecord,
            leave_models::LeaveRequestDetail,
            leave_models::LeaveBonusRecord,
            leave_models::LeaveBonusDetail,
            leave_models::ValidLeaveBonus,
            leave_models::ExpiredHours,
            leave_service::CreatedLeave,
            recruitment_dto::CreateJobRequest,
            recruitment_dto::EditJobRequest,
            recruitment_dto::GetJobsRequest,
            recruitment_dto::JobItem,
            recruitment_dto::JobsResponse,
            recruitment_dto::JobIdRequest,
            recruitment_dto::JobDetailItem,
            recruitment_dto::JobResponse,
            recruitment_dto::DetailJobPayload,
            recruitment_dto::CreateDetailJobRequest,
            recruitment_dto::UpdateDetailJobRequest,
            recruitment_dto::UploadDetailJobFileRequest,
            recruitment_dto::RecruitmentIdRequest,
            recruitment_dto::FileContentResponse,
            recruitment_dto::CvPayload,
            recruitment_dto::CreateCvRequest,
            recruitment_dto::UpdateCvRequest,
            recruitment_dto::GetCvsRequest,
            recruitment_dto::CvItem,
            recruitment_dto::CvsResponse,
            recruitment_dto::CvIdRequest,
            recruitment_dto::CvResponse,
            recruitment_dto::CreateCvCommentRequest,
            recruitment_dto::CreatedCvComment,
            recruitment_dto::EditCvCommentRequest,
            recruitment_dto::GetCvCommentsRequest,
            recruitment_dto::CvCommentItem,
            recruitment_dto::CvCommentsResponse,
            recruitment_dto::RemoveCvCommentRequest,
            recruitment_dto::CreateLogCvStatusRequest,
            recruitment_dto::GetLogCvStatusRequest,
            recruitment_dto::LogCvStatusItem,
            recruitment_models::DetailedJob,
            recruitment_models::CvStatusCount,
            permission_dto::SettingOrgModuleRequest,
            permission_dto::SettingOrgFunctionsRequest,
            permission_dto::SettingUserFunctionsRequest,
            permission_dto::GetUserPermissionsRequest,
            permission_dto::GetPermissionsRequest,
            permission_dto::EditUserPermissionRequest,
            permission_handlers::UserPermissionsResponse,
            permission_models::ModuleSetting,
            permission_models::Module,
            permission_models::PermissionRecord,
            permission_models::UserPermissionSummary,
        )
    ),
    tags(
        (name = "auth", description = "Password and Google sign-in"),
        (name = "organization", description = "Organization registration and settings"),
        (name = "user", description = "Profiles and push tokens"),
        (name = "notification", description = "In-app notifications and event reminders"),
        (name = "asset", description = "Assets, lending requests and logs"),
        (name = "contract", description = "Employment contracts and contract templates"),
        (name = "leave", description = "Leave requests and leave bonuses"),
        (name = "recruitment", description = "Jobs, CVs, comments and CV status history"),
        (name = "admin", description = "Module settings of organizations"),
        (name = "user-permission", description = "Per-user function permissions")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer,
                )),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let organization_routes = crate::organization::routes::public_routes()
        .merge(crate::organization::routes::protected_routes().route_layer(auth.clone()));

    // Everything below requires a bearer token
    let protected_routes = Router::new()
        .nest("/api/user", crate::user::routes::routes())
        .nest("/notification", crate::notification::routes::routes())
        .nest("/asset", crate::asset::routes::routes())
        .nest("/contract", crate::contract::routes::routes())
        .nest("/leave", crate::leave::routes::routes())
        .nest("/recruitment", crate::recruitment::routes::routes())
        .nest("/admin", crate::permission::routes::admin_routes())
        .nest("/user-permission", crate::permission::routes::user_permission_routes())
        .route_layer(auth);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/auth", crate::auth::routes::routes())
        .nest("/api/organization", organization_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_bearer_scheme_and_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/recruitment/statistic-cv-by-status"));
        assert!(doc.paths.paths.contains_key("/notification/event-remind"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
