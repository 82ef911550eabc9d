use super::organization_dto::{
    CheckOrganizationRequest, EditExpirationResetDayOffRequest, EditOrganizationEmailRequest,
    FindOrganizationRequest, InviteUserRequest, RegisterInviteLinkRequest, RegisterOrganizationRequest,
    RequestRegistrationRequest,
};
use super::organization_models::{normalize_tag, OrganizationListItem, OrganizationSetting, OrganizationSummary};
use super::organization_service::{InvitedMember, NewOrganization, Registration};
use crate::{
    common::JsonResponse,
    error::Result,
    middleware::{require_general_manager, AuthUser, ValidJson},
    state::AppState,
};
use axum::{extract::State, Json};

fn registration_response(outcome: Registration, message: &str) -> Json<JsonResponse<OrganizationSummary>> {
    match outcome {
        Registration::Registered(summary) => Json(JsonResponse::success(message, summary)),
        Registration::Rejected(reason) => Json(JsonResponse::rejected(reason)),
    }
}

#[utoipa::path(
    post,
    path = "/api/organization/find-organization",
    request_body = FindOrganizationRequest,
    responses((status = 200, description = "Organization found, or a FAIL status", body = OrganizationSummary)),
    tag = "organization"
)]
pub async fn find_organization(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<FindOrganizationRequest>,
) -> Result<Json<JsonResponse<OrganizationSummary>>> {
    let Some(tag) = normalize_tag(&payload.tag_organization) else {
        return Ok(Json(JsonResponse::rejected("Invalid params")));
    };

    match state.organization_service.repository().find_by_tag(&tag).await? {
        Some(org) => Ok(Json(JsonResponse::success("Success", OrganizationSummary::from(&org)))),
        None => Ok(Json(JsonResponse::rejected("Organization is not exist"))),
    }
}

#[utoipa::path(
    post,
    path = "/api/organization/get-organizations",
    responses((status = 200, description = "All organizations", body = [OrganizationListItem])),
    tag = "organization"
)]
pub async fn get_organizations(State(state): State<AppState>) -> Result<Json<JsonResponse<Vec<OrganizationListItem>>>> {
    let orgs = state.organization_service.repository().list().await?;
    Ok(Json(JsonResponse::success("Success", orgs)))
}

#[utoipa::path(
    post,
    path = "/api/organization/check-organization",
    request_body = CheckOrganizationRequest,
    responses((status = 200, description = "Whether the tag is still free", body = OrganizationSummary)),
    tag = "organization"
)]
pub async fn check_organization(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CheckOrganizationRequest>,
) -> Result<Json<JsonResponse<OrganizationSummary>>> {
    let Some(tag) = normalize_tag(&payload.organization_tag) else {
        return Ok(Json(JsonResponse::rejected("Invalid params")));
    };

    if state.organization_service.repository().find_by_tag(&tag).await?.is_some() {
        return Ok(Json(JsonResponse::rejected("Organization already registered.")));
    }

    Ok(Json(JsonResponse::success(
        "Organization can be register.",
        OrganizationSummary {
            id: 0,
            tag,
            name: payload.organization_name.trim().to_string(),
        },
    )))
}

#[utoipa::path(
    post,
    path = "/api/organization/request-registration",
    request_body = RequestRegistrationRequest,
    responses((status = 200, description = "Registration code mailed")),
    tag = "organization"
)]
pub async fn request_registration(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RequestRegistrationRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .organization_service
        .request_registration(payload.email.trim())
        .await?;

    Ok(Json(JsonResponse::message("Registration code has been sent")))
}

#[utoipa::path(
    post,
    path = "/api/organization/register-organization",
    request_body = RegisterOrganizationRequest,
    responses((status = 200, description = "Organization registered, or a FAIL status", body = OrganizationSummary)),
    tag = "organization"
)]
pub async fn register_organization(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterOrganizationRequest>,
) -> Result<Json<JsonResponse<OrganizationSummary>>> {
    let outcome = state
        .organization_service
        .register_organization(&NewOrganization {
            code: &payload.code,
            email: payload.email.trim(),
            password: &payload.password,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            organization_tag: &payload.organization_tag,
            organization_name: &payload.organization_name,
        })
        .await?;

    Ok(registration_response(outcome, "Organization register successfull."))
}

#[utoipa::path(
    post,
    path = "/api/organization/invite-user",
    request_body = InviteUserRequest,
    responses(
        (status = 200, description = "Invite link mailed"),
        (status = 403, description = "Only a general manager can invite")
    ),
    tag = "organization",
    security(("bearer_auth" = []))
)]
pub async fn invite_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<InviteUserRequest>,
) -> Result<Json<JsonResponse>> {
    require_general_manager(&user)?;

    state
        .organization_service
        .invite_user(&user, payload.email.trim())
        .await?;

    Ok(Json(JsonResponse::message("Send invite link successful.")))
}

#[utoipa::path(
    post,
    path = "/api/organization/register-invite-link",
    request_body = RegisterInviteLinkRequest,
    responses((status = 200, description = "Member registered, or a FAIL status", body = OrganizationSummary)),
    tag = "organization"
)]
pub async fn register_invite_link(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterInviteLinkRequest>,
) -> Result<Json<JsonResponse<OrganizationSummary>>> {
    let outcome = state
        .organization_service
        .register_invite_link(&InvitedMember {
            request_id: payload.request_id,
            code: &payload.code,
            email: payload.email.trim(),
            password: &payload.password,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
        })
        .await?;

    Ok(registration_response(outcome, "Register successful."))
}

#[utoipa::path(
    post,
    path = "/api/organization/edit-organization-email",
    request_body = EditOrganizationEmailRequest,
    responses((status = 200, description = "Organization mailbox stored and test mail sent")),
    tag = "organization",
    security(("bearer_auth" = []))
)]
pub async fn edit_organization_email(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditOrganizationEmailRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .organization_service
        .edit_organization_email(&user, payload.email_test.trim())
        .await?;

    Ok(Json(JsonResponse::message(
        "Update email for organization successful. Please check email test",
    )))
}

#[utoipa::path(
    post,
    path = "/api/organization/get-organization-setting",
    responses((status = 200, description = "Mailbox and leave expiration of the organization", body = OrganizationSetting)),
    tag = "organization",
    security(("bearer_auth" = []))
)]
pub async fn get_organization_setting(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JsonResponse<OrganizationSetting>>> {
    let setting = state.organization_service.setting(user.organization_id).await?;

    Ok(Json(JsonResponse::success("Get setting for organization successful.", setting)))
}

#[utoipa::path(
    post,
    path = "/api/organization/edit-expiration-reset-day-off",
    request_body = EditExpirationResetDayOffRequest,
    responses((status = 200, description = "Expiration stored and this year's grants re-stamped")),
    tag = "organization",
    security(("bearer_auth" = []))
)]
pub async fn edit_expiration_reset_day_off(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditExpirationResetDayOffRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .organization_service
        .edit_expiration_reset_day_off(user.organization_id, payload.expiration)
        .await?;

    Ok(Json(JsonResponse::message("Edit expiration reset day off successful")))
}
