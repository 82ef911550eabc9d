use super::leave_dto::{
    CreateLeaveBonusRequest, CreateLeaveBonusesRequest, CreateLeaveRequestRequest, EditLeaveBonusRequest,
    GetLeaveBonusesRequest, GetLeaveDayStatusRequest, GetLeaveHistoryRequest, GetLeaveRequestsRequest,
    GetValidLeaveBonusesRequest, LeaveIdRequest, RemoveLeaveBonusRequest, UpdateCalendarEventRequest,
};
use super::leave_models::{
    ExpiredHours, LeaveBonusDetail, LeaveBonusRecord, LeaveDayStatus, LeaveHistoryRecord, LeaveRequestDetail,
    LeaveRequestRecord, NewLeaveBonus, ValidLeaveBonus,
};
use super::leave_repository::{LeaveBonusFilter, LeaveHistoryFilter, LeaveRequestFilter};
use super::leave_service::{CreateLeave, CreatedLeave, LEAVE_NOT_FOUND};
use crate::{
    common::{dates, JsonResponse, Pagination},
    error::{AppError, Result},
    middleware::{require_general_manager, AuthUser, ValidJson},
    state::AppState,
};
use axum::{extract::State, Json};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

const LEAVE_BONUS_NOT_FOUND: &str = "Leave bonus does not exist";

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveRequestsResponse {
    pub pagination: Pagination,
    pub leave_requests: Vec<LeaveRequestRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveBonusesResponse {
    pub pagination: Pagination,
    pub leave_bonuses: Vec<LeaveBonusRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedLeaveBonuses {
    pub ids: Vec<i32>,
}

fn leave_datetime(value: &str, field: &str) -> Result<NaiveDateTime> {
    dates::parse_datetime_no_sec(value)
        .ok_or_else(|| AppError::InvalidParams(format!("{} must be formatted YYYY-MM-DD HH:MM", field)))
}

fn optional_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    dates::parse_optional_date(value)
        .map_err(|_| AppError::InvalidParams(format!("{} must be formatted YYYY-MM-DD", field)))
}

fn new_bonus(payload: &CreateLeaveBonusRequest) -> Result<NewLeaveBonus> {
    Ok(NewLeaveBonus {
        user_id: payload.user_id,
        leave_bonus_type_id: payload.leave_bonus_type_id,
        year_belong: payload.year_belong,
        reason: payload.reason.clone(),
        hour: payload.hour,
        expire_bonus_leave_date: optional_date(
            payload.expire_bonus_leave_date.as_deref(),
            "expire_bonus_leave_date",
        )?,
    })
}

#[utoipa::path(
    post,
    path = "/leave/create-leave-request",
    request_body = CreateLeaveRequestRequest,
    responses((status = 200, description = "Leave request stored and notifications queued", body = CreatedLeave)),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn create_leave_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateLeaveRequestRequest>,
) -> Result<Json<JsonResponse<CreatedLeave>>> {
    let input = CreateLeave {
        leave_request_type_id: payload.leave_request_type_id,
        datetime_leave_from: leave_datetime(&payload.datetime_leave_from, "datetime_leave_from")?,
        datetime_leave_to: leave_datetime(&payload.datetime_leave_to, "datetime_leave_to")?,
        subtract_day_off_type_id: payload.subtract_day_off_type_id,
        extra_time: payload.extra_time,
        reason: &payload.reason,
        email_title: &payload.email_title,
        email_content: &payload.email_content,
        send_to: &payload.send_to,
    };

    let created = state.leave_service.create_leave_request(&user, &input).await?;

    Ok(Json(JsonResponse::success("Create leave request successful", created)))
}

#[utoipa::path(
    post,
    path = "/leave/get-leave-requests",
    request_body = GetLeaveRequestsRequest,
    responses((status = 200, description = "Page of leave requests", body = LeaveRequestsResponse)),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave_requests(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetLeaveRequestsRequest>,
) -> Result<Json<JsonResponse<LeaveRequestsResponse>>> {
    let filter = LeaveRequestFilter {
        user_name: payload.user_name,
        leave_request_type_id: payload.leave_request_type_id,
        branch: payload.branch,
        date_from: optional_date(payload.datetime_leave_from.as_deref(), "datetime_leave_from")?,
        date_to: optional_date(payload.datetime_leave_to.as_deref(), "datetime_leave_to")?,
    };

    let (leave_requests, total) = state
        .leave_service
        .repository()
        .list_requests(user.organization_id, &filter, payload.current_page, payload.row_per_page)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get leave requests successful",
        LeaveRequestsResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            leave_requests,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/leave/get-leave-history",
    request_body = GetLeaveHistoryRequest,
    responses((status = 200, description = "Leave history ordered by user", body = [LeaveHistoryRecord])),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetLeaveHistoryRequest>,
) -> Result<Json<JsonResponse<Vec<LeaveHistoryRecord>>>> {
    let filter = LeaveHistoryFilter {
        id: payload.id,
        user_id: payload.user_id,
        user_name: payload.user_name,
        date_from: optional_date(payload.datetime_leave_from.as_deref(), "datetime_leave_from")?,
        date_to: optional_date(payload.datetime_leave_to.as_deref(), "datetime_leave_to")?,
        subtract_day_off_type_id: payload.subtract_day_off_type_id,
    };

    let history = state
        .leave_service
        .repository()
        .history(user.organization_id, &filter)
        .await?;

    Ok(Json(JsonResponse::success("Get leave history successful", history)))
}

#[utoipa::path(
    post,
    path = "/leave/get-leave-request",
    request_body = LeaveIdRequest,
    responses(
        (status = 200, description = "Leave request detail", body = LeaveRequestDetail),
        (status = 404, description = "Leave request does not exist")
    ),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<LeaveIdRequest>,
) -> Result<Json<JsonResponse<LeaveRequestDetail>>> {
    let detail = state
        .leave_service
        .repository()
        .find_request(user.organization_id, payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound(LEAVE_NOT_FOUND.to_string()))?;

    Ok(Json(JsonResponse::success("Get leave request successful", detail)))
}

#[utoipa::path(
    post,
    path = "/leave/update-calendar-event",
    request_body = UpdateCalendarEventRequest,
    responses((status = 200, description = "Calendar event linked to the leave request")),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn update_calendar_event(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateCalendarEventRequest>,
) -> Result<Json<JsonResponse>> {
    let updated = state
        .leave_service
        .repository()
        .update_calendar_event(user.organization_id, payload.id, &payload.calendar_event_id, user.user_id)
        .await?;
    if updated == 0 {
        return Err(AppError::NotFound(LEAVE_NOT_FOUND.to_string()));
    }

    Ok(Json(JsonResponse::message("Update calendar event successful")))
}

#[utoipa::path(
    post,
    path = "/leave/remove-leave",
    request_body = LeaveIdRequest,
    responses(
        (status = 200, description = "Leave request removed"),
        (status = 405, description = "Caller is neither the owner nor a general manager")
    ),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn remove_leave(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<LeaveIdRequest>,
) -> Result<Json<JsonResponse>> {
    state.leave_service.remove_leave(&user, payload.id).await?;

    Ok(Json(JsonResponse::message("Remove leave successful")))
}

#[utoipa::path(
    post,
    path = "/leave/get-leave-day-status",
    request_body = GetLeaveDayStatusRequest,
    responses((status = 200, description = "Leave balance in days", body = LeaveDayStatus)),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave_day_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetLeaveDayStatusRequest>,
) -> Result<Json<JsonResponse<LeaveDayStatus>>> {
    let status = state
        .leave_service
        .day_status(user.organization_id, payload.user_id, payload.year)
        .await?;

    Ok(Json(JsonResponse::success("Get leave day status successful", status)))
}

#[utoipa::path(
    post,
    path = "/leave/create-leave-bonus",
    request_body = CreateLeaveBonusRequest,
    responses((status = 200, description = "Leave bonus granted", body = CreatedLeaveBonuses)),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn create_leave_bonus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateLeaveBonusRequest>,
) -> Result<Json<JsonResponse<CreatedLeaveBonuses>>> {
    let bonus = new_bonus(&payload)?;
    let ids = state.leave_service.create_bonuses(&user, &[bonus]).await?;

    Ok(Json(JsonResponse::success(
        "Create leave bonus successful",
        CreatedLeaveBonuses { ids },
    )))
}

#[utoipa::path(
    post,
    path = "/leave/create-leave-bonuses",
    request_body = CreateLeaveBonusesRequest,
    responses((status = 200, description = "All grants stored in one transaction", body = CreatedLeaveBonuses)),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn create_leave_bonuses(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateLeaveBonusesRequest>,
) -> Result<Json<JsonResponse<CreatedLeaveBonuses>>> {
    let bonuses = payload.items.iter().map(new_bonus).collect::<Result<Vec<_>>>()?;
    let ids = state.leave_service.create_bonuses(&user, &bonuses).await?;

    Ok(Json(JsonResponse::success(
        "Create leave bonuses successful",
        CreatedLeaveBonuses { ids },
    )))
}

#[utoipa::path(
    post,
    path = "/leave/get-leave-bonuses",
    request_body = GetLeaveBonusesRequest,
    responses((status = 200, description = "Page of leave grants, newest first", body = LeaveBonusesResponse)),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave_bonuses(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetLeaveBonusesRequest>,
) -> Result<Json<JsonResponse<LeaveBonusesResponse>>> {
    let filter = LeaveBonusFilter {
        full_name: payload.full_name,
        leave_bonus_type_id: payload.leave_bonus_type_id,
        year: payload.year,
        is_deleted: payload.is_deleted,
    };

    let (leave_bonuses, total) = state
        .leave_service
        .repository()
        .list_bonuses(user.organization_id, &filter, payload.current_page, payload.row_per_page)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get leave bonuses successful",
        LeaveBonusesResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            leave_bonuses,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/leave/get-leave-bonus",
    request_body = LeaveIdRequest,
    responses(
        (status = 200, description = "Leave grant detail", body = LeaveBonusDetail),
        (status = 404, description = "Leave bonus does not exist")
    ),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn get_leave_bonus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<LeaveIdRequest>,
) -> Result<Json<JsonResponse<LeaveBonusDetail>>> {
    let bonus = state
        .leave_service
        .repository()
        .find_bonus(user.organization_id, payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound(LEAVE_BONUS_NOT_FOUND.to_string()))?;

    Ok(Json(JsonResponse::success("Get leave bonus successful", bonus)))
}

#[utoipa::path(
    post,
    path = "/leave/edit-leave-bonus",
    request_body = EditLeaveBonusRequest,
    responses((status = 200, description = "Leave grant updated and refilled")),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn edit_leave_bonus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditLeaveBonusRequest>,
) -> Result<Json<JsonResponse>> {
    let bonus = NewLeaveBonus {
        user_id: payload.user_id,
        leave_bonus_type_id: payload.leave_bonus_type_id,
        year_belong: payload.year_belong,
        reason: payload.reason,
        hour: payload.hour,
        expire_bonus_leave_date: None,
    };

    let updated = state
        .leave_service
        .repository()
        .update_bonus(user.organization_id, payload.id, &bonus, user.user_id)
        .await?;
    if updated == 0 {
        return Err(AppError::NotFound(LEAVE_BONUS_NOT_FOUND.to_string()));
    }

    Ok(Json(JsonResponse::message("Edit leave bonus successful")))
}

#[utoipa::path(
    post,
    path = "/leave/remove-leave-bonus",
    request_body = RemoveLeaveBonusRequest,
    responses((status = 200, description = "Leave grant deleted or restored")),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn remove_leave_bonus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<RemoveLeaveBonusRequest>,
) -> Result<Json<JsonResponse>> {
    let updated = state
        .leave_service
        .repository()
        .set_bonus_deleted(user.organization_id, payload.id, payload.is_deleted, user.user_id)
        .await?;
    if updated == 0 {
        return Err(AppError::NotFound(LEAVE_BONUS_NOT_FOUND.to_string()));
    }

    let message = if payload.is_deleted {
        "Remove leave bonus successful"
    } else {
        "Restore leave bonus successful"
    };
    Ok(Json(JsonResponse::message(message)))
}

#[utoipa::path(
    post,
    path = "/leave/get-valid-leave-bonuses",
    request_body = GetValidLeaveBonusesRequest,
    responses((status = 200, description = "Unexpired grants, earliest expiry first", body = [ValidLeaveBonus])),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn get_valid_leave_bonuses(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetValidLeaveBonusesRequest>,
) -> Result<Json<JsonResponse<Vec<ValidLeaveBonus>>>> {
    let grants = state
        .leave_service
        .repository()
        .valid_grants(user.organization_id, payload.user_id, dates::today())
        .await?;

    Ok(Json(JsonResponse::success("Get valid leave bonuses successful", grants)))
}

#[utoipa::path(
    post,
    path = "/leave/clear-expire-leave",
    responses((status = 200, description = "Hours that expired per user", body = [ExpiredHours])),
    tag = "leave",
    security(("bearer_auth" = []))
)]
pub async fn clear_expire_leave(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<JsonResponse<Vec<ExpiredHours>>>> {
    require_general_manager(&user)?;

    let expired = state.leave_service.clear_expired(user.organization_id).await?;

    Ok(Json(JsonResponse::success("Clear expired leave successful", expired)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_datetime_requires_minutes() {
        assert!(leave_datetime("2024-03-04 08:30", "datetime_leave_from").is_ok());
        let err = leave_datetime("2024-03-04", "datetime_leave_from").unwrap_err();
        assert!(matches!(err, AppError::InvalidParams(m) if m.contains("datetime_leave_from")));
    }

    #[test]
    fn test_bonus_without_expiry() {
        let payload = CreateLeaveBonusRequest {
            user_id: 3,
            leave_bonus_type_id: 1,
            year_belong: 2024,
            reason: "opening".into(),
            hour: 96.0,
            expire_bonus_leave_date: Some(String::new()),
        };
        let bonus = new_bonus(&payload).unwrap();
        assert_eq!(bonus.expire_bonus_leave_date, None);
        assert_eq!(bonus.hour, 96.0);
    }

    #[test]
    fn test_bonus_with_bad_expiry_is_rejected() {
        let payload = CreateLeaveBonusRequest {
            user_id: 3,
            leave_bonus_type_id: 1,
            year_belong: 2024,
            reason: String::new(),
            hour: 8.0,
            expire_bonus_leave_date: Some("31/12/2024".into()),
        };
        assert!(matches!(new_bonus(&payload), Err(AppError::InvalidParams(_))));
    }
}
