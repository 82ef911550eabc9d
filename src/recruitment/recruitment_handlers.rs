use super::recruitment_dto::{
    CreateCvCommentRequest, CreateCvRequest, CreateDetailJobRequest, CreateJobRequest, CreateLogCvStatusRequest,
    CreatedCvComment, CvCommentItem, CvCommentsResponse, CvIdRequest, CvItem, CvPayload, CvResponse, CvsResponse,
    DetailJobPayload, EditCvCommentRequest, EditJobRequest, FileContentResponse, GetCvCommentsRequest, GetCvsRequest,
    GetJobsRequest, GetLogCvStatusRequest, JobDetailItem, JobIdRequest, JobItem, JobResponse, JobsResponse,
    LogCvStatusItem, RecruitmentIdRequest, RemoveCvCommentRequest, UpdateCvRequest, UpdateDetailJobRequest,
    UploadDetailJobFileRequest,
};
use super::recruitment_models::{CvFields, CvStatusCount, DetailedJobFields, JobChanges, NewJob, BRANCH_NOT_FOUND};
use super::recruitment_repository::{CvFilter, JobFilter};
use super::recruitment_service::UploadedFile;
use crate::{
    common::{dates, JsonResponse, Pagination},
    error::{AppError, Result},
    middleware::{AuthUser, ValidJson},
    state::AppState,
};
use axum::{extract::State, Json};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

fn invalid_field(field: &str) -> AppError {
    AppError::BadRequest(format!("Invalid value for field {}", field))
}

fn required_date(value: &str, field: &str) -> Result<NaiveDate> {
    dates::parse_date(value).ok_or_else(|| invalid_field(field))
}

fn optional_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    dates::parse_optional_date(value).map_err(|_| invalid_field(field))
}

impl TryFrom<&CreateJobRequest> for NewJob {
    type Error = AppError;

    fn try_from(payload: &CreateJobRequest) -> Result<Self> {
        Ok(NewJob {
            job_name: payload.job_name.trim().to_string(),
            start_date: required_date(&payload.start_date, "start_date")?,
            expiry_date: required_date(&payload.expiry_date, "expiry_date")?,
            branch_ids: payload.branch_ids.clone(),
            assignees: payload.assignees.clone(),
        })
    }
}

impl TryFrom<EditJobRequest> for JobChanges {
    type Error = AppError;

    fn try_from(payload: EditJobRequest) -> Result<Self> {
        Ok(JobChanges {
            start_date: optional_date(payload.start_date.as_deref(), "start_date")?,
            expiry_date: optional_date(payload.expiry_date.as_deref(), "expiry_date")?,
            job_name: payload.job_name.map(|n| n.trim().to_string()),
            branch_ids: payload.branch_ids,
            assignees: payload.assignees,
        })
    }
}

impl From<DetailJobPayload> for DetailedJobFields {
    fn from(payload: DetailJobPayload) -> Self {
        DetailedJobFields {
            amount: payload.amount,
            address: payload.address,
            place: payload.place,
            role: payload.role,
            gender: payload.gender,
            type_of_work: payload.type_of_work,
            experience: payload.experience,
            salary_type: payload.salary_type,
            salary_from: payload.salary_from,
            salary_to: payload.salary_to,
            profile_recipients: payload.profile_recipients,
            email: payload.email,
            phone_number: payload.phone_number,
            description: payload.description,
        }
    }
}

impl TryFrom<&CvPayload> for CvFields {
    type Error = AppError;

    fn try_from(payload: &CvPayload) -> Result<Self> {
        Ok(CvFields {
            date_receipt_cv: required_date(&payload.date_receipt_cv, "date_receipt_cv")?,
            media_id: payload.media_id,
            media_id_other: payload.media_id_other.trim().to_string(),
            full_name: payload.full_name.trim().to_string(),
            phone_number: payload.phone_number.trim().to_string(),
            email: payload.email.trim().to_string(),
            salary: payload.salary.trim().to_string(),
            interview_method: payload.interview_method,
            contact_link: payload.contact_link.trim().to_string(),
        })
    }
}

async fn lookup_tables(
    state: &AppState,
    organization_id: i32,
) -> Result<(BTreeMap<i32, String>, BTreeMap<i32, String>)> {
    let branches = state
        .organization_service
        .repository()
        .branches(organization_id)
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();
    let users = state
        .user_repository
        .names_by_org(organization_id)
        .await?
        .into_iter()
        .map(|n| (n.user_id, n.full_name))
        .collect();

    Ok((branches, users))
}

#[utoipa::path(
    post,
    path = "/recruitment/create-job",
    request_body = CreateJobRequest,
    responses((status = 200, description = "Job created and assignees notified")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateJobRequest>,
) -> Result<Json<JsonResponse>> {
    let job = NewJob::try_from(&payload)?;
    state.recruitment_service.create_job(&user, &job).await?;

    Ok(Json(JsonResponse::message("Create job successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/edit-job",
    request_body = EditJobRequest,
    responses((status = 200, description = "Job updated")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn edit_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditJobRequest>,
) -> Result<Json<JsonResponse>> {
    let id = payload.id;
    let changes = JobChanges::try_from(payload)?;
    state.recruitment_service.edit_job(&user, id, changes).await?;

    Ok(Json(JsonResponse::message("Update job successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/get-jobs",
    request_body = GetJobsRequest,
    responses((status = 200, description = "Page of jobs with lookup tables", body = JobsResponse)),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn get_jobs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetJobsRequest>,
) -> Result<Json<JsonResponse<JobsResponse>>> {
    let (branches, users) = lookup_tables(&state, user.organization_id).await?;
    if let Some(branch_id) = payload.branch_id.filter(|b| *b != 0) {
        if !branches.contains_key(&branch_id) {
            return Err(AppError::NotFound(BRANCH_NOT_FOUND.to_string()));
        }
    }

    let filter = JobFilter {
        job_name: payload.job_name,
        job_status: payload.job_status,
        expiry_date: optional_date(payload.expiry_date.as_deref(), "expiry_date")?,
        branch_id: payload.branch_id,
        user_id: payload.user_id,
    };
    let (jobs, total) = state
        .recruitment_service
        .repository()
        .list_jobs(
            user.organization_id,
            &filter,
            dates::today(),
            payload.current_page,
            payload.row_per_page,
        )
        .await?;

    let assignees: Vec<i32> = jobs
        .iter()
        .flat_map(|job| job.assignees.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let avatars = state.recruitment_service.avatars(&assignees).await?;

    let recruitments = jobs
        .into_iter()
        .map(|job| JobItem {
            id: job.id,
            job_name: job.job_name,
            start_date: dates::database_date(job.start_date),
            expiry_date: dates::database_date(job.expiry_date),
            branch_ids: job.branch_ids,
            assignees: job.assignees,
        })
        .collect();

    Ok(Json(JsonResponse::success(
        "Get jobs successful",
        JobsResponse {
            recruitments,
            branches,
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            users,
            avatars,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/recruitment/get-job",
    request_body = JobIdRequest,
    responses((status = 200, description = "Job with its detailed descriptions", body = JobResponse)),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn get_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<JobIdRequest>,
) -> Result<Json<JsonResponse<JobResponse>>> {
    let detail = state.recruitment_service.job_detail(&user, payload.id).await?;
    let (branches, users) = lookup_tables(&state, user.organization_id).await?;
    let avatars = state
        .recruitment_service
        .avatars(&detail.recruitment.assignees)
        .await?;

    let job = detail.recruitment;
    Ok(Json(JsonResponse::success(
        "Get job successful",
        JobResponse {
            recruitment: JobDetailItem {
                id: job.id,
                job_name: job.job_name,
                start_date: dates::database_date(job.start_date),
                expiry_date: dates::database_date(job.expiry_date),
                branch_ids: job.branch_ids,
                assignees: job.assignees,
                detail_job_file_name: job.detail_job_file_name,
                detail_job_file_path: detail.detail_job_file_path,
                detail_jobs: detail.detail_jobs,
            },
            branches,
            users,
            avatars,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/recruitment/remove-job",
    request_body = JobIdRequest,
    responses((status = 200, description = "Job and its detailed descriptions removed")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn remove_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<JobIdRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .recruitment_service
        .remove_job(user.organization_id, payload.id)
        .await?;

    Ok(Json(JsonResponse::message("Remove job successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/create-detail-job",
    request_body = CreateDetailJobRequest,
    responses((status = 200, description = "Detailed description added")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn create_detail_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateDetailJobRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .recruitment_service
        .create_detail_job(&user, payload.recruitment_id, &DetailedJobFields::from(payload.detail))
        .await?;

    Ok(Json(JsonResponse::message("Create detail job successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/update-detail-job",
    request_body = UpdateDetailJobRequest,
    responses((status = 200, description = "Detailed description updated")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn update_detail_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateDetailJobRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .recruitment_service
        .update_detail_job(&user, payload.id, &DetailedJobFields::from(payload.detail))
        .await?;

    Ok(Json(JsonResponse::message("Update detail job successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/upload-detail-job-file",
    request_body = UploadDetailJobFileRequest,
    responses((status = 200, description = "Job description file stored")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn upload_detail_job_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UploadDetailJobFileRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .recruitment_service
        .upload_detail_job_file(
            &user,
            payload.recruitment_id,
            UploadedFile {
                file_name: &payload.file_name,
                content: &payload.file_content,
            },
        )
        .await?;

    Ok(Json(JsonResponse::message("Upload detail job successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/get-detail-job-file",
    request_body = RecruitmentIdRequest,
    responses((status = 200, description = "Job description file as base64", body = FileContentResponse)),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn get_detail_job_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<RecruitmentIdRequest>,
) -> Result<Json<JsonResponse<FileContentResponse>>> {
    let file_content = state
        .recruitment_service
        .detail_job_file(&user, payload.recruitment_id)
        .await?;

    Ok(Json(JsonResponse::success(
        "Get detail job file successful",
        FileContentResponse { file_content },
    )))
}

#[utoipa::path(
    post,
    path = "/recruitment/remove-detail-job-file",
    request_body = RecruitmentIdRequest,
    responses((status = 200, description = "Job description file removed")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn remove_detail_job_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<RecruitmentIdRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .recruitment_service
        .remove_detail_job_file(&user, payload.recruitment_id)
        .await?;

    Ok(Json(JsonResponse::message("Remove detail job file successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/create-cv",
    request_body = CreateCvRequest,
    responses((status = 200, description = "CV stored and assignees notified")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn create_cv(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateCvRequest>,
) -> Result<Json<JsonResponse>> {
    let cv = CvFields::try_from(&payload.cv)?;
    state
        .recruitment_service
        .create_cv(
            &user,
            payload.recruitment_id,
            &cv,
            UploadedFile {
                file_name: &payload.file_name,
                content: &payload.file_content,
            },
        )
        .await?;

    Ok(Json(JsonResponse::message("Create cv successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/get-cvs",
    request_body = GetCvsRequest,
    responses((status = 200, description = "Page of CVs of a job", body = CvsResponse)),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn get_cvs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetCvsRequest>,
) -> Result<Json<JsonResponse<CvsResponse>>> {
    let filter = CvFilter {
        name_applicant: payload.name_applicant,
        media_id: payload.media_id,
        date_receipt_cv: optional_date(payload.date_receipt_cv.as_deref(), "date_receipt_cv")?,
        status: payload.status,
    };
    let (rows, total) = state
        .recruitment_service
        .cvs(
            &user,
            payload.recruitment_id,
            &filter,
            payload.current_page,
            payload.row_per_page,
        )
        .await?;

    let cvs = rows
        .into_iter()
        .map(|row| CvItem {
            id: row.id,
            full_name: row.full_name,
            date_receipt_cv: dates::display_date(row.date_receipt_cv),
            media_id: row.media_id,
            media_id_other: row.media_id_other,
            updated_at: row
                .updated_at
                .with_timezone(&dates::business_offset())
                .format(dates::FORMAT_DATE_DISPLAY)
                .to_string(),
            status: row.status_cv,
        })
        .collect();

    Ok(Json(JsonResponse::success(
        "Get cvs successful",
        CvsResponse {
            pagination: Pagination::new(payload.current_page, payload.row_per_page, total),
            cvs,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/recruitment/get-cv",
    request_body = CvIdRequest,
    responses((status = 200, description = "CV with its file", body = CvResponse)),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn get_cv(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CvIdRequest>,
) -> Result<Json<JsonResponse<CvResponse>>> {
    let detail = state.recruitment_service.cv_detail(&user, payload.id).await?;
    let cv = detail.cv;

    Ok(Json(JsonResponse::success(
        "Get cv successful",
        CvResponse {
            recruitment_id: cv.recruitment_id,
            full_name: cv.full_name,
            phone_number: cv.phone_number,
            email: cv.email,
            salary: cv.salary,
            date_receipt_cv: dates::display_date(cv.date_receipt_cv),
            interview_method: cv.interview_method,
            contact_link: cv.contact_link,
            media_id: cv.media_id,
            media_id_other: cv.media_id_other,
            file_name: cv.file_name,
            file_content: detail.file_content,
            file_path: detail.file_path,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/recruitment/update-cv",
    request_body = UpdateCvRequest,
    responses((status = 200, description = "CV updated")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn update_cv(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateCvRequest>,
) -> Result<Json<JsonResponse>> {
    let cv = CvFields::try_from(&payload.cv)?;
    let file = (!payload.file_content.trim().is_empty()).then(|| UploadedFile {
        file_name: &payload.file_name,
        content: &payload.file_content,
    });
    state
        .recruitment_service
        .update_cv(&user, payload.id, payload.recruitment_id, &cv, file)
        .await?;

    Ok(Json(JsonResponse::message("Update cv successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/remove-cv",
    request_body = CvIdRequest,
    responses((status = 200, description = "CV removed")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn remove_cv(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CvIdRequest>,
) -> Result<Json<JsonResponse>> {
    state.recruitment_service.remove_cv(&user, payload.id).await?;

    Ok(Json(JsonResponse::message("Remove cv successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/create-cv-comment",
    request_body = CreateCvCommentRequest,
    responses((status = 200, description = "Comment stored, notifications queued", body = CreatedCvComment)),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn create_cv_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateCvCommentRequest>,
) -> Result<Json<JsonResponse<CreatedCvComment>>> {
    let noti_request_id = state
        .recruitment_service
        .create_comment(
            &user,
            payload.recruitment_id,
            payload.cv_id,
            payload.comment.trim(),
            &payload.receiver,
        )
        .await?;

    Ok(Json(JsonResponse::success(
        "Create comment successful",
        CreatedCvComment { noti_request_id },
    )))
}

#[utoipa::path(
    post,
    path = "/recruitment/edit-cv-comment",
    request_body = EditCvCommentRequest,
    responses((status = 200, description = "Comment edited")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn edit_cv_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<EditCvCommentRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .recruitment_service
        .edit_comment(&user, payload.id, payload.comment.trim())
        .await?;

    Ok(Json(JsonResponse::message("Edit comment successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/get-cv-comments",
    request_body = GetCvCommentsRequest,
    responses((status = 200, description = "Comments of a CV", body = CvCommentsResponse)),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn get_cv_comments(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetCvCommentsRequest>,
) -> Result<Json<JsonResponse<CvCommentsResponse>>> {
    let (job, comments) = state
        .recruitment_service
        .comments(&user, payload.recruitment_id, payload.cv_id)
        .await?;

    let users = state
        .user_repository
        .names_by_org(user.organization_id)
        .await?
        .into_iter()
        .filter(|n| job.is_assignee(n.user_id))
        .map(|n| (n.user_id, n.full_name))
        .collect();
    let avatars = state.recruitment_service.avatars(&job.assignees).await?;

    let comments = comments
        .into_iter()
        .map(|c| CvCommentItem {
            id: c.id,
            comment: c.comment,
            created_by: c.created_by,
            receivers: c.receivers,
            created_at: dates::display_time(c.created_at),
            updated_at: dates::display_time(c.updated_at),
        })
        .collect();

    Ok(Json(JsonResponse::success(
        "Get cv comments successful",
        CvCommentsResponse {
            comments,
            users,
            avatars,
        },
    )))
}

#[utoipa::path(
    post,
    path = "/recruitment/remove-cv-comment",
    request_body = RemoveCvCommentRequest,
    responses((status = 200, description = "Comment deleted")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn remove_cv_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<RemoveCvCommentRequest>,
) -> Result<Json<JsonResponse>> {
    state
        .recruitment_service
        .remove_comment(&user, payload.recruitment_id, payload.id)
        .await?;

    Ok(Json(JsonResponse::message("Remove comment successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/create-log-cv-status",
    request_body = CreateLogCvStatusRequest,
    responses((status = 200, description = "Status change recorded and assignees notified")),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn create_log_cv_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<CreateLogCvStatusRequest>,
) -> Result<Json<JsonResponse>> {
    let update_day = dates::parse_datetime_no_sec(&payload.update_day).ok_or_else(|| invalid_field("update_day"))?;
    state
        .recruitment_service
        .create_status_log(&user, payload.cv_id, payload.status, update_day)
        .await?;

    Ok(Json(JsonResponse::message("Create log cv status successful")))
}

#[utoipa::path(
    post,
    path = "/recruitment/get-log-cv-status",
    request_body = GetLogCvStatusRequest,
    responses((status = 200, description = "Status history of a CV", body = [LogCvStatusItem])),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn get_log_cv_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<GetLogCvStatusRequest>,
) -> Result<Json<JsonResponse<Vec<LogCvStatusItem>>>> {
    let logs = state
        .recruitment_service
        .status_logs(&user, payload.cv_id)
        .await?
        .into_iter()
        .map(|log| LogCvStatusItem {
            datetime_update: log.update_day.format(dates::FORMAT_TIME_DISPLAY).to_string(),
            status: log.status,
        })
        .collect();

    Ok(Json(JsonResponse::success("Get logs cv status successful", logs)))
}

#[utoipa::path(
    post,
    path = "/recruitment/statistic-cv-by-status",
    request_body = RecruitmentIdRequest,
    responses((status = 200, description = "Number of CVs per status", body = [CvStatusCount])),
    tag = "recruitment",
    security(("bearer_auth" = []))
)]
pub async fn statistic_cv_by_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<RecruitmentIdRequest>,
) -> Result<Json<JsonResponse<Vec<CvStatusCount>>>> {
    let counts = state
        .recruitment_service
        .repository()
        .count_cvs_by_status(user.organization_id, payload.recruitment_id)
        .await?;

    Ok(Json(JsonResponse::success("Statistic cv by status successful", counts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cv_payload() -> CvPayload {
        CvPayload {
            full_name: " Nguyen Van A ".into(),
            phone_number: "0901234567".into(),
            email: "a@example.com".into(),
            salary: "1500 USD".into(),
            date_receipt_cv: "2024-03-15".into(),
            interview_method: 1,
            contact_link: String::new(),
            media_id: 2,
            media_id_other: String::new(),
        }
    }

    #[test]
    fn test_cv_payload_conversion() {
        let cv = CvFields::try_from(&cv_payload()).unwrap();
        assert_eq!(cv.full_name, "Nguyen Van A");
        assert_eq!(cv.date_receipt_cv, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_bad_receipt_date_names_the_field() {
        let mut payload = cv_payload();
        payload.date_receipt_cv = "15/03/2024".into();

        let err = CvFields::try_from(&payload).err().unwrap();
        assert!(matches!(err, AppError::BadRequest(m) if m == "Invalid value for field date_receipt_cv"));
    }

    #[test]
    fn test_edit_job_request_leaves_absent_fields_unset() {
        let changes = JobChanges::try_from(EditJobRequest {
            id: 3,
            job_name: None,
            start_date: None,
            expiry_date: Some("2024-12-31".into()),
            branch_ids: None,
            assignees: Some(vec![4, 5]),
        })
        .unwrap();

        assert!(changes.job_name.is_none());
        assert!(changes.start_date.is_none());
        assert_eq!(changes.expiry_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(changes.assignees, Some(vec![4, 5]));
    }

    #[test]
    fn test_create_job_request_requires_valid_dates() {
        let payload = CreateJobRequest {
            job_name: "QA".into(),
            start_date: "2024-13-01".into(),
            expiry_date: "2024-12-31".into(),
            branch_ids: vec![],
            assignees: vec![2],
        };

        let err = NewJob::try_from(&payload).err().unwrap();
        assert!(matches!(err, AppError::BadRequest(m) if m == "Invalid value for field start_date"));
    }
}
