use super::recruitment_models::DetailedJob;
use crate::common::Pagination;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 255))]
    pub job_name: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub expiry_date: String,
    #[serde(default)]
    pub branch_ids: Vec<i32>,
    #[validate(length(min = 1))]
    pub assignees: Vec<i32>,
}

/// Absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditJobRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(length(min = 1, max = 255))]
    pub job_name: Option<String>,
    pub start_date: Option<String>,
    pub expiry_date: Option<String>,
    pub branch_ids: Option<Vec<i32>>,
    pub assignees: Option<Vec<i32>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetJobsRequest {
    pub job_name: Option<String>,
    /// 1 active, 2 done.
    pub job_status: Option<i32>,
    pub expiry_date: Option<String>,
    pub branch_id: Option<i32>,
    pub user_id: Option<i32>,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1, max = 100))]
    pub row_per_page: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobItem {
    pub id: i32,
    pub job_name: String,
    pub start_date: String,
    pub expiry_date: String,
    pub branch_ids: Vec<i32>,
    pub assignees: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobsResponse {
    pub recruitments: Vec<JobItem>,
    pub branches: BTreeMap<i32, String>,
    pub pagination: Pagination,
    pub users: BTreeMap<i32, String>,
    /// Base64 avatars of the assignees listed on this page.
    pub avatars: BTreeMap<i32, String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JobIdRequest {
    #[validate(range(min = 1))]
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobDetailItem {
    pub id: i32,
    pub job_name: String,
    pub start_date: String,
    pub expiry_date: String,
    pub branch_ids: Vec<i32>,
    pub assignees: Vec<i32>,
    pub detail_job_file_name: String,
    pub detail_job_file_path: String,
    pub detail_jobs: Vec<DetailedJob>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobResponse {
    pub recruitment: JobDetailItem,
    pub branches: BTreeMap<i32, String>,
    pub users: BTreeMap<i32, String>,
    pub avatars: BTreeMap<i32, String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DetailJobPayload {
    #[validate(range(min = 1))]
    pub amount: i32,
    #[serde(default)]
    pub address: Vec<String>,
    #[serde(default)]
    pub place: Vec<String>,
    pub role: i32,
    #[serde(default)]
    pub gender: i32,
    pub type_of_work: i32,
    pub experience: i32,
    pub salary_type: i32,
    #[serde(default)]
    pub salary_from: i32,
    #[serde(default)]
    pub salary_to: i32,
    #[serde(default)]
    pub profile_recipients: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDetailJobRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    #[serde(flatten)]
    #[validate(nested)]
    pub detail: DetailJobPayload,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDetailJobRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[serde(flatten)]
    #[validate(nested)]
    pub detail: DetailJobPayload,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UploadDetailJobFileRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub file_content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecruitmentIdRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileContentResponse {
    pub file_content: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CvPayload {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50))]
    pub phone_number: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub salary: String,
    /// `YYYY-MM-DD`
    pub date_receipt_cv: String,
    #[serde(default)]
    pub interview_method: i32,
    #[serde(default)]
    pub contact_link: String,
    #[serde(default)]
    pub media_id: i32,
    #[serde(default)]
    pub media_id_other: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCvRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    #[serde(flatten)]
    #[validate(nested)]
    pub cv: CvPayload,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    /// Base64 document.
    #[validate(length(min = 1))]
    pub file_content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCvRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    #[serde(flatten)]
    #[validate(nested)]
    pub cv: CvPayload,
    #[serde(default)]
    pub file_name: String,
    /// Replaces the stored file when not empty.
    #[serde(default)]
    pub file_content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetCvsRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    pub name_applicant: Option<String>,
    pub media_id: Option<i32>,
    pub date_receipt_cv: Option<String>,
    pub status: Option<i32>,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1, max = 100))]
    pub row_per_page: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CvItem {
    pub id: i32,
    pub full_name: String,
    pub date_receipt_cv: String,
    pub media_id: i32,
    pub media_id_other: String,
    pub updated_at: String,
    pub status: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CvsResponse {
    pub pagination: Pagination,
    pub cvs: Vec<CvItem>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CvIdRequest {
    #[validate(range(min = 1))]
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CvResponse {
    pub recruitment_id: i32,
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub salary: String,
    pub date_receipt_cv: String,
    pub interview_method: i32,
    pub contact_link: String,
    pub media_id: i32,
    pub media_id_other: String,
    pub file_name: String,
    pub file_content: String,
    pub file_path: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCvCommentRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    #[validate(range(min = 1))]
    pub cv_id: i32,
    #[validate(length(min = 1))]
    pub comment: String,
    #[serde(default)]
    pub receiver: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedCvComment {
    pub noti_request_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditCvCommentRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(length(min = 1))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetCvCommentsRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    #[validate(range(min = 1))]
    pub cv_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CvCommentItem {
    pub id: i32,
    pub comment: String,
    pub created_by: i32,
    pub receivers: Vec<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CvCommentsResponse {
    pub comments: Vec<CvCommentItem>,
    /// Names of the job's assignees.
    pub users: BTreeMap<i32, String>,
    pub avatars: BTreeMap<i32, String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveCvCommentRequest {
    #[validate(range(min = 1))]
    pub recruitment_id: i32,
    #[validate(range(min = 1))]
    pub id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLogCvStatusRequest {
    #[validate(range(min = 1))]
    pub cv_id: i32,
    #[validate(range(min = 1))]
    pub status: i32,
    /// `YYYY-MM-DD HH:MM`
    pub update_day: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetLogCvStatusRequest {
    #[validate(range(min = 1))]
    pub cv_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogCvStatusItem {
    pub datetime_update: String,
    pub status: i32,
}
