use crate::{
    common::roles,
    middleware::CurrentUser,
    storage::folders,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const JOB_ACTIVE: i32 = 1;
pub const JOB_DONE: i32 = 2;

pub const JOB_NOT_FOUND: &str = "Job does not exist";
pub const RECRUITMENT_NOT_FOUND: &str = "Recruitment does not exist";
pub const DETAIL_JOB_NOT_FOUND: &str = "Detailed Job Recruitment does not exist";
pub const CV_NOT_FOUND: &str = "Cv does not exist";
pub const COMMENT_NOT_FOUND: &str = "Comment does not exist";
pub const BRANCH_NOT_FOUND: &str = "Branch does not exist";
pub const NO_PERMISSION: &str = "You dont have permission to do this action";
pub const EXPIRY_BEFORE_START: &str = "Expiry date must be greater start date";

pub const JOB_ASSIGNED_CONTENT: &str = "has added you to a recruiting job";
pub const CV_CREATED_CONTENT: &str = "has added new cv";
pub const COMMENT_ADDED_CONTENT: &str = "added a comment";
pub const CV_STATUS_CONTENT: &str = "has update cv status";

pub const JOB_ASSIGNED_SUBJECT: &str = "【Notification】【Micro erp】Assigned recruitment";
pub const CV_CREATED_SUBJECT: &str = "【Notification】【Micro erp】Create new CV";
pub const COMMENT_ADDED_SUBJECT: &str = "【Notification】【Micro erp】Add a comment to cv";
pub const CV_STATUS_SUBJECT: &str = "【Notification】【Micro erp】Update cv status";

pub const JOB_ASSIGNED_MAIL: &str =
    "Hi there, you have been assigned to a recruiting job. Please click the button below for more information";

/// Mail body wrapping a push body such as `Jane Doe has added new cv`.
pub fn mail_content(body: &str) -> String {
    format!("Hi there, {}. Please click the button below for more information", body)
}

/// Deep link into the recruitment screen.
pub fn recruitment_url(recruitment_id: i32, cv_id: Option<i32>, comment_id: Option<i32>) -> String {
    let mut url = format!("/recruitment/recruitment-details?recruitment_id={}", recruitment_id);
    if let Some(cv_id) = cv_id {
        url.push_str(&format!("&cv_id={}", cv_id));
    }
    if let Some(comment_id) = comment_id {
        url.push_str(&format!("&comment_id={}", comment_id));
    }
    url
}

#[derive(Debug, Clone, FromRow)]
pub struct Recruitment {
    pub id: i32,
    pub organization_id: i32,
    pub job_name: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub branch_ids: Vec<i32>,
    pub assignees: Vec<i32>,
    pub detail_job_file_name: String,
    pub created_at: DateTime<Utc>,
}

impl Recruitment {
    pub fn is_assignee(&self, user_id: i32) -> bool {
        self.assignees.contains(&user_id)
    }

    /// CVs and the job description may be managed by the job's organization,
    /// or by a general manager assigned to it.
    pub fn allows_cv_crud(&self, user: &CurrentUser) -> bool {
        user.organization_id == self.organization_id
            || (roles::is_general_manager(user.role_id) && self.is_assignee(user.user_id))
    }

    /// Managers and above of the job's organization, plus its assignees.
    pub fn allows_view(&self, user: &CurrentUser) -> bool {
        if user.organization_id != self.organization_id {
            return false;
        }
        roles::is_manager_or_above(user.role_id) || self.is_assignee(user.user_id)
    }

    pub fn cv_folder(&self) -> String {
        folders::cvs(self.organization_id, &self.job_name)
    }
}

pub struct NewJob {
    pub job_name: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub branch_ids: Vec<i32>,
    pub assignees: Vec<i32>,
}

/// Fields left `None` keep their stored value.
#[derive(Debug, Default)]
pub struct JobChanges {
    pub job_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub branch_ids: Option<Vec<i32>>,
    pub assignees: Option<Vec<i32>>,
}

impl JobChanges {
    pub fn apply(self, job: &Recruitment) -> NewJob {
        NewJob {
            job_name: self.job_name.unwrap_or_else(|| job.job_name.clone()),
            start_date: self.start_date.unwrap_or(job.start_date),
            expiry_date: self.expiry_date.unwrap_or(job.expiry_date),
            branch_ids: self.branch_ids.unwrap_or_else(|| job.branch_ids.clone()),
            assignees: self.assignees.unwrap_or_else(|| job.assignees.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DetailedJob {
    pub id: i32,
    pub recruitment_id: i32,
    pub amount: i32,
    pub address: Vec<String>,
    pub place: Vec<String>,
    pub role: i32,
    pub gender: i32,
    pub type_of_work: i32,
    pub experience: i32,
    pub salary_type: i32,
    pub salary_from: i32,
    pub salary_to: i32,
    pub profile_recipients: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
}

pub struct DetailedJobFields {
    pub amount: i32,
    pub address: Vec<String>,
    pub place: Vec<String>,
    pub role: i32,
    pub gender: i32,
    pub type_of_work: i32,
    pub experience: i32,
    pub salary_type: i32,
    pub salary_from: i32,
    pub salary_to: i32,
    pub profile_recipients: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Cv {
    pub id: i32,
    pub recruitment_id: i32,
    pub media_id: i32,
    pub media_id_other: String,
    pub file_name: String,
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub salary: String,
    pub date_receipt_cv: Option<NaiveDate>,
    pub interview_method: i32,
    pub contact_link: String,
    pub status_cv: i32,
}

pub struct CvFields {
    pub media_id: i32,
    pub media_id_other: String,
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub salary: String,
    pub date_receipt_cv: NaiveDate,
    pub interview_method: i32,
    pub contact_link: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CvListRow {
    pub id: i32,
    pub full_name: String,
    pub date_receipt_cv: Option<NaiveDate>,
    pub media_id: i32,
    pub media_id_other: String,
    pub status_cv: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CvComment {
    pub id: i32,
    pub cv_id: i32,
    pub created_by: i32,
    pub comment: String,
    pub receivers: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LogCvState {
    pub status: i32,
    pub update_day: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct CvStatusCount {
    pub cv_status: i32,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::roles::{GENERAL_MANAGER_ROLE_ID, MANAGER_ROLE_ID, MEMBER_ROLE_ID};

    fn job() -> Recruitment {
        Recruitment {
            id: 12,
            organization_id: 1,
            job_name: "Rust developer".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            branch_ids: vec![2],
            assignees: vec![7, 9],
            detail_job_file_name: String::new(),
            created_at: Utc::now(),
        }
    }

    fn user(user_id: i32, organization_id: i32, role_id: i32) -> CurrentUser {
        CurrentUser {
            user_id,
            organization_id,
            role_id,
            email: "someone@example.com".into(),
        }
    }

    #[test]
    fn test_cv_crud_is_open_to_the_organization() {
        assert!(job().allows_cv_crud(&user(30, 1, MEMBER_ROLE_ID)));
    }

    #[test]
    fn test_cv_crud_from_outside_needs_assigned_general_manager() {
        assert!(job().allows_cv_crud(&user(7, 2, GENERAL_MANAGER_ROLE_ID)));
        assert!(!job().allows_cv_crud(&user(7, 2, MANAGER_ROLE_ID)));
        assert!(!job().allows_cv_crud(&user(30, 2, GENERAL_MANAGER_ROLE_ID)));
    }

    #[test]
    fn test_view_rules() {
        assert!(job().allows_view(&user(30, 1, GENERAL_MANAGER_ROLE_ID)));
        assert!(job().allows_view(&user(30, 1, MANAGER_ROLE_ID)));
        assert!(job().allows_view(&user(9, 1, MEMBER_ROLE_ID)));
        assert!(!job().allows_view(&user(30, 1, MEMBER_ROLE_ID)));
        assert!(!job().allows_view(&user(9, 2, MANAGER_ROLE_ID)));
    }

    #[test]
    fn test_recruitment_urls() {
        assert_eq!(recruitment_url(12, None, None), "/recruitment/recruitment-details?recruitment_id=12");
        assert_eq!(
            recruitment_url(12, Some(40), Some(3)),
            "/recruitment/recruitment-details?recruitment_id=12&cv_id=40&comment_id=3"
        );
    }

    #[test]
    fn test_cv_folder_follows_job_name() {
        assert_eq!(job().cv_folder(), "cvs/1/Rust_developer");
    }

    #[test]
    fn test_job_changes_keep_untouched_fields() {
        let merged = JobChanges {
            job_name: Some("Senior Rust developer".into()),
            assignees: Some(vec![9]),
            ..Default::default()
        }
        .apply(&job());

        assert_eq!(merged.job_name, "Senior Rust developer");
        assert_eq!(merged.assignees, vec![9]);
        assert_eq!(merged.branch_ids, vec![2]);
        assert_eq!(merged.expiry_date, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
    }

    #[test]
    fn test_mail_content_wraps_body() {
        assert_eq!(
            mail_content("Jane Doe has added new cv"),
            "Hi there, Jane Doe has added new cv. Please click the button below for more information"
        );
    }
}
