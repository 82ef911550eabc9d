use super::recruitment_models::{
    Cv, CvComment, CvFields, CvListRow, CvStatusCount, DetailedJob, DetailedJobFields, LogCvState, NewJob,
    Recruitment, JOB_ACTIVE, JOB_DONE,
};
use crate::{
    common::{like_pattern, page_offset, Filters},
    error::Result,
};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;

const JOB_COLUMNS: &str =
    "id, organization_id, job_name, start_date, expiry_date, branch_ids, assignees, detail_job_file_name, created_at";

const DETAIL_JOB_COLUMNS: &str = "id, recruitment_id, amount, address, place, role, gender, type_of_work, experience,
     salary_type, salary_from, salary_to, profile_recipients, email, phone_number, description";

const CV_COLUMNS: &str = "id, recruitment_id, media_id, media_id_other, file_name, full_name, phone_number, email,
     salary, date_receipt_cv, interview_method, contact_link, status_cv";

const COMMENT_COLUMNS: &str = "id, cv_id, created_by, comment, receivers, created_at, updated_at";

#[derive(Debug, Default)]
pub struct JobFilter {
    pub job_name: Option<String>,
    pub job_status: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub branch_id: Option<i32>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Default)]
pub struct CvFilter {
    pub name_applicant: Option<String>,
    pub media_id: Option<i32>,
    pub date_receipt_cv: Option<NaiveDate>,
    pub status: Option<i32>,
}

#[derive(Clone)]
pub struct RecruitmentRepository {
    pool: PgPool,
}

impl RecruitmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_job_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        job: &NewJob,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO recruitments (organization_id, job_name, start_date, expiry_date, branch_ids, assignees)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(organization_id)
        .bind(&job.job_name)
        .bind(job.start_date)
        .bind(job.expiry_date)
        .bind(&job.branch_ids)
        .bind(&job.assignees)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn update_job(&self, organization_id: i32, id: i32, job: &NewJob) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE recruitments
             SET job_name = $3, start_date = $4, expiry_date = $5, branch_ids = $6, assignees = $7,
                 updated_at = NOW()
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(id)
        .bind(&job.job_name)
        .bind(job.start_date)
        .bind(job.expiry_date)
        .bind(&job.branch_ids)
        .bind(&job.assignees)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Looks the job up across organizations; callers apply the access rules.
    pub async fn find_job(&self, id: i32) -> Result<Option<Recruitment>> {
        let job = sqlx::query_as::<_, Recruitment>(&format!(
            "SELECT {} FROM recruitments WHERE id = $1 AND deleted_at IS NULL",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn find_org_job(&self, organization_id: i32, id: i32) -> Result<Option<Recruitment>> {
        Ok(self
            .find_job(id)
            .await?
            .filter(|job| job.organization_id == organization_id))
    }

    /// Newest first. Active jobs run today, done jobs expired before today.
    pub async fn list_jobs(
        &self,
        organization_id: i32,
        filter: &JobFilter,
        today: NaiveDate,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<Recruitment>, i64)> {
        let mut filters = Filters::new();
        filters
            .add("organization_id = {}", organization_id)
            .raw("deleted_at IS NULL");
        if let Some(name) = filter.job_name.as_deref().filter(|v| !v.trim().is_empty()) {
            filters.add("LOWER(job_name) LIKE {}", like_pattern(name));
        }
        match filter.job_status {
            Some(JOB_ACTIVE) => {
                filters
                    .add("start_date <= {}", today)
                    .add("expiry_date >= {}", today);
            }
            Some(JOB_DONE) => {
                filters.add("expiry_date < {}", today);
            }
            _ => {}
        }
        if let Some(expiry) = filter.expiry_date {
            filters.add("expiry_date <= {}", expiry);
        }
        if let Some(branch) = filter.branch_id.filter(|v| *v > 0) {
            filters.add("{} = ANY(branch_ids)", branch);
        }
        if let Some(user_id) = filter.user_id.filter(|v| *v > 0) {
            filters.add("{} = ANY(assignees)", user_id);
        }

        let count_sql = format!("SELECT COUNT(*) FROM recruitments{}", filters.where_sql());
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit = filters.next_index();
        let sql = format!(
            "SELECT {} FROM recruitments{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            JOB_COLUMNS,
            filters.where_sql(),
            limit,
            limit + 1
        );
        let jobs = filters
            .bind_as(sqlx::query_as::<_, Recruitment>(&sql))
            .bind(row_per_page)
            .bind(page_offset(current_page, row_per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((jobs, total))
    }

    /// Soft-deletes the job together with its detailed descriptions.
    pub async fn delete_job_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        id: i32,
    ) -> Result<u64> {
        let removed = sqlx::query(
            "UPDATE recruitments SET deleted_at = NOW(), updated_at = NOW()
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        sqlx::query(
            "UPDATE detailed_job_recruitments SET deleted_at = NOW(), updated_at = NOW()
             WHERE recruitment_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(removed)
    }

    pub async fn update_detail_job_file(&self, id: i32, file_name: &str) -> Result<()> {
        sqlx::query("UPDATE recruitments SET detail_job_file_name = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(file_name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_detail_job(&self, recruitment_id: i32, detail: &DetailedJobFields) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO detailed_job_recruitments
                (recruitment_id, amount, address, place, role, gender, type_of_work, experience, salary_type,
                 salary_from, salary_to, profile_recipients, email, phone_number, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING id",
        )
        .bind(recruitment_id)
        .bind(detail.amount)
        .bind(&detail.address)
        .bind(&detail.place)
        .bind(detail.role)
        .bind(detail.gender)
        .bind(detail.type_of_work)
        .bind(detail.experience)
        .bind(detail.salary_type)
        .bind(detail.salary_from)
        .bind(detail.salary_to)
        .bind(&detail.profile_recipients)
        .bind(&detail.email)
        .bind(&detail.phone_number)
        .bind(&detail.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn find_detail_job(&self, id: i32) -> Result<Option<DetailedJob>> {
        let detail = sqlx::query_as::<_, DetailedJob>(&format!(
            "SELECT {} FROM detailed_job_recruitments WHERE id = $1 AND deleted_at IS NULL",
            DETAIL_JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    pub async fn update_detail_job(&self, id: i32, detail: &DetailedJobFields) -> Result<()> {
        sqlx::query(
            "UPDATE detailed_job_recruitments
             SET amount = $2, address = $3, place = $4, role = $5, gender = $6, type_of_work = $7,
                 experience = $8, salary_type = $9, salary_from = $10, salary_to = $11,
                 profile_recipients = $12, email = $13, phone_number = $14, description = $15,
                 updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(detail.amount)
        .bind(&detail.address)
        .bind(&detail.place)
        .bind(detail.role)
        .bind(detail.gender)
        .bind(detail.type_of_work)
        .bind(detail.experience)
        .bind(detail.salary_type)
        .bind(detail.salary_from)
        .bind(detail.salary_to)
        .bind(&detail.profile_recipients)
        .bind(&detail.email)
        .bind(&detail.phone_number)
        .bind(&detail.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn detail_jobs_of(&self, recruitment_id: i32) -> Result<Vec<DetailedJob>> {
        let details = sqlx::query_as::<_, DetailedJob>(&format!(
            "SELECT {} FROM detailed_job_recruitments
             WHERE recruitment_id = $1 AND deleted_at IS NULL
             ORDER BY id",
            DETAIL_JOB_COLUMNS
        ))
        .bind(recruitment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }

    pub async fn insert_cv_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        recruitment_id: i32,
        file_name: &str,
        cv: &CvFields,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO cvs
                (recruitment_id, media_id, media_id_other, file_name, full_name, phone_number, email, salary,
                 date_receipt_cv, interview_method, contact_link)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(recruitment_id)
        .bind(cv.media_id)
        .bind(&cv.media_id_other)
        .bind(file_name)
        .bind(&cv.full_name)
        .bind(&cv.phone_number)
        .bind(&cv.email)
        .bind(&cv.salary)
        .bind(cv.date_receipt_cv)
        .bind(cv.interview_method)
        .bind(&cv.contact_link)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn find_cv(&self, id: i32) -> Result<Option<Cv>> {
        let cv = sqlx::query_as::<_, Cv>(&format!(
            "SELECT {} FROM cvs WHERE id = $1 AND deleted_at IS NULL",
            CV_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cv)
    }

    /// Most recently touched CVs first.
    pub async fn list_cvs(
        &self,
        recruitment_id: i32,
        filter: &CvFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<CvListRow>, i64)> {
        let mut filters = Filters::new();
        filters
            .add("recruitment_id = {}", recruitment_id)
            .raw("deleted_at IS NULL");
        if let Some(name) = filter.name_applicant.as_deref().filter(|v| !v.trim().is_empty()) {
            filters.add("LOWER(full_name) LIKE {}", like_pattern(name));
        }
        if let Some(media) = filter.media_id.filter(|v| *v > 0) {
            filters.add("media_id = {}", media);
        }
        if let Some(date) = filter.date_receipt_cv {
            filters.add("date_receipt_cv = {}", date);
        }
        if let Some(status) = filter.status.filter(|v| *v > 0) {
            filters.add("status_cv = {}", status);
        }

        let count_sql = format!("SELECT COUNT(*) FROM cvs{}", filters.where_sql());
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit = filters.next_index();
        let sql = format!(
            "SELECT id, full_name, date_receipt_cv, media_id, media_id_other, status_cv, updated_at
             FROM cvs{} ORDER BY updated_at DESC, id DESC LIMIT ${} OFFSET ${}",
            filters.where_sql(),
            limit,
            limit + 1
        );
        let rows = filters
            .bind_as(sqlx::query_as::<_, CvListRow>(&sql))
            .bind(row_per_page)
            .bind(page_offset(current_page, row_per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn update_cv(&self, id: i32, recruitment_id: i32, file_name: &str, cv: &CvFields) -> Result<()> {
        sqlx::query(
            "UPDATE cvs
             SET recruitment_id = $2, file_name = $3, media_id = $4, media_id_other = $5, full_name = $6,
                 phone_number = $7, email = $8, salary = $9, date_receipt_cv = $10, interview_method = $11,
                 contact_link = $12, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(recruitment_id)
        .bind(file_name)
        .bind(cv.media_id)
        .bind(&cv.media_id_other)
        .bind(&cv.full_name)
        .bind(&cv.phone_number)
        .bind(&cv.email)
        .bind(&cv.salary)
        .bind(cv.date_receipt_cv)
        .bind(cv.interview_method)
        .bind(&cv.contact_link)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_cv_status_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: i32,
        status: i32,
    ) -> Result<()> {
        sqlx::query("UPDATE cvs SET status_cv = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn soft_delete_cv(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("UPDATE cvs SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_comment_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        cv_id: i32,
        created_by: i32,
        comment: &str,
        receivers: &[i32],
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO cv_comments (cv_id, created_by, comment, receivers)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(cv_id)
        .bind(created_by)
        .bind(comment)
        .bind(receivers)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn find_comment(&self, id: i32) -> Result<Option<CvComment>> {
        let comment = sqlx::query_as::<_, CvComment>(&format!(
            "SELECT {} FROM cv_comments WHERE id = $1 AND deleted_at IS NULL",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn update_comment(&self, id: i32, comment: &str) -> Result<()> {
        sqlx::query("UPDATE cv_comments SET comment = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(comment)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Oldest first, the order of the conversation.
    pub async fn comments_of(&self, cv_id: i32) -> Result<Vec<CvComment>> {
        let comments = sqlx::query_as::<_, CvComment>(&format!(
            "SELECT {} FROM cv_comments WHERE cv_id = $1 AND deleted_at IS NULL ORDER BY created_at, id",
            COMMENT_COLUMNS
        ))
        .bind(cv_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    pub async fn delete_comment(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cv_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_log_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        cv_id: i32,
        status: i32,
        update_day: NaiveDateTime,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO log_cv_states (cv_id, status, update_day) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(cv_id)
        .bind(status)
        .bind(update_day)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn logs_of(&self, cv_id: i32) -> Result<Vec<LogCvState>> {
        let logs = sqlx::query_as::<_, LogCvState>(
            "SELECT status, update_day FROM log_cv_states
             WHERE cv_id = $1 AND deleted_at IS NULL
             ORDER BY update_day, id",
        )
        .bind(cv_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    pub async fn count_cvs_by_status(&self, organization_id: i32, recruitment_id: i32) -> Result<Vec<CvStatusCount>> {
        let counts = sqlx::query_as::<_, CvStatusCount>(
            "SELECT c.status_cv AS cv_status, COUNT(*) AS amount
             FROM recruitments r
             JOIN cvs c ON c.recruitment_id = r.id
             WHERE r.id = $1 AND r.organization_id = $2 AND c.deleted_at IS NULL
             GROUP BY c.status_cv
             ORDER BY c.status_cv",
        )
        .bind(recruitment_id)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
