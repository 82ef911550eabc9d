use super::{
    recruitment_models::{
        mail_content, recruitment_url, Cv, CvComment, CvFields, CvListRow, DetailedJob, DetailedJobFields, JobChanges,
        LogCvState, NewJob, Recruitment, COMMENT_ADDED_CONTENT, COMMENT_ADDED_SUBJECT, COMMENT_NOT_FOUND, CV_CREATED_CONTENT,
        CV_CREATED_SUBJECT, CV_NOT_FOUND, CV_STATUS_CONTENT, CV_STATUS_SUBJECT, DETAIL_JOB_NOT_FOUND,
        EXPIRY_BEFORE_START, JOB_ASSIGNED_CONTENT, JOB_ASSIGNED_MAIL, JOB_ASSIGNED_SUBJECT, JOB_NOT_FOUND,
        NO_PERMISSION, RECRUITMENT_NOT_FOUND,
    },
    recruitment_repository::{CvFilter, RecruitmentRepository},
};
use crate::{
    error::{AppError, Result},
    mailer::{MailCredentials, MailTemplate},
    middleware::CurrentUser,
    notification::{
        notification_models::{NewEmailNotiRequest, NewNotifications, NEW_NOTIFICATION_TITLE},
        ImmediateDelivery, ImmediateMail, NotificationDispatcher, NotificationRepository,
    },
    organization::OrganizationRepository,
    storage::{folders, timestamped_name, BlobStorage},
    user::UserRepository,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::PgPool;
use std::{collections::BTreeMap, sync::Arc};
use tracing::warn;

/// A base64 file sent along with a CV or a job description.
pub struct UploadedFile<'a> {
    pub file_name: &'a str,
    pub content: &'a str,
}

pub struct JobDetail {
    pub recruitment: Recruitment,
    pub detail_jobs: Vec<DetailedJob>,
    pub detail_job_file_path: String,
}

pub struct CvDetail {
    pub cv: Cv,
    pub file_content: String,
    pub file_path: String,
}

/// What a fan-out told its receivers, reused for the push and the mail.
struct Announcement<'a> {
    receivers: Vec<i32>,
    content: &'a str,
    link: String,
    subject: &'a str,
    mail: Option<String>,
}

fn check_dates(start_date: NaiveDate, expiry_date: NaiveDate) -> Result<()> {
    if start_date > expiry_date {
        return Err(AppError::BadRequest(EXPIRY_BEFORE_START.to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct RecruitmentService {
    db: PgPool,
    repo: RecruitmentRepository,
    users: UserRepository,
    organizations: OrganizationRepository,
    notifications: NotificationRepository,
    dispatcher: NotificationDispatcher,
    storage: Arc<dyn BlobStorage>,
}

impl RecruitmentService {
    pub fn new(
        db: PgPool,
        repo: RecruitmentRepository,
        users: UserRepository,
        organizations: OrganizationRepository,
        notifications: NotificationRepository,
        dispatcher: NotificationDispatcher,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            db,
            repo,
            users,
            organizations,
            notifications,
            dispatcher,
            storage,
        }
    }

    pub fn repository(&self) -> &RecruitmentRepository {
        &self.repo
    }

    async fn job(&self, id: i32, missing: &str) -> Result<Recruitment> {
        self.repo
            .find_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }

    async fn managed_job(&self, user: &CurrentUser, id: i32) -> Result<Recruitment> {
        let job = self.job(id, RECRUITMENT_NOT_FOUND).await?;
        if !job.allows_cv_crud(user) {
            return Err(AppError::Forbidden(NO_PERMISSION.to_string()));
        }
        Ok(job)
    }

    async fn cv(&self, id: i32) -> Result<Cv> {
        self.repo
            .find_cv(id)
            .await?
            .ok_or_else(|| AppError::NotFound(CV_NOT_FOUND.to_string()))
    }

    async fn discard(&self, folder: &str, file_name: &str) {
        if file_name.is_empty() {
            return;
        }
        if let Err(e) = self.storage.delete(folder, file_name).await {
            warn!(folder, file = file_name, "Failed to delete stored file: {}", e);
        }
    }

    /// Push to the receivers of a committed fan-out, then mail them from the
    /// organization mailbox.
    async fn announce(&self, user: &CurrentUser, announcement: Announcement<'_>) -> Result<()> {
        if announcement.receivers.is_empty() {
            return Ok(());
        }
        let sender_name = self.users.full_name(user.user_id).await?.unwrap_or_default();
        let body = format!("{} {}", sender_name, announcement.content).trim().to_string();
        let organization = self.organizations.find_by_id(user.organization_id).await?;

        let mail = organization.map(|org| ImmediateMail {
            credentials: MailCredentials::from_parts(&org.email, &org.email_password),
            subject: announcement.subject.to_string(),
            template: MailTemplate::Recruitment,
            content: announcement.mail.unwrap_or_else(|| mail_content(&body)),
            url: announcement.link.clone(),
            org_tag: org.tag,
        });

        self.dispatcher
            .deliver_now(&ImmediateDelivery {
                receivers: announcement.receivers,
                title: NEW_NOTIFICATION_TITLE.to_string(),
                body,
                link: announcement.link,
                mail,
            })
            .await;

        Ok(())
    }

    /// Avatars of the given users as base64, keyed by user id. Missing files are
    /// logged and left out.
    pub async fn avatars(&self, user_ids: &[i32]) -> Result<BTreeMap<i32, String>> {
        let mut avatars = BTreeMap::new();
        for (user_id, file_name) in self.users.avatars_by_ids(user_ids).await? {
            match self.storage.download(folders::AVATARS, &file_name).await {
                Ok(image) => {
                    avatars.insert(user_id, image);
                }
                Err(e) => warn!(user_id, "Avatar unavailable: {}", e),
            }
        }
        Ok(avatars)
    }

    /// Stores the job and tells its assignees they were added.
    pub async fn create_job(&self, user: &CurrentUser, job: &NewJob) -> Result<i32> {
        check_dates(job.start_date, job.expiry_date)?;

        let mut tx = self.db.begin().await?;
        let id = self.repo.insert_job_with_tx(&mut tx, user.organization_id, job).await?;
        let link = recruitment_url(id, None, None);
        let receivers = self
            .notifications
            .insert_notifications_with_tx(
                &mut tx,
                &NewNotifications {
                    organization_id: user.organization_id,
                    sender: user.user_id,
                    receivers: &job.assignees,
                    title: NEW_NOTIFICATION_TITLE,
                    content: JOB_ASSIGNED_CONTENT,
                    redirect_url: &link,
                    noti_request_id: None,
                },
            )
            .await?;
        tx.commit().await?;

        self.announce(
            user,
            Announcement {
                receivers,
                content: JOB_ASSIGNED_CONTENT,
                link,
                subject: JOB_ASSIGNED_SUBJECT,
                mail: Some(JOB_ASSIGNED_MAIL.to_string()),
            },
        )
        .await?;

        Ok(id)
    }

    pub async fn edit_job(&self, user: &CurrentUser, id: i32, changes: JobChanges) -> Result<()> {
        if let (Some(start), Some(expiry)) = (changes.start_date, changes.expiry_date) {
            check_dates(start, expiry)?;
        }
        let job = self
            .repo
            .find_org_job(user.organization_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(JOB_NOT_FOUND.to_string()))?;

        let merged = changes.apply(&job);
        check_dates(merged.start_date, merged.expiry_date)?;
        self.repo.update_job(user.organization_id, id, &merged).await?;

        Ok(())
    }

    pub async fn job_detail(&self, user: &CurrentUser, id: i32) -> Result<JobDetail> {
        let recruitment = self.job(id, JOB_NOT_FOUND).await?;
        if !recruitment.allows_view(user) {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to view job".to_string(),
            ));
        }

        let detail_jobs = self.repo.detail_jobs_of(id).await?;
        let detail_job_file_path = if recruitment.detail_job_file_name.is_empty() {
            String::new()
        } else {
            self.storage.public_url(
                &folders::detail_jobs(recruitment.organization_id),
                &recruitment.detail_job_file_name,
            )
        };

        Ok(JobDetail {
            recruitment,
            detail_jobs,
            detail_job_file_path,
        })
    }

    pub async fn remove_job(&self, organization_id: i32, id: i32) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let removed = self.repo.delete_job_with_tx(&mut tx, organization_id, id).await?;
        if removed == 0 {
            return Err(AppError::NotFound(JOB_NOT_FOUND.to_string()));
        }
        tx.commit().await?;

        Ok(())
    }

    pub async fn create_detail_job(
        &self,
        user: &CurrentUser,
        recruitment_id: i32,
        detail: &DetailedJobFields,
    ) -> Result<i32> {
        self.managed_job(user, recruitment_id).await?;
        self.repo.insert_detail_job(recruitment_id, detail).await
    }

    pub async fn update_detail_job(&self, user: &CurrentUser, id: i32, detail: &DetailedJobFields) -> Result<()> {
        let existing = self
            .repo
            .find_detail_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound(DETAIL_JOB_NOT_FOUND.to_string()))?;
        self.managed_job(user, existing.recruitment_id).await?;

        self.repo.update_detail_job(id, detail).await
    }

    /// Replaces the job description file of a job.
    pub async fn upload_detail_job_file(
        &self,
        user: &CurrentUser,
        recruitment_id: i32,
        file: UploadedFile<'_>,
    ) -> Result<String> {
        let job = self.managed_job(user, recruitment_id).await?;
        let folder = folders::detail_jobs(job.organization_id);
        let file_name = timestamped_name(file.file_name, Utc::now().timestamp_millis());
        self.storage.upload(&folder, &file_name, file.content).await?;

        if let Err(e) = self.repo.update_detail_job_file(recruitment_id, &file_name).await {
            self.discard(&folder, &file_name).await;
            return Err(e);
        }
        self.discard(&folder, &job.detail_job_file_name).await;

        Ok(file_name)
    }

    /// The job description as base64, `None` when the job has none.
    pub async fn detail_job_file(&self, user: &CurrentUser, recruitment_id: i32) -> Result<Option<String>> {
        let job = self.managed_job(user, recruitment_id).await?;
        if job.detail_job_file_name.is_empty() {
            return Ok(None);
        }
        let content = self
            .storage
            .download(&folders::detail_jobs(job.organization_id), &job.detail_job_file_name)
            .await?;

        Ok(Some(content))
    }

    pub async fn remove_detail_job_file(&self, user: &CurrentUser, recruitment_id: i32) -> Result<()> {
        let job = self.managed_job(user, recruitment_id).await?;
        if job.detail_job_file_name.is_empty() {
            return Ok(());
        }
        self.storage
            .delete(&folders::detail_jobs(job.organization_id), &job.detail_job_file_name)
            .await?;

        self.repo.update_detail_job_file(recruitment_id, "").await
    }

    /// Uploads the CV into the job's folder, stores it and tells the assignees.
    pub async fn create_cv(
        &self,
        user: &CurrentUser,
        recruitment_id: i32,
        cv: &CvFields,
        file: UploadedFile<'_>,
    ) -> Result<i32> {
        let job = self.managed_job(user, recruitment_id).await?;
        let folder = job.cv_folder();
        let file_name = timestamped_name(file.file_name, Utc::now().timestamp_millis());
        self.storage.upload(&folder, &file_name, file.content).await?;

        let stored = async {
            let mut tx = self.db.begin().await?;
            let id = self
                .repo
                .insert_cv_with_tx(&mut tx, recruitment_id, &file_name, cv)
                .await?;
            let link = recruitment_url(recruitment_id, Some(id), None);
            let receivers = self
                .notifications
                .insert_notifications_with_tx(
                    &mut tx,
                    &NewNotifications {
                        organization_id: user.organization_id,
                        sender: user.user_id,
                        receivers: &job.assignees,
                        title: NEW_NOTIFICATION_TITLE,
                        content: CV_CREATED_CONTENT,
                        redirect_url: &link,
                        noti_request_id: None,
                    },
                )
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>((id, link, receivers))
        }
        .await;

        let (id, link, receivers) = match stored {
            Ok(stored) => stored,
            Err(e) => {
                self.discard(&folder, &file_name).await;
                return Err(e);
            }
        };

        self.announce(
            user,
            Announcement {
                receivers,
                content: CV_CREATED_CONTENT,
                link,
                subject: CV_CREATED_SUBJECT,
                mail: None,
            },
        )
        .await?;

        Ok(id)
    }

    pub async fn cvs(
        &self,
        user: &CurrentUser,
        recruitment_id: i32,
        filter: &CvFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<CvListRow>, i64)> {
        let job = self.job(recruitment_id, RECRUITMENT_NOT_FOUND).await?;
        if !job.allows_view(user) {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to get cvs".to_string(),
            ));
        }

        self.repo
            .list_cvs(recruitment_id, filter, current_page, row_per_page)
            .await
    }

    pub async fn cv_detail(&self, user: &CurrentUser, id: i32) -> Result<CvDetail> {
        let cv = self.cv(id).await?;
        let job = self.job(cv.recruitment_id, RECRUITMENT_NOT_FOUND).await?;
        if !job.allows_cv_crud(user) {
            return Err(AppError::Forbidden(
                "You dont have permission to view detail of this CV".to_string(),
            ));
        }

        let folder = job.cv_folder();
        let (file_content, file_path) = if cv.file_name.is_empty() {
            (String::new(), String::new())
        } else {
            (
                self.storage.download(&folder, &cv.file_name).await?,
                self.storage.public_url(&folder, &cv.file_name),
            )
        };

        Ok(CvDetail {
            cv,
            file_content,
            file_path,
        })
    }

    /// Updates the CV, possibly moving it to another job. A new file replaces the
    /// old one, which is deleted once the row points at the new file.
    pub async fn update_cv(
        &self,
        user: &CurrentUser,
        id: i32,
        recruitment_id: i32,
        cv: &CvFields,
        file: Option<UploadedFile<'_>>,
    ) -> Result<()> {
        let existing = self.cv(id).await?;
        let old_job = self.job(existing.recruitment_id, RECRUITMENT_NOT_FOUND).await?;
        if !old_job.allows_cv_crud(user) {
            return Err(AppError::Forbidden(NO_PERMISSION.to_string()));
        }
        let new_job = if recruitment_id == old_job.id {
            old_job.clone()
        } else {
            self.job(recruitment_id, RECRUITMENT_NOT_FOUND).await?
        };

        let Some(file) = file.filter(|f| !f.content.trim().is_empty()) else {
            return self
                .repo
                .update_cv(id, recruitment_id, &existing.file_name, cv)
                .await;
        };

        let folder = new_job.cv_folder();
        let file_name = timestamped_name(file.file_name, Utc::now().timestamp_millis());
        self.storage.upload(&folder, &file_name, file.content).await?;
        if let Err(e) = self.repo.update_cv(id, recruitment_id, &file_name, cv).await {
            self.discard(&folder, &file_name).await;
            return Err(e);
        }
        self.discard(&old_job.cv_folder(), &existing.file_name).await;

        Ok(())
    }

    pub async fn remove_cv(&self, user: &CurrentUser, id: i32) -> Result<()> {
        let cv = self.cv(id).await?;
        self.managed_job(user, cv.recruitment_id).await?;
        self.repo.soft_delete_cv(id).await?;

        Ok(())
    }

    /// Stores the comment and queues its notifications under a new request in
    /// INITIAL; the client triggers delivery with the returned request id.
    pub async fn create_comment(
        &self,
        user: &CurrentUser,
        recruitment_id: i32,
        cv_id: i32,
        comment: &str,
        receivers: &[i32],
    ) -> Result<i32> {
        let job = self.job(recruitment_id, RECRUITMENT_NOT_FOUND).await?;
        let cv = self.cv(cv_id).await?;
        if cv.recruitment_id != job.id {
            return Err(AppError::NotFound(CV_NOT_FOUND.to_string()));
        }
        if !job.is_assignee(user.user_id) {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to create comment. Check assignees again".to_string(),
            ));
        }

        let sender_name = self.users.full_name(user.user_id).await?.unwrap_or_default();
        let body = format!("{} {}", sender_name, COMMENT_ADDED_CONTENT).trim().to_string();

        let mut tx = self.db.begin().await?;
        let comment_id = self
            .repo
            .insert_comment_with_tx(&mut tx, cv_id, user.user_id, comment, receivers)
            .await?;
        let noti_request_id = self.notifications.create_noti_request_with_tx(&mut tx).await?;
        let link = recruitment_url(recruitment_id, Some(cv_id), Some(comment_id));
        let notified = self
            .notifications
            .insert_notifications_with_tx(
                &mut tx,
                &NewNotifications {
                    organization_id: user.organization_id,
                    sender: user.user_id,
                    receivers,
                    title: NEW_NOTIFICATION_TITLE,
                    content: COMMENT_ADDED_CONTENT,
                    redirect_url: &link,
                    noti_request_id: Some(noti_request_id),
                },
            )
            .await?;
        self.notifications
            .create_email_noti_request_with_tx(
                &mut tx,
                &NewEmailNotiRequest {
                    noti_request_id,
                    organization_id: user.organization_id,
                    sender: user.user_id,
                    to_user_ids: &notified,
                    subject: COMMENT_ADDED_SUBJECT,
                    content: &mail_content(&body),
                    url: &link,
                    template: MailTemplate::Recruitment,
                },
            )
            .await?;
        tx.commit().await?;

        Ok(noti_request_id)
    }

    pub async fn edit_comment(&self, user: &CurrentUser, id: i32, comment: &str) -> Result<()> {
        let existing = self
            .repo
            .find_comment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(COMMENT_NOT_FOUND.to_string()))?;
        if existing.created_by != user.user_id {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to edit this comment".to_string(),
            ));
        }

        self.repo.update_comment(id, comment).await
    }

    /// Comments of a CV together with the job they were posted under.
    pub async fn comments(
        &self,
        user: &CurrentUser,
        recruitment_id: i32,
        cv_id: i32,
    ) -> Result<(Recruitment, Vec<CvComment>)> {
        let job = self.job(recruitment_id, RECRUITMENT_NOT_FOUND).await?;
        if !job.allows_view(user) {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to get cvs".to_string(),
            ));
        }
        let comments = self.repo.comments_of(cv_id).await?;

        Ok((job, comments))
    }

    pub async fn remove_comment(&self, user: &CurrentUser, recruitment_id: i32, id: i32) -> Result<()> {
        let job = self.job(recruitment_id, RECRUITMENT_NOT_FOUND).await?;
        if !job.is_assignee(user.user_id) {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to remove comment".to_string(),
            ));
        }
        if self.repo.delete_comment(id).await? == 0 {
            return Err(AppError::NotFound(COMMENT_NOT_FOUND.to_string()));
        }

        Ok(())
    }

    pub async fn status_logs(&self, user: &CurrentUser, cv_id: i32) -> Result<Vec<LogCvState>> {
        let cv = self.cv(cv_id).await?;
        let job = self.job(cv.recruitment_id, RECRUITMENT_NOT_FOUND).await?;
        if !job.allows_view(user) {
            return Err(AppError::MethodNotAllowed(
                "You do not have permission to get cvs".to_string(),
            ));
        }

        self.repo.logs_of(cv_id).await
    }

    /// Records the status change, moves the CV to it and tells the assignees.
    pub async fn create_status_log(
        &self,
        user: &CurrentUser,
        cv_id: i32,
        status: i32,
        update_day: NaiveDateTime,
    ) -> Result<()> {
        let cv = self.cv(cv_id).await?;
        let job = self.managed_job(user, cv.recruitment_id).await?;

        let mut tx = self.db.begin().await?;
        self.repo.insert_log_with_tx(&mut tx, cv_id, status, update_day).await?;
        let link = recruitment_url(job.id, Some(cv_id), None);
        let receivers = self
            .notifications
            .insert_notifications_with_tx(
                &mut tx,
                &NewNotifications {
                    organization_id: user.organization_id,
                    sender: user.user_id,
                    receivers: &job.assignees,
                    title: NEW_NOTIFICATION_TITLE,
                    content: CV_STATUS_CONTENT,
                    redirect_url: &link,
                    noti_request_id: None,
                },
            )
            .await?;
        self.repo.update_cv_status_with_tx(&mut tx, cv_id, status).await?;
        tx.commit().await?;

        self.announce(
            user,
            Announcement {
                receivers,
                content: CV_STATUS_CONTENT,
                link,
                subject: CV_STATUS_SUBJECT,
                mail: None,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::roles::MEMBER_ROLE_ID,
        mailer::MockMailSender,
        notification::{
            dispatch::{MockFcmTokenStore, MockNotiRequestStore, MockUserDirectory},
            push::MockPushSender,
        },
        storage::MockBlobStorage,
    };

    fn service(storage: MockBlobStorage) -> RecruitmentService {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let dispatcher = NotificationDispatcher::new(
            Arc::new(MockNotiRequestStore::new()),
            Arc::new(MockFcmTokenStore::new()),
            Arc::new(MockPushSender::new()),
            Arc::new(MockUserDirectory::new()),
            Arc::new(MockMailSender::new()),
        );
        RecruitmentService::new(
            pool.clone(),
            RecruitmentRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            OrganizationRepository::new(pool.clone()),
            NotificationRepository::new(pool),
            dispatcher,
            Arc::new(storage),
        )
    }

    fn user() -> CurrentUser {
        CurrentUser {
            user_id: 4,
            organization_id: 1,
            role_id: MEMBER_ROLE_ID,
            email: "member@example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_job_expiring_before_start_is_rejected() {
        let job = NewJob {
            job_name: "Tester".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            branch_ids: vec![1],
            assignees: vec![2],
        };

        let result = service(MockBlobStorage::new()).create_job(&user(), &job).await;

        assert!(matches!(result, Err(AppError::BadRequest(m)) if m == EXPIRY_BEFORE_START));
    }

    #[tokio::test]
    async fn test_edit_with_inverted_dates_is_rejected_before_lookup() {
        let changes = JobChanges {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 2),
            expiry_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..Default::default()
        };

        let result = service(MockBlobStorage::new()).edit_job(&user(), 3, changes).await;

        assert!(matches!(result, Err(AppError::BadRequest(m)) if m == EXPIRY_BEFORE_START));
    }

    #[test]
    fn test_same_day_job_is_allowed() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert!(check_dates(day, day).is_ok());
    }
}
