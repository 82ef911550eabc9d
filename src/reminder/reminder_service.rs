use super::reminder_models::{
    due_mails, MailContext, ReminderLists, BIRTHDAY_LEAD_DAYS, PREVIEW_BIRTHDAY_LEAD_DAYS,
};
use crate::{
    common::{dates, labels::Language},
    error::Result,
    mailer::{MailCredentials, MailSender},
    organization::{organization_models::Organization, OrganizationRepository},
    user::user_repository::UserRepository,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ReminderService {
    users: UserRepository,
    organizations: OrganizationRepository,
    mailer: Arc<dyn MailSender>,
    credentials: Option<MailCredentials>,
    notice_email: String,
}

impl ReminderService {
    pub fn new(
        users: UserRepository,
        organizations: OrganizationRepository,
        mailer: Arc<dyn MailSender>,
        credentials: Option<MailCredentials>,
        notice_email: String,
    ) -> Self {
        Self {
            users,
            organizations,
            mailer,
            credentials,
            notice_email,
        }
    }

    /// Upcoming events of an organization, birthdays looked up a month ahead.
    pub async fn preview(&self, organization_id: i32) -> Result<ReminderLists> {
        let profiles = self.users.reminder_profiles(organization_id).await?;
        Ok(ReminderLists::collect(&profiles, dates::today(), PREVIEW_BIRTHDAY_LEAD_DAYS))
    }

    /// Cron entry point: mails today's reminders for every organization.
    pub async fn run(&self) {
        let Some(credentials) = self.credentials.as_ref() else {
            warn!("System mailbox is not configured, event reminders skipped");
            return;
        };

        let organizations = match self.organizations.all().await {
            Ok(organizations) => organizations,
            Err(e) => {
                error!(error = %e, "Could not load organizations for event reminders");
                return;
            }
        };

        for organization in &organizations {
            match self.remind_organization(credentials, organization).await {
                Ok(sent) if sent > 0 => info!(organization_id = organization.id, sent, "Event reminders sent"),
                Ok(_) => {}
                Err(e) => error!(organization_id = organization.id, error = %e, "Event reminders failed"),
            }
        }
    }

    async fn remind_organization(&self, credentials: &MailCredentials, organization: &Organization) -> Result<usize> {
        let today = dates::today();
        let profiles = self.users.reminder_profiles(organization.id).await?;
        let lists = ReminderLists::collect(&profiles, today, BIRTHDAY_LEAD_DAYS);

        let manager_ids = self.users.general_manager_ids(organization.id).await?;
        let manager_emails = self.users.emails_by_ids(&manager_ids).await?;

        let mails = due_mails(
            &lists,
            today,
            &MailContext {
                organization: &organization.name,
                org_tag: &organization.tag,
                language: Language::from_id(organization.language_id),
                notice_email: &self.notice_email,
                manager_emails: &manager_emails,
            },
        );

        let mut sent = 0;
        for mail in &mails {
            match self.mailer.send(credentials, mail).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(subject = %mail.subject, error = %e, "Reminder mail failed"),
            }
        }

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MockMailSender;
    use sqlx::PgPool;

    #[tokio::test]
    async fn test_run_without_mailbox_sends_nothing() {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let mut mailer = MockMailSender::new();
        mailer.expect_send().times(0);

        let service = ReminderService::new(
            UserRepository::new(pool.clone()),
            OrganizationRepository::new(pool),
            Arc::new(mailer),
            None,
            "all@example.com".into(),
        );

        service.run().await;
    }
}
