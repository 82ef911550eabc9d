use super::{
    notification_models::{EmailNotiRequestRecord, NotiRequest, NotiRequestStatus, RequestNotification},
    push::{PushError, PushSender},
};
use crate::{
    error::{AppError, Result},
    mailer::{MailCredentials, MailSender, MailTemplate, OutgoingMail},
};
use axum::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotiRequestStore: Send + Sync {
    async fn find_request(&self, id: i32) -> Result<Option<NotiRequest>>;

    /// Compare-and-swap of the status column; [`AppError::Conflict`] when the
    /// row was not in `from`.
    async fn swap_status(&self, id: i32, from: NotiRequestStatus, to: NotiRequestStatus) -> Result<()>;

    async fn notifications_of_request(&self, id: i32) -> Result<Vec<RequestNotification>>;

    async fn email_requests_of_request(&self, id: i32) -> Result<Vec<EmailNotiRequestRecord>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FcmTokenStore: Send + Sync {
    async fn tokens_of_users(&self, user_ids: &[i32]) -> Result<Vec<String>>;
    async fn delete_token(&self, token: &str) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn emails_of_users(&self, user_ids: &[i32]) -> Result<Vec<String>>;
}

/// Push plus optional mail sent right away, outside the request lifecycle.
#[derive(Debug, Clone)]
pub struct ImmediateDelivery {
    pub receivers: Vec<i32>,
    pub title: String,
    pub body: String,
    pub link: String,
    pub mail: Option<ImmediateMail>,
}

#[derive(Debug, Clone)]
pub struct ImmediateMail {
    pub credentials: Option<MailCredentials>,
    pub subject: String,
    pub template: MailTemplate,
    pub content: String,
    pub url: String,
    pub org_tag: String,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    requests: Arc<dyn NotiRequestStore>,
    tokens: Arc<dyn FcmTokenStore>,
    push: Arc<dyn PushSender>,
    users: Arc<dyn UserDirectory>,
    mailer: Arc<dyn MailSender>,
}

impl NotificationDispatcher {
    pub fn new(
        requests: Arc<dyn NotiRequestStore>,
        tokens: Arc<dyn FcmTokenStore>,
        push: Arc<dyn PushSender>,
        users: Arc<dyn UserDirectory>,
        mailer: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            requests,
            tokens,
            push,
            users,
            mailer,
        }
    }

    /// Claims a notification request and delivers its pushes and mails.
    ///
    /// The request moves `INITIAL|FAILED -> PROCESSING` through a
    /// compare-and-swap, then ends in `SUCCEEDED`, or in `FAILED` when the
    /// recipients or mails could not be gathered.
    pub async fn dispatch(&self, id: i32) -> Result<()> {
        let request = self
            .requests
            .find_request(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification request does not exist".to_string()))?;

        if !request.status.is_dispatchable() {
            return Err(AppError::BadRequest(
                "That notification request was not INITIAL".to_string(),
            ));
        }

        self.requests
            .swap_status(id, request.status, NotiRequestStatus::Processing)
            .await?;

        match self.deliver_request(id).await {
            Ok(()) => {
                // delivery already happened, so a lost final swap is only logged
                match self
                    .requests
                    .swap_status(id, NotiRequestStatus::Processing, NotiRequestStatus::Succeeded)
                    .await
                {
                    Ok(()) => info!(noti_request_id = id, "Notification request succeeded"),
                    Err(e) => error!(noti_request_id = id, "Could not mark request succeeded: {}", e),
                }
                Ok(())
            }
            Err(e) => {
                if let Err(swap_err) = self
                    .requests
                    .swap_status(id, NotiRequestStatus::Processing, NotiRequestStatus::Failed)
                    .await
                {
                    error!(noti_request_id = id, "Could not mark request failed: {}", swap_err);
                }
                Err(AppError::System(format!("System Error: {}", e)))
            }
        }
    }

    async fn deliver_request(&self, id: i32) -> Result<()> {
        let notifications = self.requests.notifications_of_request(id).await?;

        // one request has one sender
        if let Some(first) = notifications.first() {
            let receivers: Vec<i32> = notifications.iter().map(|n| n.receiver).collect();
            let body = format!("{} {}", first.sender_name, first.content);
            self.push_to_users(&receivers, &first.title, &body, &first.redirect_url)
                .await?;
        }

        let email_requests = self.requests.email_requests_of_request(id).await?;
        for email_request in email_requests {
            let Some(credentials) =
                MailCredentials::from_parts(&email_request.email, &email_request.email_password)
            else {
                debug!(email_request_id = email_request.id, "Organization has no mailbox, skipping");
                continue;
            };

            let emails = match self.users.emails_of_users(&email_request.to_user_ids).await {
                Ok(emails) => emails,
                Err(e) => {
                    warn!(email_request_id = email_request.id, "Could not resolve receiver emails: {}", e);
                    continue;
                }
            };
            if emails.is_empty() {
                continue;
            }

            let mail = OutgoingMail {
                to: emails,
                subject: email_request.subject.clone(),
                template: MailTemplate::from_key(&email_request.template),
                content: email_request.content.clone(),
                url: Some(email_request.url.clone()),
                org_tag: Some(email_request.org_tag.clone()),
            };
            if let Err(e) = self.mailer.send(&credentials, &mail).await {
                warn!(email_request_id = email_request.id, "Mail delivery failed: {}", e);
            }
        }

        Ok(())
    }

    /// Token lookup failures propagate; per-token failures are logged and an
    /// invalid token is removed from the store.
    async fn push_to_users(&self, receivers: &[i32], title: &str, body: &str, link: &str) -> Result<()> {
        if receivers.is_empty() {
            return Ok(());
        }

        let tokens = self.tokens.tokens_of_users(receivers).await?;
        for token in tokens {
            match self.push.send(&token, title, body, link).await {
                Ok(()) => {}
                Err(PushError::InvalidToken) => {
                    warn!(token = %token, "Removing invalid push token");
                    if let Err(e) = self.tokens.delete_token(&token).await {
                        warn!(token = %token, "Could not remove push token: {}", e);
                    }
                }
                Err(PushError::Delivery(reason)) => {
                    warn!(token = %token, "Push delivery failed: {}", reason);
                }
            }
        }

        Ok(())
    }

    /// Fire-and-forget delivery used right after a committed write. Nothing
    /// here fails the caller.
    pub async fn deliver_now(&self, delivery: &ImmediateDelivery) {
        if let Err(e) = self
            .push_to_users(&delivery.receivers, &delivery.title, &delivery.body, &delivery.link)
            .await
        {
            warn!("Push fan-out failed: {}", e);
        }

        let Some(mail) = &delivery.mail else {
            return;
        };
        let Some(credentials) = &mail.credentials else {
            debug!("Organization has no mailbox, skipping mail");
            return;
        };

        let emails = match self.users.emails_of_users(&delivery.receivers).await {
            Ok(emails) => emails,
            Err(e) => {
                warn!("Could not resolve receiver emails: {}", e);
                return;
            }
        };
        if emails.is_empty() {
            return;
        }

        let outgoing = OutgoingMail {
            to: emails,
            subject: mail.subject.clone(),
            template: mail.template,
            content: mail.content.clone(),
            url: Some(mail.url.clone()),
            org_tag: Some(mail.org_tag.clone()),
        };
        if let Err(e) = self.mailer.send(credentials, &outgoing).await {
            warn!(subject = %mail.subject, "Mail delivery failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mailer::MockMailSender, notification::push::MockPushSender};
    use mockall::predicate::eq;

    fn notification(sender: i32, receiver: i32) -> RequestNotification {
        RequestNotification {
            id: receiver,
            sender,
            sender_name: "Linh Tran".into(),
            receiver,
            title: "CV comment".into(),
            content: "has just commented on a cv".into(),
            redirect_url: "/recruitment/cv?id=3".into(),
        }
    }

    fn email_request(email: &str, password: &str) -> EmailNotiRequestRecord {
        EmailNotiRequestRecord {
            id: 1,
            sender: 1,
            to_user_ids: vec![2, 3],
            subject: "【Notification】【Micro erp】Comment".into(),
            content: "Linh Tran commented".into(),
            url: "https://erp.example.com/recruitment/cv?id=3".into(),
            template: "recruitment".into(),
            email: email.into(),
            email_password: password.into(),
            org_tag: "ACME".into(),
        }
    }

    fn request(status: NotiRequestStatus) -> Option<NotiRequest> {
        Some(NotiRequest { id: 9, status })
    }

    struct Mocks {
        requests: MockNotiRequestStore,
        tokens: MockFcmTokenStore,
        push: MockPushSender,
        users: MockUserDirectory,
        mailer: MockMailSender,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                requests: MockNotiRequestStore::new(),
                tokens: MockFcmTokenStore::new(),
                push: MockPushSender::new(),
                users: MockUserDirectory::new(),
                mailer: MockMailSender::new(),
            }
        }

        fn build(self) -> NotificationDispatcher {
            NotificationDispatcher::new(
                Arc::new(self.requests),
                Arc::new(self.tokens),
                Arc::new(self.push),
                Arc::new(self.users),
                Arc::new(self.mailer),
            )
        }
    }

    #[tokio::test]
    async fn test_missing_request_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.requests.expect_find_request().returning(|_| Ok(None));
        mocks.requests.expect_swap_status().never();

        let result = mocks.build().dispatch(9).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_processing_request_is_rejected_without_status_change() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Processing)));
        mocks.requests.expect_swap_status().never();

        let result = mocks.build().dispatch(9).await;

        assert!(matches!(result, Err(AppError::BadRequest(m)) if m == "That notification request was not INITIAL"));
    }

    #[tokio::test]
    async fn test_succeeded_request_is_rejected_without_status_change() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Succeeded)));
        mocks.requests.expect_swap_status().never();

        let result = mocks.build().dispatch(9).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_lost_swap_is_conflict() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Initial)));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Initial), eq(NotiRequestStatus::Processing))
            .times(1)
            .returning(|_, _, _| {
                Err(AppError::Conflict("Notification request is being processed".into()))
            });
        mocks.requests.expect_notifications_of_request().never();

        let result = mocks.build().dispatch(9).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_two_receivers_delivered_and_request_succeeds() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Initial)));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Initial), eq(NotiRequestStatus::Processing))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Processing), eq(NotiRequestStatus::Succeeded))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_notifications_of_request()
            .returning(|_| Ok(vec![notification(1, 2), notification(1, 3)]));
        mocks
            .requests
            .expect_email_requests_of_request()
            .returning(|_| Ok(vec![email_request("hr@acme.com", "pw")]));
        mocks
            .tokens
            .expect_tokens_of_users()
            .withf(|ids| ids == [2, 3])
            .returning(|_| Ok(vec!["tok-2".into(), "tok-3".into()]));
        mocks
            .push
            .expect_send()
            .withf(|_, title, body, link| {
                title == "CV comment"
                    && body == "Linh Tran has just commented on a cv"
                    && link == "/recruitment/cv?id=3"
            })
            .times(2)
            .returning(|_, _, _, _| Ok(()));
        mocks
            .users
            .expect_emails_of_users()
            .returning(|_| Ok(vec!["b@acme.com".into(), "c@acme.com".into()]));
        mocks
            .mailer
            .expect_send()
            .withf(|credentials, mail| {
                credentials.address == "hr@acme.com"
                    && mail.to.len() == 2
                    && mail.template == MailTemplate::Recruitment
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let result = mocks.build().dispatch(9).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failed_request_can_be_redispatched() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Failed)));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Failed), eq(NotiRequestStatus::Processing))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Processing), eq(NotiRequestStatus::Succeeded))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_notifications_of_request()
            .returning(|_| Ok(vec![]));
        mocks
            .requests
            .expect_email_requests_of_request()
            .returning(|_| Ok(vec![]));
        mocks.tokens.expect_tokens_of_users().never();

        assert!(mocks.build().dispatch(9).await.is_ok());
    }

    #[tokio::test]
    async fn test_gather_failure_marks_request_failed() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Initial)));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Initial), eq(NotiRequestStatus::Processing))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Processing), eq(NotiRequestStatus::Failed))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_notifications_of_request()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let result = mocks.build().dispatch(9).await;

        assert!(matches!(result, Err(AppError::System(m)) if m.starts_with("System Error: ")));
    }

    #[tokio::test]
    async fn test_invalid_token_is_deleted_and_delivery_errors_are_not_fatal() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Initial)));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Initial), eq(NotiRequestStatus::Processing))
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Processing), eq(NotiRequestStatus::Succeeded))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_notifications_of_request()
            .returning(|_| Ok(vec![notification(1, 2)]));
        mocks
            .requests
            .expect_email_requests_of_request()
            .returning(|_| Ok(vec![email_request("", "")]));
        mocks
            .tokens
            .expect_tokens_of_users()
            .returning(|_| Ok(vec!["stale".into(), "flaky".into()]));
        mocks
            .push
            .expect_send()
            .returning(|token, _, _, _| match token {
                "stale" => Err(PushError::InvalidToken),
                _ => Err(PushError::Delivery("Unavailable".into())),
            });
        mocks
            .tokens
            .expect_delete_token()
            .withf(|token| token == "stale")
            .times(1)
            .returning(|_| Ok(()));
        mocks.users.expect_emails_of_users().never();
        mocks.mailer.expect_send().never();

        assert!(mocks.build().dispatch(9).await.is_ok());
    }

    #[tokio::test]
    async fn test_email_lookup_failure_still_succeeds() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Initial)));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Initial), eq(NotiRequestStatus::Processing))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Processing), eq(NotiRequestStatus::Succeeded))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Processing), eq(NotiRequestStatus::Failed))
            .never();
        mocks
            .requests
            .expect_notifications_of_request()
            .returning(|_| Ok(vec![]));
        mocks
            .requests
            .expect_email_requests_of_request()
            .returning(|_| Ok(vec![email_request("hr@acme.com", "pw")]));
        mocks
            .users
            .expect_emails_of_users()
            .times(1)
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        mocks.mailer.expect_send().never();

        assert!(mocks.build().dispatch(9).await.is_ok());
    }

    #[tokio::test]
    async fn test_lost_final_swap_after_delivery_is_not_an_error() {
        let mut mocks = Mocks::new();
        mocks
            .requests
            .expect_find_request()
            .returning(|_| Ok(request(NotiRequestStatus::Initial)));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Initial), eq(NotiRequestStatus::Processing))
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks
            .requests
            .expect_swap_status()
            .with(eq(9), eq(NotiRequestStatus::Processing), eq(NotiRequestStatus::Succeeded))
            .times(1)
            .returning(|_, _, _| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        mocks
            .requests
            .expect_notifications_of_request()
            .returning(|_| Ok(vec![]));
        mocks
            .requests
            .expect_email_requests_of_request()
            .returning(|_| Ok(vec![]));

        assert!(mocks.build().dispatch(9).await.is_ok());
    }

    #[tokio::test]
    async fn test_deliver_now_skips_mail_without_mailbox() {
        let mut mocks = Mocks::new();
        mocks
            .tokens
            .expect_tokens_of_users()
            .returning(|_| Ok(vec!["tok".into()]));
        mocks.push.expect_send().times(1).returning(|_, _, _, _| Ok(()));
        mocks.users.expect_emails_of_users().never();
        mocks.mailer.expect_send().never();

        mocks
            .build()
            .deliver_now(&ImmediateDelivery {
                receivers: vec![4],
                title: "Recruitment".into(),
                body: "Linh Tran has added you to a recruiting job".into(),
                link: "/recruitment/job?id=1".into(),
                mail: Some(ImmediateMail {
                    credentials: None,
                    subject: "【Notification】【Micro erp】Assigned recruitment".into(),
                    template: MailTemplate::Recruitment,
                    content: "Linh Tran has added you to a recruiting job".into(),
                    url: "https://erp.example.com/recruitment/job?id=1".into(),
                    org_tag: "ACME".into(),
                }),
            })
            .await;
    }

    #[tokio::test]
    async fn test_deliver_now_swallows_mail_failure() {
        let mut mocks = Mocks::new();
        mocks.tokens.expect_tokens_of_users().returning(|_| Ok(vec![]));
        mocks
            .users
            .expect_emails_of_users()
            .returning(|_| Ok(vec!["gm@acme.com".into()]));
        mocks
            .mailer
            .expect_send()
            .times(1)
            .returning(|_, _| Err(AppError::Mail("relay down".into())));

        mocks
            .build()
            .deliver_now(&ImmediateDelivery {
                receivers: vec![1],
                title: "Asset".into(),
                body: "An has just created a asset request".into(),
                link: "/hrm/asset/manage-asset-request?id=5".into(),
                mail: Some(ImmediateMail {
                    credentials: MailCredentials::from_parts("hr@acme.com", "pw"),
                    subject: "Asset request".into(),
                    template: MailTemplate::Plain,
                    content: "An has just created a asset request".into(),
                    url: "https://erp.example.com/hrm/asset/manage-asset-request?id=5".into(),
                    org_tag: "ACME".into(),
                }),
            })
            .await;
    }
}
