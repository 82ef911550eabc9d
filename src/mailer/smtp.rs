use super::{render, MailCredentials, MailSender, OutgoingMail};
use crate::error::{AppError, Result};
use axum::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// STARTTLS relay client. A transport is built per send because every
/// organization authenticates with its own mailbox.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    link_base: String,
}

/// Deep links are stored as SPA paths; mail needs them absolute.
fn absolute_link(link_base: &str, url: &str) -> String {
    if url.starts_with('/') {
        format!("{}{}", link_base.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

impl SmtpMailer {
    pub fn new(host: String, port: u16, link_base: String) -> Self {
        Self { host, port, link_base }
    }

    fn build_message(&self, credentials: &MailCredentials, mail: &OutgoingMail) -> Result<Message> {
        let from: Mailbox = credentials
            .address
            .parse()
            .map_err(|e| AppError::Mail(format!("invalid sender {}: {}", credentials.address, e)))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_HTML);

        for recipient in &mail.to {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| AppError::Mail(format!("invalid recipient {}: {}", recipient, e)))?;
            builder = builder.to(mailbox);
        }

        let mut mail = mail.clone();
        mail.url = mail.url.map(|url| absolute_link(&self.link_base, &url));

        builder
            .body(render(&mail))
            .map_err(|e| AppError::Mail(format!("failed to build message: {}", e)))
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, credentials: &MailCredentials, mail: &OutgoingMail) -> Result<()> {
        if mail.to.is_empty() {
            return Ok(());
        }

        let message = self.build_message(credentials, mail)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| AppError::Mail(format!("smtp relay {}: {}", self.host, e)))?
            .port(self.port)
            .credentials(Credentials::new(
                credentials.address.clone(),
                credentials.password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("smtp send failed: {}", e)))?;

        tracing::debug!(subject = %mail.subject, recipients = mail.to.len(), "Mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MailTemplate;

    fn mail(to: Vec<&str>) -> OutgoingMail {
        OutgoingMail {
            to: to.into_iter().map(String::from).collect(),
            subject: "[Notification] Contract extension for An".into(),
            template: MailTemplate::Plain,
            content: "An's contract will expire 2024/05/01.".into(),
            url: None,
            org_tag: Some("ACME".into()),
        }
    }

    fn credentials() -> MailCredentials {
        MailCredentials {
            address: "hr@example.com".into(),
            password: "pw".into(),
        }
    }

    fn mailer() -> SmtpMailer {
        SmtpMailer::new("localhost".into(), 2525, "https://erp.example.com/".into())
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let err = mailer().build_message(&credentials(), &mail(vec!["not an address"])).unwrap_err();
        assert!(matches!(err, AppError::Mail(_)));
    }

    #[test]
    fn test_build_message_accepts_several_recipients() {
        let message = mailer().build_message(&credentials(), &mail(vec!["a@example.com", "b@example.com"]));
        assert!(message.is_ok());
    }

    #[tokio::test]
    async fn test_no_recipients_is_noop() {
        assert!(mailer().send(&credentials(), &mail(vec![])).await.is_ok());
    }

    #[test]
    fn test_relative_links_get_the_spa_base() {
        assert_eq!(
            absolute_link("https://erp.example.com/", "/leave/leave-info?id=3"),
            "https://erp.example.com/leave/leave-info?id=3"
        );
        assert_eq!(absolute_link("https://erp.example.com", "https://x.test/a"), "https://x.test/a");
    }
}
