mod smtp;
mod templates;

pub use smtp::SmtpMailer;
pub use templates::{render, MailTemplate};

use crate::error::Result;
use axum::async_trait;

/// Mailbox used to authenticate against the SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub address: String,
    pub password: String,
}

impl MailCredentials {
    /// `None` when either half is missing, which callers treat as "do not send".
    pub fn from_parts(address: &str, password: &str) -> Option<Self> {
        if address.trim().is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            address: address.trim().to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub subject: String,
    pub template: MailTemplate,
    pub content: String,
    pub url: Option<String>,
    pub org_tag: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, credentials: &MailCredentials, mail: &OutgoingMail) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_need_both_halves() {
        assert!(MailCredentials::from_parts("", "pw").is_none());
        assert!(MailCredentials::from_parts("hr@example.com", "").is_none());
        assert_eq!(
            MailCredentials::from_parts(" hr@example.com ", "pw"),
            Some(MailCredentials {
                address: "hr@example.com".into(),
                password: "pw".into()
            })
        );
    }
}
