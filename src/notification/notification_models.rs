use crate::mailer::MailTemplate;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const NOTIFICATION_STATUS_UNREAD: i32 = 1;
pub const NOTIFICATION_STATUS_READ: i32 = 2;
pub const NOTIFICATION_STATUS_SEEN: i32 = 3;

/// Push title of notifications raised by day-to-day activity.
pub const NEW_NOTIFICATION_TITLE: &str = "Micro Erp New Notification";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotiRequestStatus {
    Initial,
    Processing,
    Succeeded,
    Failed,
}

impl NotiRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NotiRequestStatus::Initial => "INITIAL",
            NotiRequestStatus::Processing => "PROCESSING",
            NotiRequestStatus::Succeeded => "SUCCEEDED",
            NotiRequestStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INITIAL" => Some(NotiRequestStatus::Initial),
            "PROCESSING" => Some(NotiRequestStatus::Processing),
            "SUCCEEDED" => Some(NotiRequestStatus::Succeeded),
            "FAILED" => Some(NotiRequestStatus::Failed),
            _ => None,
        }
    }

    /// Only fresh or failed requests may be claimed by a dispatcher.
    pub fn is_dispatchable(self) -> bool {
        matches!(self, NotiRequestStatus::Initial | NotiRequestStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotiRequest {
    pub id: i32,
    pub status: NotiRequestStatus,
}

#[derive(Debug, FromRow)]
pub(crate) struct NotiRequestRow {
    pub id: i32,
    pub status: String,
}

/// Notification of a request, with the sender's display name.
#[derive(Debug, Clone, FromRow)]
pub struct RequestNotification {
    pub id: i32,
    pub sender: i32,
    pub sender_name: String,
    pub receiver: i32,
    pub title: String,
    pub content: String,
    pub redirect_url: String,
}

/// Email fan-out of a request joined with the sending organization's mailbox.
#[derive(Debug, Clone, FromRow)]
pub struct EmailNotiRequestRecord {
    pub id: i32,
    pub sender: i32,
    pub to_user_ids: Vec<i32>,
    pub subject: String,
    pub content: String,
    pub url: String,
    pub template: String,
    pub email: String,
    pub email_password: String,
    pub org_tag: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRecord {
    pub id: i32,
    pub sender: String,
    pub content: String,
    pub status: i32,
    pub redirect_url: String,
    pub created_at: DateTime<Utc>,
    pub avatar_sender: Option<String>,
}

/// One notification per receiver, written inside the caller's transaction.
pub struct NewNotifications<'a> {
    pub organization_id: i32,
    pub sender: i32,
    pub receivers: &'a [i32],
    pub title: &'a str,
    pub content: &'a str,
    pub redirect_url: &'a str,
    pub noti_request_id: Option<i32>,
}

pub struct NewEmailNotiRequest<'a> {
    pub noti_request_id: i32,
    pub organization_id: i32,
    pub sender: i32,
    pub to_user_ids: &'a [i32],
    pub subject: &'a str,
    pub content: &'a str,
    pub url: &'a str,
    pub template: MailTemplate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatchable_states() {
        assert!(NotiRequestStatus::Initial.is_dispatchable());
        assert!(NotiRequestStatus::Failed.is_dispatchable());
        assert!(!NotiRequestStatus::Processing.is_dispatchable());
        assert!(!NotiRequestStatus::Succeeded.is_dispatchable());
    }

    #[test]
    fn test_status_text_matches_column_values() {
        for status in [
            NotiRequestStatus::Initial,
            NotiRequestStatus::Processing,
            NotiRequestStatus::Succeeded,
            NotiRequestStatus::Failed,
        ] {
            assert_eq!(NotiRequestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(NotiRequestStatus::parse("SUCCEED"), None);
    }
}
