use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

pub const REGISTRATION_CODE_LENGTH: usize = 32;
pub const REGISTRATION_CODE_TTL_HOURS: i64 = 24;
pub const REGISTER_SUCCESSFUL_SUBJECT: &str = "Micro Erp Successful Register";

#[derive(Debug, Clone, FromRow)]
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub tag: String,
    pub description: String,
    pub phone_number: String,
    pub email: String,
    pub email_password: String,
    pub setting_step: i32,
    pub expiration_reset_day_off: i32,
    pub language_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrganizationSummary {
    pub id: i32,
    pub tag: String,
    pub name: String,
}

impl From<&Organization> for OrganizationSummary {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            tag: org.tag.clone(),
            name: org.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OrganizationListItem {
    pub id: i32,
    pub name: String,
    pub tag: String,
    pub description: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationSetting {
    pub email: String,
    pub expiration_reset_day_off: i32,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Branch {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct RegistrationCode {
    pub id: i32,
    pub registration_request_id: Option<i32>,
    pub email: String,
    pub code: String,
    pub expired_at: DateTime<Utc>,
}

impl RegistrationCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired_at < now
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRequest {
    pub id: i32,
    pub organization_id: Option<i32>,
    pub email: String,
}

/// Upper-cases a tag and checks it is a non-empty ASCII alphanumeric word.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().to_uppercase();
    if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(tag)
    } else {
        None
    }
}

pub fn generate_registration_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REGISTRATION_CODE_LENGTH)
        .map(char::from)
        .collect()
}

pub fn registration_code_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(REGISTRATION_CODE_TTL_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag(" vnlab "), Some("VNLAB".to_string()));
        assert_eq!(normalize_tag("VN-LAB"), None);
        assert_eq!(normalize_tag(""), None);
    }

    #[test]
    fn test_registration_code_shape() {
        let code = generate_registration_code();
        assert_eq!(code.len(), REGISTRATION_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_code_expires_after_a_day() {
        let now = Utc::now();
        let code = RegistrationCode {
            id: 1,
            registration_request_id: None,
            email: "gm@example.com".into(),
            code: "abc".into(),
            expired_at: registration_code_expiry(now),
        };
        assert!(!code.is_expired(now + Duration::hours(23)));
        assert!(code.is_expired(now + Duration::hours(25)));
    }
}
