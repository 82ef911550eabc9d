use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

pub const USER_STATUS_ACTIVE: i32 = 1;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub organization_id: i32,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub role_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub user_id: i32,
    pub organization_id: i32,
    pub email: String,
    pub role_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub company_joined_date: Option<NaiveDate>,
    pub contract_expiration_date: Option<NaiveDate>,
    pub branch: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserName {
    pub user_id: i32,
    pub full_name: String,
}

/// Dates the event reminders are computed from.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderProfile {
    pub user_id: i32,
    pub full_name: String,
    pub birthday: Option<NaiveDate>,
    pub company_joined_date: Option<NaiveDate>,
    pub contract_expiration_date: Option<NaiveDate>,
}

/// Fields of a user created by registration.
pub struct NewUser<'a> {
    pub organization_id: i32,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role_id: i32,
    pub first_name: &'a str,
    pub last_name: &'a str,
}
