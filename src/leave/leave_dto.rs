use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveRequestRequest {
    #[validate(range(min = 1, max = 5))]
    pub leave_request_type_id: i32,
    /// `YYYY-MM-DD HH:MM`
    #[validate(length(min = 1))]
    pub datetime_leave_from: String,
    #[validate(length(min = 1))]
    pub datetime_leave_to: String,
    #[validate(range(min = 1, max = 2))]
    pub subtract_day_off_type_id: i32,
    #[serde(default)]
    pub extra_time: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub email_title: String,
    #[serde(default)]
    pub email_content: String,
    #[serde(default)]
    pub send_to: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetLeaveRequestsRequest {
    pub user_name: Option<String>,
    pub leave_request_type_id: Option<i32>,
    pub branch: Option<i32>,
    /// `YYYY-MM-DD`
    pub datetime_leave_from: Option<String>,
    pub datetime_leave_to: Option<String>,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1))]
    pub row_per_page: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetLeaveHistoryRequest {
    pub id: Option<i32>,
    pub user_id: Option<i32>,
    pub user_name: Option<String>,
    pub datetime_leave_from: Option<String>,
    pub datetime_leave_to: Option<String>,
    pub subtract_day_off_type_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LeaveIdRequest {
    #[validate(range(min = 1))]
    pub id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCalendarEventRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    pub calendar_event_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetLeaveDayStatusRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1970, max = 9999))]
    pub year: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveBonusRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub leave_bonus_type_id: i32,
    #[validate(range(min = 1970, max = 9999))]
    pub year_belong: i32,
    #[serde(default)]
    pub reason: String,
    #[validate(range(min = 0.0))]
    pub hour: f64,
    /// `YYYY-MM-DD`; empty means the grant never expires.
    pub expire_bonus_leave_date: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeaveBonusesRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<CreateLeaveBonusRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetLeaveBonusesRequest {
    pub full_name: Option<String>,
    pub leave_bonus_type_id: Option<i32>,
    pub year: Option<i32>,
    #[serde(default)]
    pub is_deleted: bool,
    #[validate(range(min = 1))]
    pub current_page: i64,
    #[validate(range(min = 1))]
    pub row_per_page: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditLeaveBonusRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[validate(range(min = 1))]
    pub leave_bonus_type_id: i32,
    #[validate(range(min = 1970, max = 9999))]
    pub year_belong: i32,
    #[serde(default)]
    pub reason: String,
    #[validate(range(min = 0.0))]
    pub hour: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveLeaveBonusRequest {
    #[validate(range(min = 1))]
    pub id: i32,
    pub is_deleted: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GetValidLeaveBonusesRequest {
    #[validate(range(min = 1))]
    pub user_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bonus(hour: f64) -> CreateLeaveBonusRequest {
        CreateLeaveBonusRequest {
            user_id: 3,
            leave_bonus_type_id: 1,
            year_belong: 2024,
            reason: "Overtime".into(),
            hour,
            expire_bonus_leave_date: None,
        }
    }

    #[test]
    fn test_bonus_batch_needs_at_least_one_item() {
        let empty = CreateLeaveBonusesRequest { items: vec![] };
        assert!(empty.validate().is_err());

        let one = CreateLeaveBonusesRequest { items: vec![bonus(8.0)] };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_bonus_batch_validates_each_item() {
        let batch = CreateLeaveBonusesRequest {
            items: vec![bonus(8.0), bonus(-1.0)],
        };
        assert!(batch.validate().is_err());
    }
}
