use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

pub const FULL_DAY: i32 = 1;
pub const MORNING_OFF: i32 = 2;
pub const AFTERNOON_OFF: i32 = 3;
pub const LATE_OR_EARLY: i32 = 4;
pub const GO_OUT: i32 = 5;

pub const SUBTRACT_LEAVE_BALANCE: i32 = 1;
pub const SUBTRACT_SALARY: i32 = 2;

/// Bonus types granted at the start of a year; their expiry follows the
/// organization's reset setting.
pub const OPENING_GRANT_TYPES: [i32; 3] = [1, 2, 8];

pub const HOURS_PER_DAY: f64 = 8.0;

pub const LEAVE_REQUEST_CONTENT: &str = "has just created a leave request";
pub const LEAVE_REQUEST_SUBJECT: &str = "【Notification】【Micro erp】Leave request";

pub fn leave_request_url(id: i32, user_id: i32, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "/hrm/leave/history-user-leave?id={}&user_id={}&date_from={}&date_to={}",
        id,
        user_id,
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
    )
}

pub fn hours_to_days(hours: f64) -> f64 {
    let days = hours / HOURS_PER_DAY;
    // -0.0 == 0.0, so this also clears the sign of a negative zero
    if days == 0.0 {
        0.0
    } else {
        days
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaveDayStatus {
    pub day_used: f64,
    pub day_bonus: f64,
    pub day_remaining: f64,
    pub day_remaining_previous_year: f64,
}

/// Hour sums of one user for a year and the year before.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveHours {
    pub used: f64,
    pub bonus: f64,
    pub remaining: f64,
    pub used_previous: f64,
    pub bonus_previous: f64,
}

impl From<LeaveHours> for LeaveDayStatus {
    fn from(hours: LeaveHours) -> Self {
        Self {
            day_used: hours_to_days(hours.used),
            day_bonus: hours_to_days(hours.bonus),
            day_remaining: hours_to_days(hours.remaining),
            day_remaining_previous_year: hours_to_days(hours.bonus_previous - hours.used_previous),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LeaveRequestRecord {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub leave_request_type_id: i32,
    pub datetime_leave_from: NaiveDateTime,
    pub datetime_leave_to: NaiveDateTime,
    pub subtract_day_off_type_id: i32,
    pub reason: String,
    pub hour: f64,
    pub calendar_event_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LeaveHistoryRecord {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub leave_request_type_id: i32,
    pub datetime_leave_from: NaiveDateTime,
    pub datetime_leave_to: NaiveDateTime,
    pub subtract_day_off_type_id: i32,
    pub hour: f64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LeaveRequestDetail {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub leave_request_type_id: i32,
    pub datetime_leave_from: NaiveDateTime,
    pub datetime_leave_to: NaiveDateTime,
    pub subtract_day_off_type_id: i32,
    pub reason: String,
    pub email_title: String,
    pub email_content: String,
    pub hour: f64,
    pub calendar_event_id: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LeaveBonusRecord {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub leave_bonus_type_id: i32,
    pub year: i32,
    pub reason: String,
    pub hour: f64,
    pub hour_remaining: Option<f64>,
    pub expire_bonus_leave_date: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LeaveBonusDetail {
    pub id: i32,
    pub user_id: i32,
    pub leave_bonus_type_id: i32,
    pub year_belong: i32,
    pub reason: String,
    pub hour: f64,
    pub hour_remaining: Option<f64>,
    pub expire_bonus_leave_date: Option<NaiveDate>,
}

/// Unexpired grant, consumed oldest expiry first.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct ValidLeaveBonus {
    pub id: i32,
    pub hour: f64,
    pub hour_remaining: Option<f64>,
    pub expire_bonus_leave_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ExpiredHours {
    pub user_id: i32,
    pub total_hour: f64,
}

pub struct NewLeaveRequest<'a> {
    pub organization_id: i32,
    pub user_id: i32,
    pub leave_request_type_id: i32,
    pub datetime_leave_from: NaiveDateTime,
    pub datetime_leave_to: NaiveDateTime,
    pub subtract_day_off_type_id: i32,
    pub reason: &'a str,
    pub email_title: &'a str,
    pub email_content: &'a str,
    pub hour: f64,
}

#[derive(Debug, Clone)]
pub struct NewLeaveBonus {
    pub user_id: i32,
    pub leave_bonus_type_id: i32,
    pub year_belong: i32,
    pub reason: String,
    pub hour: f64,
    pub expire_bonus_leave_date: Option<NaiveDate>,
}

/// New `hour_remaining` of each grant touched when `hours` are taken from
/// `grants` in the given order. Hours beyond the total balance are not recorded.
pub fn consume_fifo(grants: &[ValidLeaveBonus], hours: f64) -> Vec<(i32, f64)> {
    let mut left = hours;
    let mut updates = Vec::new();

    for grant in grants {
        if left <= 0.0 {
            break;
        }
        let Some(remaining) = grant.hour_remaining else {
            continue;
        };
        if remaining <= 0.0 {
            continue;
        }
        let taken = remaining.min(left);
        left -= taken;
        updates.push((grant.id, remaining - taken));
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(id: i32, remaining: Option<f64>) -> ValidLeaveBonus {
        ValidLeaveBonus {
            id,
            hour: 16.0,
            hour_remaining: remaining,
            expire_bonus_leave_date: None,
        }
    }

    #[test]
    fn test_leave_request_url() {
        let from = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            leave_request_url(12, 7, from, to),
            "/hrm/leave/history-user-leave?id=12&user_id=7&date_from=2024-03-04&date_to=2024-03-05"
        );
    }

    #[test]
    fn test_hours_to_days() {
        assert_eq!(hours_to_days(40.0), 5.0);
        assert_eq!(hours_to_days(4.0), 0.5);
        assert!(hours_to_days(-0.0).is_sign_positive());
        assert!(hours_to_days(0.0).is_sign_positive());
    }

    #[test]
    fn test_previous_year_balance_without_rows_is_zero() {
        let status = LeaveDayStatus::from(LeaveHours::default());
        assert_eq!(status.day_remaining_previous_year, 0.0);
        assert!(status.day_remaining_previous_year.is_sign_positive());
    }

    #[test]
    fn test_day_status_from_hours() {
        let status = LeaveDayStatus::from(LeaveHours {
            used: 12.0,
            bonus: 96.0,
            remaining: 84.0,
            used_previous: 40.0,
            bonus_previous: 96.0,
        });
        assert_eq!(
            status,
            LeaveDayStatus {
                day_used: 1.5,
                day_bonus: 12.0,
                day_remaining: 10.5,
                day_remaining_previous_year: 7.0,
            }
        );
    }

    #[test]
    fn test_consume_takes_earliest_grant_first() {
        let grants = vec![grant(1, Some(4.0)), grant(2, Some(16.0)), grant(3, Some(8.0))];
        assert_eq!(consume_fifo(&grants, 10.0), vec![(1, 0.0), (2, 10.0)]);
    }

    #[test]
    fn test_consume_skips_empty_and_untracked_grants() {
        let grants = vec![grant(1, None), grant(2, Some(0.0)), grant(3, Some(8.0))];
        assert_eq!(consume_fifo(&grants, 2.0), vec![(3, 6.0)]);
    }

    #[test]
    fn test_consume_beyond_balance_empties_everything() {
        let grants = vec![grant(1, Some(4.0)), grant(2, Some(4.0))];
        assert_eq!(consume_fifo(&grants, 20.0), vec![(1, 0.0), (2, 0.0)]);
        assert!(consume_fifo(&grants, 0.0).is_empty());
    }
}
