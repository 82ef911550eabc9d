use super::{
    leave_models::{AFTERNOON_OFF, FULL_DAY, HOURS_PER_DAY, MORNING_OFF},
    leave_repository::LeaveRepository,
};
use crate::error::Result;
use axum::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

const HALF_DAY_HOURS: f64 = HOURS_PER_DAY / 2.0;

/// Working blocks of a day as `(start_hour, end_hour)`.
const WORKING_BLOCKS: [(u32, u32); 2] = [(8, 12), (13, 17)];

#[derive(Debug, Clone, PartialEq)]
pub struct HourQuery {
    pub leave_request_type_id: i32,
    pub datetime_leave_from: NaiveDateTime,
    pub datetime_leave_to: NaiveDateTime,
    pub extra_time: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveCalendar: Send + Sync {
    async fn leave_hours(&self, organization_id: i32, query: &HourQuery) -> Result<f64>;
}

/// Calendar backed by the organization's `holidays` table.
#[derive(Clone)]
pub struct HolidayCalendar {
    leave: LeaveRepository,
}

impl HolidayCalendar {
    pub fn new(leave: LeaveRepository) -> Self {
        Self { leave }
    }
}

#[async_trait]
impl LeaveCalendar for HolidayCalendar {
    async fn leave_hours(&self, organization_id: i32, query: &HourQuery) -> Result<f64> {
        let holidays = self
            .leave
            .holidays_between(
                organization_id,
                query.datetime_leave_from.date(),
                query.datetime_leave_to.date(),
            )
            .await?;

        Ok(calculate_hours(query, &holidays))
    }
}

fn is_working_day(day: NaiveDate, holidays: &[NaiveDate]) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&day)
}

fn block_overlap_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    WORKING_BLOCKS
        .iter()
        .filter_map(|&(open, close)| {
            let open = NaiveTime::from_hms_opt(open, 0, 0)?;
            let close = NaiveTime::from_hms_opt(close, 0, 0)?;
            let from = start.max(open);
            let to = end.min(close);
            (to > from).then(|| (to - from).num_minutes() as f64 / 60.0)
        })
        .sum()
}

/// Leave hours between two instants, excluding weekends and `holidays`.
pub fn calculate_hours(query: &HourQuery, holidays: &[NaiveDate]) -> f64 {
    let from = query.datetime_leave_from;
    let to = query.datetime_leave_to;

    let mut hours = 0.0;
    if to >= from {
        for day in from.date().iter_days().take_while(|d| *d <= to.date()) {
            if !is_working_day(day, holidays) {
                continue;
            }
            hours += match query.leave_request_type_id {
                FULL_DAY => HOURS_PER_DAY,
                MORNING_OFF | AFTERNOON_OFF => HALF_DAY_HOURS,
                _ => {
                    let start = if day == from.date() { from.time() } else { NaiveTime::MIN };
                    let end = if day == to.date() {
                        to.time()
                    } else {
                        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
                    };
                    block_overlap_hours(start, end)
                }
            };
        }
    }

    let total = ((hours + query.extra_time) * 100.0).round() / 100.0;
    total.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::leave_models::{GO_OUT, LATE_OR_EARLY};

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    fn query(kind: i32, from: NaiveDateTime, to: NaiveDateTime, extra_time: f64) -> HourQuery {
        HourQuery {
            leave_request_type_id: kind,
            datetime_leave_from: from,
            datetime_leave_to: to,
            extra_time,
        }
    }

    #[test]
    fn test_full_week_skips_weekend() {
        // 2024-01-01 is a Monday
        let q = query(FULL_DAY, at("2024-01-01", "08:00"), at("2024-01-07", "17:00"), 0.0);
        assert_eq!(calculate_hours(&q, &[]), 40.0);
    }

    #[test]
    fn test_holidays_are_excluded() {
        let q = query(FULL_DAY, at("2024-01-01", "08:00"), at("2024-01-03", "17:00"), 0.0);
        let holidays = [NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()];
        assert_eq!(calculate_hours(&q, &holidays), 16.0);
    }

    #[test]
    fn test_half_days() {
        let q = query(MORNING_OFF, at("2024-01-05", "08:00"), at("2024-01-05", "12:00"), 0.0);
        assert_eq!(calculate_hours(&q, &[]), 4.0);

        let q = query(AFTERNOON_OFF, at("2024-01-06", "13:00"), at("2024-01-06", "17:00"), 0.0);
        assert_eq!(calculate_hours(&q, &[]), 0.0);
    }

    #[test]
    fn test_partial_leave_counts_working_blocks_only() {
        let q = query(LATE_OR_EARLY, at("2024-01-02", "08:00"), at("2024-01-02", "09:30"), 0.0);
        assert_eq!(calculate_hours(&q, &[]), 1.5);

        let q = query(GO_OUT, at("2024-01-02", "11:00"), at("2024-01-02", "14:00"), 0.0);
        assert_eq!(calculate_hours(&q, &[]), 2.0);
    }

    #[test]
    fn test_partial_leave_across_days() {
        let q = query(GO_OUT, at("2024-01-02", "16:00"), at("2024-01-03", "09:00"), 0.0);
        assert_eq!(calculate_hours(&q, &[]), 2.0);
    }

    #[test]
    fn test_extra_time_is_added_and_result_never_negative() {
        let q = query(LATE_OR_EARLY, at("2024-01-02", "08:00"), at("2024-01-02", "08:20"), 0.25);
        assert_eq!(calculate_hours(&q, &[]), 0.58);

        let q = query(LATE_OR_EARLY, at("2024-01-02", "08:00"), at("2024-01-02", "08:30"), -2.0);
        assert_eq!(calculate_hours(&q, &[]), 0.0);
    }
}
