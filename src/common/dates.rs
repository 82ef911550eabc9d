use chrono::{DateTime, FixedOffset, Months, NaiveDate, NaiveDateTime, Offset, Utc};

pub const FORMAT_DATE_DATABASE: &str = "%Y-%m-%d";
pub const FORMAT_DATE_NO_SEC: &str = "%Y-%m-%d %H:%M";
pub const FORMAT_DATE_DISPLAY: &str = "%Y/%m/%d";
pub const FORMAT_TIME_DISPLAY: &str = "%Y/%m/%d %H:%M";

/// Asia/Ho_Chi_Minh, which has no daylight saving time.
const BUSINESS_UTC_OFFSET_SECS: i32 = 7 * 3600;

pub fn business_offset() -> FixedOffset {
    FixedOffset::east_opt(BUSINESS_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn now_local() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&business_offset())
}

pub fn today() -> NaiveDate {
    now_local().date_naive()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), FORMAT_DATE_DATABASE).ok()
}

pub fn parse_datetime_no_sec(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), FORMAT_DATE_NO_SEC).ok()
}

/// Parses an optional date field; an empty string means "not set".
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, ()> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some).ok_or(()),
    }
}

pub fn display_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format(FORMAT_DATE_DISPLAY).to_string())
        .unwrap_or_default()
}

/// `YYYY/MM/DD HH:MM` in business time.
pub fn display_time(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&business_offset())
        .format(FORMAT_TIME_DISPLAY)
        .to_string()
}

pub fn database_date(value: NaiveDate) -> String {
    value.format(FORMAT_DATE_DATABASE).to_string()
}

pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_time_is_in_business_time() {
        let utc = DateTime::parse_from_rfc3339("2024-03-01T20:15:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(display_time(utc), "2024/03/02 03:15");
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None), Ok(None));
        assert_eq!(parse_optional_date(Some("")), Ok(None));
        assert_eq!(
            parse_optional_date(Some("2024-02-29")),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29))
        );
        assert!(parse_optional_date(Some("29/02/2024")).is_err());
    }

    #[test]
    fn test_display_date_empty_when_unset() {
        assert_eq!(display_date(None), "");
        assert_eq!(display_date(NaiveDate::from_ymd_opt(2023, 7, 1)), "2023/07/01");
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(add_months(start, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
