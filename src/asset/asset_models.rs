use crate::common::dates::{add_months, display_date};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

pub const ASSET_AVAILABLE: i32 = 1;
pub const ASSET_IN_USE: i32 = 2;
pub const ASSET_BROKEN: i32 = 3;
pub const ASSET_LIQUIDATED: i32 = 4;

pub const REQUEST_BORROW_ASSET: i32 = 1;
pub const REQUEST_RETURN_ASSET: i32 = 2;
pub const ACCEPT_REQUEST_BORROW_ASSET: i32 = 3;
pub const ACCEPT_REQUEST_RETURN_ASSET: i32 = 4;
pub const DENY_REQUEST_BORROW: i32 = 5;
pub const DENY_REQUEST_RETURN: i32 = 6;

pub const ASSET_REQUEST_CONTENT: &str = "has just created a asset request";
pub const DUPLICATE_ASSET_CODE: &str = "Duplicate asset code value violates";

pub fn asset_request_url(request_id: i32) -> String {
    format!("/hrm/asset/manage-asset-request?id={}", request_id)
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetType {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: i32,
    pub asset_type_id: i32,
    pub branch_id: i32,
    pub managed_by: i32,
    pub asset_name: String,
    pub asset_code: String,
    pub description: String,
    pub status: i32,
    pub purchase_price: f64,
    pub date_of_purchase: Option<NaiveDate>,
    pub depreciation_period: i32,
    pub license_end_date: Option<NaiveDate>,
    pub date_started_use: Option<NaiveDate>,
    pub status_req: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AssetListRow {
    pub id: i32,
    pub asset_name: String,
    pub asset_code: String,
    pub asset_type: String,
    pub asset_type_id: i32,
    pub branch_id: i32,
    pub user_id: i32,
    pub status: i32,
    pub status_req: i32,
    pub description: String,
    pub date_started_use: Option<NaiveDate>,
    pub license_end_date: Option<NaiveDate>,
    pub date_of_purchase: Option<NaiveDate>,
    pub purchase_price: f64,
    pub managed_by: i32,
    pub depreciation_period: i32,
    pub created_at: DateTime<Utc>,
}

/// Asset as shown in the list, dates formatted `YYYY/MM/DD` and empty when unset.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AssetListItem {
    pub asset_id: i32,
    pub asset_name: String,
    pub asset_code: String,
    pub asset_type: String,
    pub asset_type_id: i32,
    pub branch_id: i32,
    pub user_id: i32,
    pub status: i32,
    pub status_req: i32,
    pub description: String,
    pub date_started_use: String,
    pub created_at: String,
    pub license_end_date: String,
    pub date_of_purchase: String,
    pub purchase_price: f64,
    pub managed_by: i32,
    pub depreciation_period: i32,
    pub depreciation_end_date: String,
    pub depreciation_rates: f64,
}

impl AssetListItem {
    pub fn from_row(row: AssetListRow, today: NaiveDate) -> Self {
        let (depreciation_end_date, depreciation_rates) = match row.date_started_use {
            Some(start) if row.depreciation_period > 0 => (
                display_date(Some(depreciation_end(start, row.depreciation_period))),
                depreciation_rate(start, row.depreciation_period, today),
            ),
            _ => (String::new(), 0.0),
        };

        Self {
            asset_id: row.id,
            asset_name: row.asset_name,
            asset_code: row.asset_code,
            asset_type: row.asset_type,
            asset_type_id: row.asset_type_id,
            branch_id: row.branch_id,
            user_id: row.user_id,
            status: row.status,
            status_req: row.status_req,
            description: row.description,
            date_started_use: display_date(row.date_started_use),
            created_at: display_date(Some(row.created_at.date_naive())),
            license_end_date: display_date(row.license_end_date),
            date_of_purchase: display_date(row.date_of_purchase),
            purchase_price: row.purchase_price,
            managed_by: row.managed_by,
            depreciation_period: row.depreciation_period,
            depreciation_end_date,
            depreciation_rates,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetRequestRecord {
    pub id: i32,
    pub asset_id: i32,
    pub asset_name: String,
    pub asset_code: String,
    pub asset_type: String,
    pub description: String,
    pub created_by: i32,
    pub created_by_name: String,
    pub branch: String,
    pub status: i32,
    pub managed_by: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetLogRecord {
    pub id: i32,
    pub asset_id: i32,
    pub asset_name: String,
    pub asset_code: String,
    pub asset_type_name: String,
    pub branch_id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub status: i32,
    pub start_day_using: DateTime<Utc>,
    pub end_day_using: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub asset_type_id: i32,
    pub user_id: i32,
    pub branch_id: i32,
    pub asset_code: String,
    pub asset_name: String,
    pub managed_by: i32,
    pub status: i32,
    pub description: String,
    pub purchase_price: f64,
    pub depreciation_period: i32,
    pub date_of_purchase: Option<NaiveDate>,
    pub license_end_date: Option<NaiveDate>,
    pub date_started_use: Option<NaiveDate>,
    pub status_req: i32,
}

/// Calendar months started since `start`, counting each month boundary crossed.
pub fn months_since(start: NaiveDate, today: NaiveDate) -> i32 {
    if start >= today {
        return 0;
    }
    (today.year() * 12 + today.month() as i32) - (start.year() * 12 + start.month() as i32)
}

pub fn depreciation_end(start: NaiveDate, period_years: i32) -> NaiveDate {
    add_months(start, (period_years.max(0) as u32).saturating_mul(12))
}

/// Percentage of the depreciation period already used, two decimals, at most 100.
pub fn depreciation_rate(start: NaiveDate, period_years: i32, today: NaiveDate) -> f64 {
    if period_years <= 0 {
        return 0.0;
    }
    let rate = 100.0 * months_since(start, today) as f64 / (f64::from(period_years) * 12.0);
    ((rate * 100.0).round() / 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(start: Option<NaiveDate>, period: i32) -> AssetListRow {
        AssetListRow {
            id: 7,
            asset_name: "Laptop".into(),
            asset_code: "LP-007".into(),
            asset_type: "Computer".into(),
            asset_type_id: 1,
            branch_id: 2,
            user_id: 0,
            status: ASSET_AVAILABLE,
            status_req: 0,
            description: String::new(),
            date_started_use: start,
            license_end_date: None,
            date_of_purchase: Some(date(2022, 12, 20)),
            purchase_price: 1500.0,
            managed_by: 1,
            depreciation_period: period,
            created_at: DateTime::parse_from_rfc3339("2023-01-02T03:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_months_since_counts_boundaries() {
        assert_eq!(months_since(date(2023, 1, 31), date(2023, 2, 1)), 1);
        assert_eq!(months_since(date(2023, 1, 1), date(2023, 1, 31)), 0);
        assert_eq!(months_since(date(2022, 11, 15), date(2023, 2, 10)), 3);
        assert_eq!(months_since(date(2024, 1, 1), date(2023, 1, 1)), 0);
    }

    #[test]
    fn test_depreciation_rate() {
        assert_eq!(depreciation_rate(date(2023, 1, 1), 0, date(2024, 1, 1)), 0.0);
        assert_eq!(depreciation_rate(date(2023, 1, 1), 1, date(2023, 7, 1)), 50.0);
        assert_eq!(depreciation_rate(date(2023, 1, 1), 3, date(2023, 2, 1)), 2.78);
        assert_eq!(depreciation_rate(date(2015, 1, 1), 2, date(2024, 1, 1)), 100.0);
    }

    #[test]
    fn test_huge_period_does_not_overflow() {
        let start = date(2023, 1, 1);
        assert_eq!(depreciation_rate(start, 400_000_000, date(2024, 1, 1)), 0.0);
        assert_eq!(depreciation_end(start, i32::MAX), start);
    }

    #[test]
    fn test_list_item_without_start_date() {
        let item = AssetListItem::from_row(row(None, 3), date(2024, 1, 1));
        assert_eq!(item.date_started_use, "");
        assert_eq!(item.depreciation_end_date, "");
        assert_eq!(item.depreciation_rates, 0.0);
        assert_eq!(item.license_end_date, "");
        assert_eq!(item.date_of_purchase, "2022/12/20");
        assert_eq!(item.created_at, "2023/01/02");
    }

    #[test]
    fn test_list_item_with_depreciation() {
        let item = AssetListItem::from_row(row(Some(date(2023, 1, 10)), 2), date(2024, 1, 5));
        assert_eq!(item.date_started_use, "2023/01/10");
        assert_eq!(item.depreciation_end_date, "2025/01/10");
        assert_eq!(item.depreciation_rates, 50.0);
    }

    #[test]
    fn test_asset_request_url() {
        assert_eq!(asset_request_url(42), "/hrm/asset/manage-asset-request?id=42");
    }
}
