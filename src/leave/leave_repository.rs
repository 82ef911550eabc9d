use super::leave_models::{
    ExpiredHours, LeaveBonusDetail, LeaveBonusRecord, LeaveHistoryRecord, LeaveRequestDetail,
    LeaveRequestRecord, NewLeaveBonus, NewLeaveRequest, ValidLeaveBonus, OPENING_GRANT_TYPES,
};
use crate::{
    common::{page_offset, Filters},
    error::Result,
    user::FULL_NAME,
};
use chrono::NaiveDate;
use sqlx::PgPool;

#[derive(Debug, Default)]
pub struct LeaveRequestFilter {
    pub user_name: Option<String>,
    pub leave_request_type_id: Option<i32>,
    pub branch: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct LeaveHistoryFilter {
    pub id: Option<i32>,
    pub user_id: Option<i32>,
    pub user_name: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub subtract_day_off_type_id: Option<i32>,
}

#[derive(Debug, Default)]
pub struct LeaveBonusFilter {
    pub full_name: Option<String>,
    pub leave_bonus_type_id: Option<i32>,
    pub year: Option<i32>,
    pub is_deleted: bool,
}

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn holidays_between(
        &self,
        organization_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let days = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT holiday_date FROM holidays
             WHERE organization_id = $1 AND holiday_date BETWEEN $2 AND $3 AND deleted_at IS NULL
             ORDER BY holiday_date",
        )
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }

    pub async fn insert_request_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        request: &NewLeaveRequest<'_>,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO user_leave_requests
                (organization_id, user_id, leave_request_type_id, datetime_leave_from, datetime_leave_to,
                 subtract_day_off_type_id, reason, email_title, email_content, hour, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $2, $2)
             RETURNING id",
        )
        .bind(request.organization_id)
        .bind(request.user_id)
        .bind(request.leave_request_type_id)
        .bind(request.datetime_leave_from)
        .bind(request.datetime_leave_to)
        .bind(request.subtract_day_off_type_id)
        .bind(request.reason)
        .bind(request.email_title)
        .bind(request.email_content)
        .bind(request.hour)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Grants still usable today, earliest expiry first, locked for consumption.
    pub async fn valid_grants_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        user_id: i32,
        today: NaiveDate,
    ) -> Result<Vec<ValidLeaveBonus>> {
        let grants = sqlx::query_as::<_, ValidLeaveBonus>(
            "SELECT id, hour, hour_remaining, expire_bonus_leave_date
             FROM user_leave_bonus
             WHERE organization_id = $1 AND user_id = $2
               AND expire_bonus_leave_date >= $3 AND hour_remaining IS NOT NULL
               AND deleted_at IS NULL
             ORDER BY expire_bonus_leave_date ASC, id ASC
             FOR UPDATE",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(today)
        .fetch_all(&mut **tx)
        .await?;

        Ok(grants)
    }

    pub async fn valid_grants(
        &self,
        organization_id: i32,
        user_id: i32,
        today: NaiveDate,
    ) -> Result<Vec<ValidLeaveBonus>> {
        let grants = sqlx::query_as::<_, ValidLeaveBonus>(
            "SELECT id, hour, hour_remaining, expire_bonus_leave_date
             FROM user_leave_bonus
             WHERE organization_id = $1 AND user_id = $2
               AND expire_bonus_leave_date >= $3 AND hour_remaining IS NOT NULL
               AND deleted_at IS NULL
             ORDER BY expire_bonus_leave_date ASC, id ASC",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(grants)
    }

    pub async fn update_hour_remaining_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        updates: &[(i32, f64)],
        updated_by: i32,
    ) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let (ids, hours): (Vec<i32>, Vec<f64>) = updates.iter().copied().unzip();

        sqlx::query(
            "UPDATE user_leave_bonus b
             SET hour_remaining = u.hour_remaining, updated_by = $3, updated_at = NOW()
             FROM UNNEST($1::int[], $2::float8[]) AS u(id, hour_remaining)
             WHERE b.id = u.id",
        )
        .bind(&ids)
        .bind(&hours)
        .bind(updated_by)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn list_requests(
        &self,
        organization_id: i32,
        filter: &LeaveRequestFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<LeaveRequestRecord>, i64)> {
        let mut filters = Filters::new();
        filters
            .add("ulr.organization_id = {}", organization_id)
            .raw("ulr.deleted_at IS NULL");
        if let Some(name) = filter.user_name.as_deref().filter(|n| !n.trim().is_empty()) {
            filters.add(&format!("LOWER({}) LIKE {{}}", FULL_NAME), crate::common::like_pattern(name));
        }
        if let Some(kind) = filter.leave_request_type_id.filter(|k| *k > 0) {
            filters.add("ulr.leave_request_type_id = {}", kind);
        }
        if let Some(branch) = filter.branch.filter(|b| *b > 0) {
            filters.add("up.branch = {}", branch);
        }
        if let Some(from) = filter.date_from {
            filters.add("ulr.datetime_leave_from::date >= {}", from);
        }
        if let Some(to) = filter.date_to {
            filters.add("ulr.datetime_leave_to::date <= {}", to);
        }

        let from_sql = "FROM user_leave_requests ulr JOIN user_profiles up ON up.user_id = ulr.user_id";

        let count_sql = format!("SELECT COUNT(*) {}{}", from_sql, filters.where_sql());
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit = filters.next_index();
        let sql = format!(
            "SELECT ulr.id, ulr.user_id, {} AS full_name, ulr.leave_request_type_id,
                    ulr.datetime_leave_from, ulr.datetime_leave_to, ulr.subtract_day_off_type_id,
                    ulr.reason, ulr.hour, ulr.calendar_event_id, ulr.created_at
             {}{}
             ORDER BY ulr.created_at DESC, ulr.id DESC
             LIMIT ${} OFFSET ${}",
            FULL_NAME,
            from_sql,
            filters.where_sql(),
            limit,
            limit + 1
        );
        let records = filters
            .bind_as(sqlx::query_as::<_, LeaveRequestRecord>(&sql))
            .bind(row_per_page)
            .bind(page_offset(current_page, row_per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn history(
        &self,
        organization_id: i32,
        filter: &LeaveHistoryFilter,
    ) -> Result<Vec<LeaveHistoryRecord>> {
        let mut filters = Filters::new();
        filters
            .add("ulr.organization_id = {}", organization_id)
            .raw("ulr.deleted_at IS NULL");
        if let Some(id) = filter.id.filter(|v| *v > 0) {
            filters.add("ulr.id = {}", id);
        }
        if let Some(user_id) = filter.user_id.filter(|v| *v > 0) {
            filters.add("ulr.user_id = {}", user_id);
        }
        if let Some(name) = filter.user_name.as_deref().filter(|n| !n.trim().is_empty()) {
            filters.add(&format!("LOWER({}) LIKE {{}}", FULL_NAME), crate::common::like_pattern(name));
        }
        if let Some(from) = filter.date_from {
            filters.add("ulr.datetime_leave_from::date >= {}", from);
        }
        if let Some(to) = filter.date_to {
            filters.add("ulr.datetime_leave_to::date <= {}", to);
        }
        if let Some(kind) = filter.subtract_day_off_type_id.filter(|v| *v > 0) {
            filters.add("ulr.subtract_day_off_type_id = {}", kind);
        }

        let sql = format!(
            "SELECT ulr.id, ulr.user_id, {} AS full_name, ulr.leave_request_type_id,
                    ulr.datetime_leave_from, ulr.datetime_leave_to, ulr.subtract_day_off_type_id, ulr.hour
             FROM user_leave_requests ulr
             JOIN user_profiles up ON up.user_id = ulr.user_id{}
             ORDER BY ulr.user_id ASC, ulr.datetime_leave_from ASC",
            FULL_NAME,
            filters.where_sql()
        );
        let records = filters
            .bind_as(sqlx::query_as::<_, LeaveHistoryRecord>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    pub async fn find_request(&self, organization_id: i32, id: i32) -> Result<Option<LeaveRequestDetail>> {
        let detail = sqlx::query_as::<_, LeaveRequestDetail>(&format!(
            "SELECT ulr.id, ulr.user_id, {} AS full_name, ulr.leave_request_type_id,
                    ulr.datetime_leave_from, ulr.datetime_leave_to, ulr.subtract_day_off_type_id,
                    ulr.reason, ulr.email_title, ulr.email_content, ulr.hour, ulr.calendar_event_id
             FROM user_leave_requests ulr
             JOIN user_profiles up ON up.user_id = ulr.user_id
             WHERE ulr.organization_id = $1 AND ulr.id = $2 AND ulr.deleted_at IS NULL",
            FULL_NAME
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    pub async fn update_calendar_event(
        &self,
        organization_id: i32,
        id: i32,
        calendar_event_id: &str,
        updated_by: i32,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_leave_requests
             SET calendar_event_id = $1, updated_by = $2, updated_at = NOW()
             WHERE organization_id = $3 AND id = $4 AND deleted_at IS NULL",
        )
        .bind(calendar_event_id)
        .bind(updated_by)
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete_request(&self, id: i32, updated_by: i32) -> Result<()> {
        sqlx::query(
            "UPDATE user_leave_requests SET deleted_at = NOW(), updated_by = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(updated_by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Hours taken in leave that started during `year`.
    pub async fn hour_used(&self, organization_id: i32, user_id: i32, year: i32) -> Result<f64> {
        let hours = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(hour), 0)::float8 FROM user_leave_requests
             WHERE organization_id = $1 AND user_id = $2
               AND EXTRACT(YEAR FROM datetime_leave_from)::int = $3
               AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        Ok(hours)
    }

    pub async fn hour_bonus(&self, organization_id: i32, user_id: i32, year: i32) -> Result<f64> {
        let hours = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(hour), 0)::float8 FROM user_leave_bonus
             WHERE organization_id = $1 AND user_id = $2 AND year_belong = $3 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        Ok(hours)
    }

    pub async fn hour_remaining(&self, organization_id: i32, user_id: i32, year: i32) -> Result<f64> {
        let hours = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(hour_remaining), 0)::float8 FROM user_leave_bonus
             WHERE organization_id = $1 AND user_id = $2 AND year_belong = $3 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        Ok(hours)
    }

    pub async fn insert_bonus_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        bonus: &NewLeaveBonus,
        created_by: i32,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO user_leave_bonus
                (organization_id, user_id, leave_bonus_type_id, year_belong, reason, hour, hour_remaining,
                 expire_bonus_leave_date, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8, $8)
             RETURNING id",
        )
        .bind(organization_id)
        .bind(bonus.user_id)
        .bind(bonus.leave_bonus_type_id)
        .bind(bonus.year_belong)
        .bind(&bonus.reason)
        .bind(bonus.hour)
        .bind(bonus.expire_bonus_leave_date)
        .bind(created_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn list_bonuses(
        &self,
        organization_id: i32,
        filter: &LeaveBonusFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<LeaveBonusRecord>, i64)> {
        let mut filters = Filters::new();
        filters.add("ulb.organization_id = {}", organization_id);
        if filter.is_deleted {
            filters.raw("ulb.deleted_at IS NOT NULL");
        } else {
            filters.raw("ulb.deleted_at IS NULL");
        }
        if let Some(name) = filter.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            filters.add(&format!("LOWER({}) LIKE {{}}", FULL_NAME), crate::common::like_pattern(name));
        }
        if let Some(kind) = filter.leave_bonus_type_id.filter(|v| *v > 0) {
            filters.add("ulb.leave_bonus_type_id = {}", kind);
        }
        if let Some(year) = filter.year.filter(|v| *v > 0) {
            filters.add("ulb.year_belong = {}", year);
        }

        let from_sql = "FROM user_leave_bonus ulb
             JOIN user_profiles up ON up.user_id = ulb.user_id
             LEFT JOIN user_profiles up2 ON up2.user_id = ulb.created_by";

        let count_sql = format!("SELECT COUNT(*) {}{}", from_sql, filters.where_sql());
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit = filters.next_index();
        let sql = format!(
            "SELECT ulb.id, ulb.user_id, {} AS full_name, ulb.leave_bonus_type_id, ulb.year_belong AS year,
                    ulb.reason, ulb.hour, ulb.hour_remaining, ulb.expire_bonus_leave_date,
                    COALESCE(up2.first_name || ' ' || up2.last_name, '') AS created_by, ulb.created_at
             {}{}
             ORDER BY ulb.created_at DESC, ulb.id DESC
             LIMIT ${} OFFSET ${}",
            FULL_NAME,
            from_sql,
            filters.where_sql(),
            limit,
            limit + 1
        );
        let records = filters
            .bind_as(sqlx::query_as::<_, LeaveBonusRecord>(&sql))
            .bind(row_per_page)
            .bind(page_offset(current_page, row_per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn find_bonus(&self, organization_id: i32, id: i32) -> Result<Option<LeaveBonusDetail>> {
        let detail = sqlx::query_as::<_, LeaveBonusDetail>(
            "SELECT id, user_id, leave_bonus_type_id, year_belong, reason, hour, hour_remaining,
                    expire_bonus_leave_date
             FROM user_leave_bonus
             WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(detail)
    }

    pub async fn update_bonus(
        &self,
        organization_id: i32,
        id: i32,
        bonus: &NewLeaveBonus,
        updated_by: i32,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_leave_bonus
             SET user_id = $1, leave_bonus_type_id = $2, year_belong = $3, reason = $4,
                 hour = $5, hour_remaining = $5, updated_by = $6, updated_at = NOW()
             WHERE organization_id = $7 AND id = $8",
        )
        .bind(bonus.user_id)
        .bind(bonus.leave_bonus_type_id)
        .bind(bonus.year_belong)
        .bind(&bonus.reason)
        .bind(bonus.hour)
        .bind(updated_by)
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Soft-deletes the grant, or restores it when `deleted` is false.
    pub async fn set_bonus_deleted(
        &self,
        organization_id: i32,
        id: i32,
        deleted: bool,
        updated_by: i32,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_leave_bonus
             SET deleted_at = CASE WHEN $1 THEN NOW() ELSE NULL END, updated_by = $2, updated_at = NOW()
             WHERE organization_id = $3 AND id = $4",
        )
        .bind(deleted)
        .bind(updated_by)
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Remaining hours per user that the next sweep would expire.
    pub async fn expired_hours(&self, organization_id: i32, today: NaiveDate) -> Result<Vec<ExpiredHours>> {
        let rows = sqlx::query_as::<_, ExpiredHours>(
            "SELECT user_id, COALESCE(SUM(hour_remaining), 0)::float8 AS total_hour
             FROM user_leave_bonus
             WHERE organization_id = $1 AND expire_bonus_leave_date IS NOT NULL
               AND expire_bonus_leave_date <= $2 AND deleted_at IS NULL
             GROUP BY user_id
             ORDER BY user_id",
        )
        .bind(organization_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn clear_expired(&self, organization_id: i32, today: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_leave_bonus SET hour_remaining = 0, updated_at = NOW()
             WHERE organization_id = $1 AND expire_bonus_leave_date <= $2
               AND hour_remaining IS DISTINCT FROM 0",
        )
        .bind(organization_id)
        .bind(today)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Re-stamps this year's opening grants with a new expiry `months` after
    /// each grant was last updated, refilling their remaining hours.
    pub async fn restamp_opening_grants_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        months: i32,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE user_leave_bonus
             SET expire_bonus_leave_date = (updated_at + make_interval(months => $1))::date,
                 hour_remaining = hour
             WHERE organization_id = $2
               AND leave_bonus_type_id = ANY($3)
               AND year_belong = EXTRACT(YEAR FROM NOW())::int
               AND deleted_at IS NULL",
        )
        .bind(months)
        .bind(organization_id)
        .bind(&OPENING_GRANT_TYPES[..])
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(pool: &PgPool) -> (i32, i32) {
        let organization_id: i32 =
            sqlx::query_scalar("INSERT INTO organizations (name, tag) VALUES ('Acme', 'ACME') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        let user_id: i32 = sqlx::query_scalar(
            "INSERT INTO users (organization_id, email) VALUES ($1, 'an@acme.com') RETURNING id",
        )
        .bind(organization_id)
        .fetch_one(pool)
        .await
        .unwrap();
        (organization_id, user_id)
    }

    async fn seed_bonus(pool: &PgPool, organization_id: i32, user_id: i32, expire: Option<NaiveDate>) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO user_leave_bonus
                (organization_id, user_id, leave_bonus_type_id, year_belong, hour, hour_remaining,
                 expire_bonus_leave_date, created_by, updated_by)
             VALUES ($1, $2, 1, 2024, 16, 12, $3, $2, $2)
             RETURNING id",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(expire)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn remaining(pool: &PgPool, id: i32) -> Option<f64> {
        sqlx::query_scalar("SELECT hour_remaining FROM user_leave_bonus WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_clear_expired_zeroes_due_grants_once(pool: PgPool) {
        let (organization_id, user_id) = seed_user(&pool).await;
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let past = seed_bonus(&pool, organization_id, user_id, NaiveDate::from_ymd_opt(2024, 6, 1)).await;
        let due_today = seed_bonus(&pool, organization_id, user_id, Some(today)).await;
        let future = seed_bonus(&pool, organization_id, user_id, NaiveDate::from_ymd_opt(2024, 6, 11)).await;
        let open_ended = seed_bonus(&pool, organization_id, user_id, None).await;

        let repository = LeaveRepository::new(pool.clone());
        assert_eq!(repository.clear_expired(organization_id, today).await.unwrap(), 2);

        assert_eq!(remaining(&pool, past).await, Some(0.0));
        assert_eq!(remaining(&pool, due_today).await, Some(0.0));
        assert_eq!(remaining(&pool, future).await, Some(12.0));
        assert_eq!(remaining(&pool, open_ended).await, Some(12.0));

        assert_eq!(repository.clear_expired(organization_id, today).await.unwrap(), 0);
        assert_eq!(remaining(&pool, future).await, Some(12.0));
    }
}
