use super::{
    asset_models::{
        Asset, AssetListRow, AssetLogRecord, AssetRequestRecord, AssetType, NewAsset,
        ACCEPT_REQUEST_BORROW_ASSET, ASSET_AVAILABLE, ASSET_IN_USE,
    },
    lending::{AssetLendingStore, AssetUpdate, LendingDecision, LendingPlan},
};
use crate::{
    common::{like_pattern, page_offset, Filters},
    error::Result,
    user::FULL_NAME,
};
use axum::async_trait;
use sqlx::PgPool;

const ASSET_COLUMNS: &str = "id, organization_id, user_id, asset_type_id, branch_id, managed_by, asset_name,
    asset_code, description, status, purchase_price, date_of_purchase, depreciation_period, license_end_date,
    date_started_use, status_req, created_at";

#[derive(Debug, Default)]
pub struct AssetFilter {
    pub asset_name: Option<String>,
    pub asset_code: Option<String>,
    pub asset_type_id: Option<i32>,
    pub branch_id: Option<i32>,
    pub user_name: Option<String>,
    pub status: Option<i32>,
}

#[derive(Debug, Default)]
pub struct AssetRequestFilter {
    pub user_name: Option<String>,
    pub status: Option<i32>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        organization_id: i32,
        filter: &AssetFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<AssetListRow>, i64)> {
        let mut filters = Filters::new();
        filters
            .add("a.organization_id = {}", organization_id)
            .raw("a.deleted_at IS NULL");
        if let Some(name) = non_empty(&filter.asset_name) {
            filters.add("LOWER(a.asset_name) LIKE {}", like_pattern(name));
        }
        if let Some(code) = non_empty(&filter.asset_code) {
            filters.add("LOWER(a.asset_code) LIKE {}", like_pattern(code));
        }
        if let Some(kind) = filter.asset_type_id.filter(|v| *v > 0) {
            filters.add("a.asset_type_id = {}", kind);
        }
        if let Some(branch) = filter.branch_id.filter(|v| *v > 0) {
            filters.add("a.branch_id = {}", branch);
        }
        if let Some(name) = non_empty(&filter.user_name) {
            filters.add(&format!("LOWER({}) LIKE {{}}", FULL_NAME), like_pattern(name));
        }
        if let Some(status) = filter.status.filter(|v| *v > 0) {
            filters.add("a.status = {}", status);
        }

        let from_sql = "FROM assets a
             JOIN asset_types ast ON ast.id = a.asset_type_id
             LEFT JOIN user_profiles up ON up.user_id = a.user_id";

        let count_sql = format!("SELECT COUNT(*) {}{}", from_sql, filters.where_sql());
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit = filters.next_index();
        let sql = format!(
            "SELECT a.id, a.asset_name, a.asset_code, ast.name AS asset_type, ast.id AS asset_type_id,
                    a.branch_id, a.user_id, a.status, a.status_req, a.description, a.date_started_use,
                    a.license_end_date, a.date_of_purchase, a.purchase_price, a.managed_by,
                    a.depreciation_period, a.created_at
             {}{}
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT ${} OFFSET ${}",
            from_sql,
            filters.where_sql(),
            limit,
            limit + 1
        );
        let rows = filters
            .bind_as(sqlx::query_as::<_, AssetListRow>(&sql))
            .bind(row_per_page)
            .bind(page_offset(current_page, row_per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn create_type(&self, organization_id: i32, name: &str) -> Result<AssetType> {
        let asset_type = sqlx::query_as::<_, AssetType>(
            "INSERT INTO asset_types (organization_id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(organization_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(asset_type)
    }

    pub async fn types(&self, organization_id: i32) -> Result<Vec<AssetType>> {
        let types = sqlx::query_as::<_, AssetType>(
            "SELECT id, name FROM asset_types WHERE organization_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    pub async fn delete_type(&self, organization_id: i32, id: i32) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE asset_types SET deleted_at = NOW(), updated_at = NOW()
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn create_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        asset: &NewAsset,
    ) -> Result<Asset> {
        let created = sqlx::query_as::<_, Asset>(&format!(
            "INSERT INTO assets
                (organization_id, user_id, asset_type_id, branch_id, managed_by, asset_name, asset_code,
                 description, status, purchase_price, date_of_purchase, depreciation_period,
                 license_end_date, date_started_use, status_req)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {}",
            ASSET_COLUMNS
        ))
        .bind(organization_id)
        .bind(asset.user_id)
        .bind(asset.asset_type_id)
        .bind(asset.branch_id)
        .bind(asset.managed_by)
        .bind(&asset.asset_name)
        .bind(&asset.asset_code)
        .bind(&asset.description)
        .bind(asset.status)
        .bind(asset.purchase_price)
        .bind(asset.date_of_purchase)
        .bind(asset.depreciation_period)
        .bind(asset.license_end_date)
        .bind(asset.date_started_use)
        .bind(asset.status_req)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created)
    }

    pub async fn find(&self, organization_id: i32, id: i32) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {} FROM assets WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
            ASSET_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    pub async fn update(&self, organization_id: i32, id: i32, asset: &NewAsset) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE assets
             SET user_id = $1, asset_type_id = $2, branch_id = $3, managed_by = $4, asset_name = $5,
                 asset_code = $6, description = $7, status = $8, purchase_price = $9, date_of_purchase = $10,
                 depreciation_period = $11, license_end_date = $12, date_started_use = $13, updated_at = NOW()
             WHERE organization_id = $14 AND id = $15 AND deleted_at IS NULL",
        )
        .bind(asset.user_id)
        .bind(asset.asset_type_id)
        .bind(asset.branch_id)
        .bind(asset.managed_by)
        .bind(&asset.asset_name)
        .bind(&asset.asset_code)
        .bind(&asset.description)
        .bind(asset.status)
        .bind(asset.purchase_price)
        .bind(asset.date_of_purchase)
        .bind(asset.depreciation_period)
        .bind(asset.license_end_date)
        .bind(asset.date_started_use)
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete(&self, organization_id: i32, id: i32) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE assets SET deleted_at = NOW(), updated_at = NOW()
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_request_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        asset_id: i32,
        created_by: i32,
        status: i32,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO user_asset_requests (organization_id, asset_id, created_by, status)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(organization_id)
        .bind(asset_id)
        .bind(created_by)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Flags the asset with the pending request; the holder is left as is.
    pub async fn mark_requested_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        asset_id: i32,
        status: i32,
        status_req: i32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE assets SET status = $1, status_req = $2, updated_at = NOW()
             WHERE organization_id = $3 AND id = $4",
        )
        .bind(status)
        .bind(status_req)
        .bind(organization_id)
        .bind(asset_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn list_requests(
        &self,
        organization_id: i32,
        filter: &AssetRequestFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<AssetRequestRecord>, i64)> {
        let mut filters = Filters::new();
        filters
            .add("uar.organization_id = {}", organization_id)
            .raw("uar.deleted_at IS NULL");
        if let Some(name) = non_empty(&filter.user_name) {
            filters.add(&format!("LOWER({}) LIKE {{}}", FULL_NAME), like_pattern(name));
        }
        if let Some(status) = filter.status.filter(|v| *v > 0) {
            filters.add("uar.status = {}", status);
        }

        let from_sql = "FROM user_asset_requests uar
             JOIN assets a ON a.id = uar.asset_id
             JOIN asset_types ast ON ast.id = a.asset_type_id
             LEFT JOIN branches b ON b.id = a.branch_id
             LEFT JOIN user_profiles up ON up.user_id = uar.created_by";

        let count_sql = format!("SELECT COUNT(*) {}{}", from_sql, filters.where_sql());
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit = filters.next_index();
        let sql = format!(
            "SELECT uar.id, a.id AS asset_id, a.asset_name, a.asset_code, ast.name AS asset_type, a.description,
                    uar.created_by, COALESCE({}, '') AS created_by_name, COALESCE(b.name, '') AS branch,
                    uar.status, a.managed_by, uar.created_at
             {}{}
             ORDER BY uar.created_at DESC, uar.id DESC
             LIMIT ${} OFFSET ${}",
            FULL_NAME,
            from_sql,
            filters.where_sql(),
            limit,
            limit + 1
        );
        let records = filters
            .bind_as(sqlx::query_as::<_, AssetRequestRecord>(&sql))
            .bind(row_per_page)
            .bind(page_offset(current_page, row_per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn logs(
        &self,
        organization_id: i32,
        asset_id: i32,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<AssetLogRecord>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM asset_logs WHERE organization_id = $1 AND asset_id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(asset_id)
        .fetch_one(&self.pool)
        .await?;

        let records = sqlx::query_as::<_, AssetLogRecord>(&format!(
            "SELECT al.id, al.asset_id, a.asset_name, a.asset_code, ast.name AS asset_type_name, a.branch_id,
                    al.user_id, COALESCE({}, '') AS full_name, a.status, al.start_day_using, al.end_day_using
             FROM asset_logs al
             JOIN assets a ON a.id = al.asset_id
             JOIN asset_types ast ON ast.id = a.asset_type_id
             LEFT JOIN user_profiles up ON up.user_id = al.user_id
             WHERE al.organization_id = $1 AND al.asset_id = $2 AND al.deleted_at IS NULL
             ORDER BY al.start_day_using DESC, al.id DESC
             LIMIT $3 OFFSET $4",
            FULL_NAME
        ))
        .bind(organization_id)
        .bind(asset_id)
        .bind(row_per_page)
        .bind(page_offset(current_page, row_per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok((records, total))
    }

    /// Opens a usage log for `user_id`, first closing any log still open on the asset.
    pub async fn open_log_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        asset_id: i32,
        user_id: i32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE asset_logs SET end_day_using = NOW(), updated_at = NOW()
             WHERE organization_id = $1 AND asset_id = $2 AND end_day_using IS NULL",
        )
        .bind(organization_id)
        .bind(asset_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO asset_logs (organization_id, asset_id, user_id, start_day_using) VALUES ($1, $2, $3, NOW())",
        )
        .bind(organization_id)
        .bind(asset_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn close_log_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        asset_id: i32,
        user_id: i32,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE asset_logs SET end_day_using = NOW(), updated_at = NOW()
             WHERE organization_id = $1 AND asset_id = $2 AND user_id = $3 AND end_day_using IS NULL",
        )
        .bind(organization_id)
        .bind(asset_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_holder_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        asset_id: i32,
        user_id: i32,
        status: i32,
        status_req: i32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE assets SET user_id = $1, status = $2, status_req = $3, updated_at = NOW()
             WHERE organization_id = $4 AND id = $5",
        )
        .bind(user_id)
        .bind(status)
        .bind(status_req)
        .bind(organization_id)
        .bind(asset_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Moves the asset from `current_user_id` to `new_user_id`; zero means nobody.
    pub async fn reassign(
        &self,
        organization_id: i32,
        asset_id: i32,
        current_user_id: i32,
        new_user_id: i32,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if current_user_id != 0 {
            self.close_log_with_tx(&mut tx, organization_id, asset_id, current_user_id)
                .await?;
        }
        if new_user_id != 0 {
            self.open_log_with_tx(&mut tx, organization_id, asset_id, new_user_id)
                .await?;
            self.set_holder_with_tx(&mut tx, organization_id, asset_id, new_user_id, ASSET_IN_USE, 0)
                .await?;
        } else {
            self.set_holder_with_tx(&mut tx, organization_id, asset_id, 0, ASSET_AVAILABLE, 0)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl AssetLendingStore for AssetRepository {
    async fn apply_lending(&self, organization_id: i32, decision: &LendingDecision, plan: &LendingPlan) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE user_asset_requests SET status = $1, updated_at = NOW() WHERE organization_id = $2 AND id = $3",
        )
        .bind(decision.status)
        .bind(organization_id)
        .bind(decision.request_id)
        .execute(&mut *tx)
        .await?;

        match plan.asset_update {
            Some(AssetUpdate::InUse) => {
                self.set_holder_with_tx(
                    &mut tx,
                    organization_id,
                    decision.asset_id,
                    decision.user_id,
                    ASSET_IN_USE,
                    ACCEPT_REQUEST_BORROW_ASSET,
                )
                .await?
            }
            Some(AssetUpdate::Available) => {
                self.set_holder_with_tx(&mut tx, organization_id, decision.asset_id, 0, ASSET_AVAILABLE, 0)
                    .await?
            }
            None => {}
        }

        if plan.open_log {
            self.open_log_with_tx(&mut tx, organization_id, decision.asset_id, decision.user_id)
                .await?;
        }
        if plan.close_log {
            self.close_log_with_tx(&mut tx, organization_id, decision.asset_id, decision.user_id)
                .await?;
        }
        if plan.delete_request {
            sqlx::query("DELETE FROM user_asset_requests WHERE organization_id = $1 AND id = $2")
                .bind(organization_id)
                .bind(decision.request_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[sqlx::test]
    async fn test_created_asset_reads_back(pool: PgPool) {
        let organization_id: i32 =
            sqlx::query_scalar("INSERT INTO organizations (name, tag) VALUES ('Acme', 'ACME') RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();
        let repository = AssetRepository::new(pool.clone());
        let asset = NewAsset {
            asset_type_id: 1,
            user_id: 0,
            branch_id: 2,
            asset_code: "LP-001".into(),
            asset_name: "Laptop".into(),
            managed_by: 1,
            status: ASSET_AVAILABLE,
            description: String::new(),
            purchase_price: 1200.0,
            depreciation_period: 3,
            date_of_purchase: NaiveDate::from_ymd_opt(2023, 5, 1),
            license_end_date: None,
            date_started_use: None,
            status_req: 0,
        };

        let mut tx = pool.begin().await.unwrap();
        let created = repository.create_with_tx(&mut tx, organization_id, &asset).await.unwrap();
        tx.commit().await.unwrap();

        let found = repository.find(organization_id, created.id).await.unwrap().unwrap();
        assert_eq!(found.asset_code, "LP-001");
        assert_eq!(found.asset_name, "Laptop");
        assert_eq!(found.status, ASSET_AVAILABLE);
        assert_eq!(found.branch_id, 2);
        assert_eq!(found.date_of_purchase, asset.date_of_purchase);

        assert!(repository.find(organization_id + 1, created.id).await.unwrap().is_none());
    }
}
