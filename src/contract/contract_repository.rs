use super::contract_models::{ContractRow, ContractType, NewContract};
use crate::{
    common::{like_pattern, page_offset, Filters},
    error::Result,
    user::FULL_NAME,
};
use chrono::NaiveDate;
use sqlx::PgPool;

const CONTRACT_TYPE_COLUMNS: &str = "id, organization_id, name, file_template_name, created_at, updated_at";

const USER_STATUS_DELETED: i32 = 3;

#[derive(Debug, Default)]
pub struct ContractFilter {
    pub user_name: Option<String>,
    pub contract_type_id: Option<i32>,
    pub currency_unit: Option<i32>,
    pub branch_id: Option<i32>,
    pub contract_start_date: Option<NaiveDate>,
}

fn contract_select() -> String {
    format!(
        "SELECT c.id, c.user_id, {} AS full_name, up.avatar, up.branch, c.contract_type_id,
                ct.name AS contract_type_name, c.insurance_salary, c.total_salary, c.contract_start_date,
                c.contract_end_date, c.currency_unit, c.file_name, c.labor_contract_number,
                c.contract_creation_date, c.created_at
         FROM contracts c
         JOIN contract_types ct ON ct.id = c.contract_type_id
         JOIN user_profiles up ON up.user_id = c.user_id",
        FULL_NAME
    )
}

#[derive(Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest contract of every user that is not deleted.
    pub async fn current_list(
        &self,
        organization_id: i32,
        filter: &ContractFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<ContractRow>, i64)> {
        let mut filters = Filters::new();
        filters
            .add(
                "c.id IN (SELECT DISTINCT ON (user_id) id FROM contracts
                          WHERE organization_id = {} AND deleted_at IS NULL
                          ORDER BY user_id, created_at DESC, id DESC)",
                organization_id,
            )
            .add("up.status != {}", USER_STATUS_DELETED);
        if let Some(name) = filter.user_name.as_deref().filter(|v| !v.trim().is_empty()) {
            filters.add(&format!("LOWER({}) LIKE {{}}", FULL_NAME), like_pattern(name));
        }
        if let Some(kind) = filter.contract_type_id.filter(|v| *v > 0) {
            filters.add("c.contract_type_id = {}", kind);
        }
        if let Some(currency) = filter.currency_unit.filter(|v| *v > 0) {
            filters.add("c.currency_unit = {}", currency);
        }
        if let Some(branch) = filter.branch_id.filter(|v| *v > 0) {
            filters.add("up.branch = {}", branch);
        }
        if let Some(start) = filter.contract_start_date {
            filters.add("c.contract_start_date >= {}", start);
        }

        let count_sql = format!(
            "SELECT COUNT(*) FROM contracts c
             JOIN contract_types ct ON ct.id = c.contract_type_id
             JOIN user_profiles up ON up.user_id = c.user_id{}",
            filters.where_sql()
        );
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit = filters.next_index();
        let sql = format!(
            "{}{} ORDER BY c.created_at DESC, c.id DESC LIMIT ${} OFFSET ${}",
            contract_select(),
            filters.where_sql(),
            limit,
            limit + 1
        );
        let rows = filters
            .bind_as(sqlx::query_as::<_, ContractRow>(&sql))
            .bind(row_per_page)
            .bind(page_offset(current_page, row_per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn by_user(
        &self,
        organization_id: i32,
        user_id: i32,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<ContractRow>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM contracts
             WHERE organization_id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ContractRow>(&format!(
            "{}
             WHERE c.organization_id = $1 AND c.user_id = $2 AND c.deleted_at IS NULL
             ORDER BY c.contract_start_date DESC, c.id DESC
             LIMIT $3 OFFSET $4",
            contract_select()
        ))
        .bind(organization_id)
        .bind(user_id)
        .bind(row_per_page)
        .bind(page_offset(current_page, row_per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// `contract` carries the already obfuscated salary.
    pub async fn insert_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        contract: &NewContract,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO contracts
                (organization_id, user_id, contract_type_id, insurance_salary, total_salary,
                 contract_start_date, contract_end_date, currency_unit, file_name,
                 labor_contract_number, contract_creation_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(organization_id)
        .bind(contract.user_id)
        .bind(contract.contract_type_id)
        .bind(contract.insurance_salary)
        .bind(&contract.total_salary)
        .bind(contract.contract_start_date)
        .bind(contract.contract_end_date)
        .bind(contract.currency_unit)
        .bind(&contract.file_name)
        .bind(&contract.labor_contract_number)
        .bind(contract.contract_creation_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn soft_delete(&self, organization_id: i32, id: i32) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE contracts SET deleted_at = NOW(), updated_at = NOW()
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_type_with_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organization_id: i32,
        name: &str,
        file_template_name: &str,
    ) -> Result<ContractType> {
        let created = sqlx::query_as::<_, ContractType>(&format!(
            "INSERT INTO contract_types (organization_id, name, file_template_name)
             VALUES ($1, $2, $3)
             RETURNING {}",
            CONTRACT_TYPE_COLUMNS
        ))
        .bind(organization_id)
        .bind(name)
        .bind(file_template_name)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created)
    }

    /// `current_page == 0` returns every matching type.
    pub async fn list_types(
        &self,
        organization_id: i32,
        name: Option<&str>,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<ContractType>, i64)> {
        let mut filters = Filters::new();
        filters
            .add("organization_id = {}", organization_id)
            .raw("deleted_at IS NULL");
        if let Some(name) = name.filter(|v| !v.trim().is_empty()) {
            filters.add("LOWER(name) LIKE {}", like_pattern(name));
        }

        let count_sql = format!("SELECT COUNT(*) FROM contract_types{}", filters.where_sql());
        let total = filters
            .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let mut sql = format!(
            "SELECT {} FROM contract_types{} ORDER BY updated_at DESC, id DESC",
            CONTRACT_TYPE_COLUMNS,
            filters.where_sql()
        );
        let paged = current_page > 0 && row_per_page > 0;
        if paged {
            let limit = filters.next_index();
            sql.push_str(&format!(" LIMIT ${} OFFSET ${}", limit, limit + 1));
        }
        let mut query = filters.bind_as(sqlx::query_as::<_, ContractType>(&sql));
        if paged {
            query = query
                .bind(row_per_page)
                .bind(page_offset(current_page, row_per_page));
        }
        let types = query.fetch_all(&self.pool).await?;

        Ok((types, total))
    }

    pub async fn find_type(&self, organization_id: i32, id: i32) -> Result<Option<ContractType>> {
        let found = sqlx::query_as::<_, ContractType>(&format!(
            "SELECT {} FROM contract_types WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL",
            CONTRACT_TYPE_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    pub async fn update_type(
        &self,
        organization_id: i32,
        id: i32,
        name: &str,
        file_template_name: &str,
    ) -> Result<ContractType> {
        let updated = sqlx::query_as::<_, ContractType>(&format!(
            "UPDATE contract_types SET name = $3, file_template_name = $4, updated_at = NOW()
             WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
             RETURNING {}",
            CONTRACT_TYPE_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .bind(name)
        .bind(file_template_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Soft-deletes the types and returns their template names.
    pub async fn delete_types(&self, organization_id: i32, ids: &[i32]) -> Result<Vec<String>> {
        let templates = sqlx::query_scalar::<_, String>(
            "UPDATE contract_types SET deleted_at = NOW(), updated_at = NOW()
             WHERE organization_id = $1 AND id = ANY($2) AND deleted_at IS NULL
             RETURNING file_template_name",
        )
        .bind(organization_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }
}
