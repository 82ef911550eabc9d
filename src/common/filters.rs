use chrono::NaiveDate;
use sqlx::{
    postgres::{PgArguments, Postgres},
    query::{QueryAs, QueryScalar},
};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i32),
    Text(String),
    Date(NaiveDate),
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Int(value)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value)
    }
}

/// `WHERE` clause assembled from optional filters. Each clause names its
/// parameter `{}`, which becomes the next `$n`; values are bound in the same order.
#[derive(Debug, Default)]
pub struct Filters {
    clauses: Vec<String>,
    values: Vec<FilterValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, clause: &str, value: impl Into<FilterValue>) -> &mut Self {
        self.values.push(value.into());
        self.clauses
            .push(clause.replace("{}", &format!("${}", self.values.len())));
        self
    }

    /// A clause without parameters.
    pub fn raw(&mut self, clause: &str) -> &mut Self {
        self.clauses.push(clause.to_string());
        self
    }

    /// Index the next positional parameter (e.g. `LIMIT`) must use.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn bind_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            query = match value.clone() {
                FilterValue::Int(v) => query.bind(v),
                FilterValue::Text(v) => query.bind(v),
                FilterValue::Date(v) => query.bind(v),
            };
        }
        query
    }

    pub fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            query = match value.clone() {
                FilterValue::Int(v) => query.bind(v),
                FilterValue::Text(v) => query.bind(v),
                FilterValue::Date(v) => query.bind(v),
            };
        }
        query
    }
}

/// `%name%` pattern for case-insensitive full-name search.
pub fn like_pattern(value: &str) -> String {
    format!("%{}%", value.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_follow_bind_order() {
        let mut filters = Filters::new();
        filters
            .add("a.organization_id = {}", 4)
            .raw("a.deleted_at IS NULL")
            .add("LOWER(a.asset_name) LIKE {}", like_pattern(" Laptop "));

        assert_eq!(
            filters.where_sql(),
            " WHERE a.organization_id = $1 AND a.deleted_at IS NULL AND LOWER(a.asset_name) LIKE $2"
        );
        assert_eq!(filters.next_index(), 3);
        assert_eq!(
            filters.values,
            vec![FilterValue::Int(4), FilterValue::Text("%laptop%".into())]
        );
    }

    #[test]
    fn test_empty_filters() {
        let filters = Filters::new();
        assert_eq!(filters.where_sql(), "");
        assert_eq!(filters.next_index(), 1);
    }

    #[test]
    fn test_same_parameter_used_twice() {
        let mut filters = Filters::new();
        filters.add("(r.start_date <= {} OR r.expiry_date >= {})", 7);
        assert_eq!(filters.where_sql(), " WHERE (r.start_date <= $1 OR r.expiry_date >= $1)");
    }
}
