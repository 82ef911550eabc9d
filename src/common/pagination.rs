use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Pagination {
    pub current_page: i64,
    pub total_row: i64,
    pub row_per_page: i64,
}

impl Pagination {
    pub fn new(current_page: i64, row_per_page: i64, total_row: i64) -> Self {
        Self {
            current_page,
            total_row,
            row_per_page,
        }
    }
}

/// Row offset of a 1-based page.
pub fn page_offset(current_page: i64, row_per_page: i64) -> i64 {
    (current_page - 1).max(0) * row_per_page.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 8), 16);
        assert_eq!(page_offset(0, 10), 0);
    }
}
