use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const ACCESSFUNC: i32 = 1;
pub const NOTACCESSFUNC: i32 = 2;

/// Module switch stored in `organization_modules.modules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModuleSetting {
    pub module_id: i32,
    pub status: bool,
}

/// Modules every new organization starts with.
pub fn default_modules() -> Vec<ModuleSetting> {
    (1..=4)
        .map(|module_id| ModuleSetting {
            module_id,
            status: true,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Module {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PermissionRecord {
    pub function_id: i32,
    pub name: String,
    pub module_id: i32,
    pub status: i32,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserPermissionSummary {
    pub id: i32,
    pub email: String,
    pub role_id: i32,
    pub avatar: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub has_custom: i64,
}

/// Access granted to a user for every enabled function: general managers get
/// everything, other roles start locked.
pub fn initial_status(role_id: i32) -> i32 {
    if crate::common::roles::is_general_manager(role_id) {
        ACCESSFUNC
    } else {
        NOTACCESSFUNC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::roles::{GENERAL_MANAGER_ROLE_ID, MANAGER_ROLE_ID, MEMBER_ROLE_ID};

    #[test]
    fn test_initial_status_by_role() {
        assert_eq!(initial_status(GENERAL_MANAGER_ROLE_ID), ACCESSFUNC);
        assert_eq!(initial_status(MANAGER_ROLE_ID), NOTACCESSFUNC);
        assert_eq!(initial_status(MEMBER_ROLE_ID), NOTACCESSFUNC);
    }

    #[test]
    fn test_default_modules_are_enabled() {
        let modules = default_modules();
        assert_eq!(modules.len(), 4);
        assert!(modules.iter().all(|m| m.status));
    }
}
