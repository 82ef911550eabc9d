pub const GENERAL_MANAGER_ROLE_ID: i32 = 1;
pub const MANAGER_ROLE_ID: i32 = 2;
pub const MEMBER_ROLE_ID: i32 = 3;

pub fn is_general_manager(role_id: i32) -> bool {
    role_id == GENERAL_MANAGER_ROLE_ID
}

pub fn is_manager_or_above(role_id: i32) -> bool {
    role_id == GENERAL_MANAGER_ROLE_ID || role_id == MANAGER_ROLE_ID
}
